//! Windows NSIS installer creation.
//!
//! Renders an installer definition from the install manifest and compiles it
//! with NSIS (Nullsoft Scriptable Install System).
//!
//! # Module Organization
//!
//! - `template` - NSI script template constant
//! - `toolset` - makensis location
//! - `script` - NSI script generation from the template
//! - `build` - makensis execution
//! - `utils` - Helper functions (version formatting, path joining, BOM output)

mod build;
mod script;
mod template;
mod toolset;
mod utils;

pub use script::{NSI_FILE_NAME, ShortcutEntry, render_nsi_script, shortcut_table};

use crate::bundler::{error::Result, manifest::InstallManifest, settings::Settings};
use path_absolutize::Absolutize;
use std::path::PathBuf;

/// Bundle project as NSIS installer.
///
/// # Process
///
/// 1. Locate makensis
/// 2. Render `installer.nsi` into the build directory
/// 3. Compile it into `<dist>/<App>_<version>.exe`
///
/// The compiler is located first so a missing NSIS install fails before
/// anything is written.
pub async fn bundle_project(settings: &Settings, manifest: &InstallManifest) -> Result<PathBuf> {
    log::info!("Building NSIS installer for {}", settings.app_name());

    let makensis = toolset::find_makensis(settings.makensis())?;
    let nsi_path = script::generate_nsi_script(settings, manifest).await?;

    let installer_path = settings
        .dist_dir()
        .join(settings.installer_name())
        .absolutize()?
        .into_owned();

    build::run_makensis(&makensis, &nsi_path, &installer_path).await?;

    log::info!("Created NSIS installer: {}", installer_path.display());
    Ok(installer_path)
}
