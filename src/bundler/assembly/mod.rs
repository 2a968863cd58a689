//! Bundle assembly: populating the build directory and the install manifest.
//!
//! Steps run strictly in order, each one appending to the manifest:
//!
//! 1. icon
//! 2. embeddable Python runtime (plus the PATH helper)
//! 3. msvcrt redistributables
//! 4. license
//! 5. locked dependencies and local wheels into `pkgs/`
//! 6. first-party packages into `pkgs/`
//! 7. launchers into `bin/`
//! 8. queued extra files, renamed on collision
//!
//! # Module Organization
//!
//! - `runtime` - steps 1 to 4
//! - `dependencies` - steps 5 and 6
//! - `extras` - step 8

mod dependencies;
mod extras;
mod runtime;

pub use dependencies::{DependencyReport, prepare_dependencies, prepare_packages};
pub use extras::materialize_extra_files;
pub use runtime::{
    prepare_icon, prepare_license, prepare_msvcrt, prepare_python, python_download_url,
    unpack_runtime,
};

use crate::bundler::{
    error::{Error, Result},
    launcher::{LauncherStubs, build_launcher},
    manifest::{InstallManifest, normalize_destination},
    platform::windows::nsis::NSI_FILE_NAME,
    settings::Settings,
    utils::fs::ensure_dir,
    wheel::{DependencySpec, PackageSource, read_lockfile},
};
use std::path::Path;

/// Shared package directory inside the build directory.
pub const PACKAGES_DIR: &str = "pkgs";

/// Interpreter runtime directory inside the build directory.
pub const PYTHON_DIR: &str = "Python";

/// Launcher directory inside the build directory.
pub const COMMANDS_DIR: &str = "bin";

/// Redistributable runtime directory inside the build directory.
pub const MSVCRT_DIR: &str = "msvcrt";

/// File name of the installer's PATH helper.
pub const SYSTEM_PATH_HELPER: &str = "_system_path.py";

/// Build-root names extra files may never take.
pub const RESERVED_BUILD_NAMES: &[&str] = &[NSI_FILE_NAME];

/// Checks the inputs a build reads before anything on disk is touched.
///
/// Returns the locked dependencies.
///
/// # Errors
///
/// [`Error::Configuration`] if the lockfile, the icon, the license, a
/// shortcut icon, an extra file, the launcher directory or the msvcrt
/// directory for the target architecture is missing.
pub fn preflight(settings: &Settings) -> Result<Vec<DependencySpec>> {
    let msvcrt = settings
        .msvcrt_dir()
        .filter(|_| settings.include_msvcrt())
        .map(|root| root.join(settings.arch().msvcrt_dir()));

    let mut required: Vec<(&str, &Path)> = Vec::new();
    if let Some(icon) = settings.icon() {
        required.push(("icon", icon));
    }
    if let Some(license) = settings.license() {
        required.push(("license", license));
    }
    for shortcut in settings.shortcuts() {
        if let Some(icon) = &shortcut.icon {
            required.push(("shortcut icon", icon.as_path()));
        }
    }
    for extra in settings.extra_files() {
        required.push(("extra file", extra.source.as_path()));
    }
    if let Some(dir) = settings.launcher_dir().filter(|_| !settings.commands().is_empty()) {
        required.push(("launcher_dir", dir));
    }
    if let Some(dir) = &msvcrt {
        required.push(("msvcrt directory", dir.as_path()));
    }

    for (what, path) in required {
        if !path.exists() {
            return Err(Error::Configuration(format!(
                "{what} {} does not exist",
                path.display()
            )));
        }
    }

    read_lockfile(settings.lockfile())
}

/// Runs every assembly step against a freshly created build directory.
///
/// `dependencies` come from [`preflight`]. `support_dir` holds generated
/// inputs (the PATH helper) until they are copied into the build directory.
pub async fn assemble<S: PackageSource>(
    settings: &Settings,
    source: &S,
    dependencies: Vec<DependencySpec>,
    manifest: &mut InstallManifest,
    support_dir: &Path,
) -> Result<DependencyReport> {
    prepare_icon(settings)?;
    prepare_python(settings, source, manifest, support_dir).await?;
    prepare_msvcrt(settings, manifest)?;
    prepare_license(settings, manifest)?;

    let report = prepare_dependencies(settings, source, dependencies).await?;
    prepare_packages(settings)?;
    prepare_commands(settings, source, manifest).await?;

    for extra in settings.extra_files() {
        manifest.add_extra_file(
            extra.source.clone(),
            normalize_destination(extra.destination.as_deref()),
        );
    }
    materialize_extra_files(settings, manifest)?;

    log::info!("Bundle assembled in {}", settings.build_dir().display());
    Ok(report)
}

/// Writes one launcher per configured command into `<build>/bin`.
pub async fn prepare_commands<S: PackageSource>(
    settings: &Settings,
    source: &S,
    manifest: &mut InstallManifest,
) -> Result<()> {
    let commands = settings.commands();
    if commands.is_empty() {
        log::debug!("No commands configured");
        return Ok(());
    }

    let stubs = match settings.launcher_dir() {
        Some(dir) => LauncherStubs::from_dir(dir),
        None => LauncherStubs::fetch(source, commands, settings.arch()).await?,
    };

    let bin = settings.build_dir().join(COMMANDS_DIR);
    ensure_dir(&bin)?;
    for command in commands {
        build_launcher(command, &bin, settings.arch(), &stubs, manifest)?;
    }
    Ok(())
}
