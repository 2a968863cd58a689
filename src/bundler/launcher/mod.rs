//! Native launcher generation.
//!
//! A launcher is `<stub><shebang line><zip holding __main__.py>`, written
//! back to back. The stub scans its own tail for the archive at startup, so
//! no padding or length prefix is involved.
//!
//! # Module Organization
//!
//! - `script` - the bootstrap `__main__.py`
//! - `stubs` - stub variants and where their bytes come from

mod script;
mod stubs;

pub use script::{python_literal, render_bootstrap};
pub use stubs::{DISTLIB_STUB_URL, LauncherStubs, StubVariant};

use crate::bundler::{
    error::{Context, ErrorExt, Result},
    manifest::{INSTALL_ROOT, InstallManifest},
    settings::{Arch, CommandSpec},
};
use std::{
    io::{Cursor, Write},
    path::{Path, PathBuf},
};
use zip::{CompressionMethod, write::SimpleFileOptions};

/// Name of the bootstrap script inside the embedded archive.
pub const MAIN_SCRIPT: &str = "__main__.py";

/// Zips the bootstrap script as the archive's only member.
///
/// Timestamps are pinned so identical input gives identical bytes.
fn embedded_archive(script: &str) -> Result<Vec<u8>> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .last_modified_time(zip::DateTime::default());

    let mut zw = zip::ZipWriter::new(Cursor::new(Vec::new()));
    zw.start_file(MAIN_SCRIPT, options)?;
    zw.write_all(script.as_bytes())?;
    Ok(zw.finish()?.into_inner())
}

/// Assembles launcher bytes for `command` on top of `stub`.
pub fn launcher_bytes(command: &CommandSpec, variant: StubVariant, stub: &[u8]) -> Result<Vec<u8>> {
    let archive = embedded_archive(&render_bootstrap(command))?;
    let shebang = variant.shebang();

    let mut out = Vec::with_capacity(stub.len() + shebang.len() + archive.len());
    out.extend_from_slice(stub);
    out.extend_from_slice(shebang);
    out.extend_from_slice(&archive);
    Ok(out)
}

/// Writes `<command.name>.exe` into `output_dir`.
///
/// `output_dir` is registered in the manifest as a whole directory the first
/// time a launcher is written into it.
pub fn build_launcher(
    command: &CommandSpec,
    output_dir: &Path,
    arch: Arch,
    stubs: &LauncherStubs,
    manifest: &mut InstallManifest,
) -> Result<PathBuf> {
    let variant = StubVariant::for_command(command, arch);
    let stub = stubs.read(variant)?;
    let bytes = launcher_bytes(command, variant, &stub)?;

    let exe_path = output_dir.join(format!("{}.exe", command.name));
    std::fs::write(&exe_path, bytes).fs_context("writing launcher", &exe_path)?;
    log::info!(
        "Created launcher {} -> {}",
        exe_path.display(),
        command.entry_point
    );

    let dir_name = output_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .context("launcher directory has no name")?;
    if !manifest.has_directory(&dir_name) {
        manifest.add_directory(dir_name, INSTALL_ROOT);
    }

    Ok(exe_path)
}
