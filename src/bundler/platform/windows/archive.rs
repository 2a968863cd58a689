//! Portable zip archive of the build directory.

use crate::bundler::{
    assembly::SYSTEM_PATH_HELPER,
    error::{ErrorExt, Result},
    platform::windows::nsis::NSI_FILE_NAME,
    settings::Settings,
    utils::{blocking, fs::normalize_path},
};
use path_absolutize::Absolutize;
use std::{
    fs::File,
    io::{self, BufWriter},
    path::{Path, PathBuf},
};
use walkdir::WalkDir;
use zip::{CompressionMethod, write::SimpleFileOptions};

/// Build-root files that only the installer uses.
pub const INSTALLER_ONLY_FILES: &[&str] = &[NSI_FILE_NAME, SYSTEM_PATH_HELPER];

/// Writes `<dist>/<App>_<version>.zip` from the build directory.
pub async fn bundle_project(settings: &Settings) -> Result<PathBuf> {
    let output = settings
        .dist_dir()
        .join(settings.archive_name())
        .absolutize()?
        .into_owned();
    log::info!("Creating zip package {}", output.display());

    let build_dir = settings.build_dir().to_path_buf();
    let target = output.clone();
    let count = blocking(move || write_archive(&build_dir, &target)).await?;

    log::info!("Created zip package with {count} files: {}", output.display());
    Ok(output)
}

/// Zips every file under `build_dir`, keyed by its build-relative path.
///
/// An existing `output` is replaced. Returns the number of files written.
pub fn write_archive(build_dir: &Path, output: &Path) -> Result<usize> {
    match std::fs::remove_file(output) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e).fs_context("removing previous archive", output),
    }
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent).fs_context("creating archive directory", parent)?;
    }

    let file = File::create(output).fs_context("creating archive", output)?;
    let mut zip = zip::ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut count = 0;
    for entry in WalkDir::new(build_dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(build_dir)?;
        if is_installer_only(relative) {
            log::debug!("Leaving {} out of the archive", relative.display());
            continue;
        }

        zip.start_file(normalize_path(relative), options)?;
        let mut source = File::open(entry.path()).fs_context("opening file", entry.path())?;
        io::copy(&mut source, &mut zip).fs_context("archiving file", entry.path())?;
        count += 1;
    }

    zip.finish()?;
    Ok(count)
}

fn is_installer_only(relative: &Path) -> bool {
    relative.parent() == Some(Path::new(""))
        && relative
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| INSTALLER_ONLY_FILES.contains(&n))
}
