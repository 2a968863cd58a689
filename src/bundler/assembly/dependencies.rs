//! Third-party dependencies and first-party packages under `<build>/pkgs`.

use super::PACKAGES_DIR;
use crate::bundler::{
    error::{Error, Result},
    settings::Settings,
    utils::{
        blocking,
        exclude::ExcludeMatcher,
        fs::{copy_dir, ensure_dir, merge_dir_into, sorted_entries},
    },
    wheel::{DependencySpec, PackageSource, TargetPython, WheelLookup, extract_wheel},
};
use std::path::{Path, PathBuf};

/// Marker file that makes a directory a package.
const PACKAGE_MARKER: &str = "__init__.py";

/// What happened to each locked dependency.
#[derive(Debug, Default)]
pub struct DependencyReport {
    /// Dependencies materialized from a wheel.
    pub installed: Vec<DependencySpec>,
    /// Dependencies skipped, with the reason.
    pub skipped: Vec<Error>,
}

/// Materializes the locked `dependencies`, then the configured local wheels.
///
/// Dependencies with no usable wheel are logged and skipped; fetch failures
/// and extraction errors abort.
pub async fn prepare_dependencies<S: PackageSource>(
    settings: &Settings,
    source: &S,
    dependencies: Vec<DependencySpec>,
) -> Result<DependencyReport> {
    let pkgs = settings.build_dir().join(PACKAGES_DIR);
    ensure_dir(&pkgs)?;
    let exclude = ExcludeMatcher::new(settings.exclude())?;

    let target = TargetPython::from_settings(settings);
    log::info!("Preparing {} dependencies", dependencies.len());

    let mut report = DependencyReport::default();
    for dependency in dependencies {
        let reason = match source.find_wheel(&dependency, &target).await? {
            WheelLookup::Wheel { filename, url } => {
                log::debug!("{dependency}: using {filename}");
                let wheel = source.fetch(&url).await?;
                materialize(wheel, &pkgs, &exclude).await?;
                report.installed.push(dependency);
                continue;
            }
            WheelLookup::SourceOnly => "only source distributions are available",
            WheelLookup::NotFound => "no compatible package found",
        };
        let skipped = Error::DependencyUnresolved {
            dependency: dependency.to_string(),
            reason: reason.to_string(),
        };
        log::warn!("Skipping {skipped}");
        report.skipped.push(skipped);
    }

    for wheel in settings.local_wheels() {
        if !wheel.is_file() {
            log::warn!("Local wheel {} not found; skipping", wheel.display());
            continue;
        }
        log::info!("Installing local wheel {}", wheel.display());
        materialize(wheel.clone(), &pkgs, &exclude).await?;
    }

    Ok(report)
}

async fn materialize(wheel: PathBuf, pkgs: &Path, exclude: &ExcludeMatcher) -> Result<()> {
    let target = pkgs.to_path_buf();
    let exclude = (!exclude.is_empty()).then(|| exclude.clone());
    blocking(move || extract_wheel(&wheel, &target, exclude.as_ref())).await
}

/// Copies first-party packages from the package root into `<build>/pkgs`.
///
/// Returns the names of the packages copied.
pub fn prepare_packages(settings: &Settings) -> Result<Vec<String>> {
    let pkgs = settings.build_dir().join(PACKAGES_DIR);
    ensure_dir(&pkgs)?;

    let mut copied = Vec::new();
    for entry in sorted_entries(settings.package_dir())? {
        let path = entry.path();
        if !path.is_dir() || !path.join(PACKAGE_MARKER).is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let dest = pkgs.join(&name);
        if dest.is_dir() {
            log::debug!("Merging local package {name} over an installed one");
            merge_dir_into(&path, &dest)?;
        } else {
            copy_dir(&path, &dest, None)?;
        }
        log::info!("Copied package {name}");
        copied.push(name);
    }
    Ok(copied)
}
