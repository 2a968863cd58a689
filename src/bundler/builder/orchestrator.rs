//! Main bundler orchestration and coordination.
//!
//! This module provides the [`Bundler`] orchestrator that assembles the
//! build directory and then hands it to the artifact generators.

use super::checksum::calculate_sha256;
use crate::bundler::{
    BundledArtifact, PackageType, Result, Settings,
    assembly::{self, DependencyReport},
    error::ErrorExt,
    manifest::InstallManifest,
    platform::windows::{archive, nsis},
    utils::fs::create_dir_all,
    wheel::{PackageSource, PypiSource},
};
use tempfile::TempDir;

/// Main bundler orchestrator.
///
/// Owns the settings, the package source, and the install manifest. The
/// manifest is only mutated by [`Bundler::prepare`]; artifact generation
/// borrows it immutably.
///
/// # Examples
///
/// ```no_run
/// use pywinpack::bundler::{Bundler, PackageType, Settings};
///
/// # async fn example(settings: Settings) -> pywinpack::bundler::Result<()> {
/// let mut bundler = Bundler::new(settings)?;
/// bundler.prepare().await?;
///
/// // Only the portable archive
/// let artifacts = bundler.bundle_types(&[PackageType::Zip]).await?;
/// # Ok(())
/// # }
/// ```
pub struct Bundler<S = PypiSource> {
    settings: Settings,
    source: S,
    manifest: InstallManifest,
    support_dir: TempDir,
}

impl<S> std::fmt::Debug for Bundler<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bundler")
            .field("settings", &self.settings)
            .field("manifest", &self.manifest)
            .field("support_dir", &self.support_dir.path())
            .finish_non_exhaustive()
    }
}

impl Bundler<PypiSource> {
    /// Creates a bundler that downloads from the configured package index.
    pub fn new(settings: Settings) -> Result<Self> {
        let source = PypiSource::from_settings(&settings)?;
        Self::with_source(settings, source)
    }
}

impl<S: PackageSource> Bundler<S> {
    /// Creates a bundler with an explicit package source.
    pub fn with_source(settings: Settings, source: S) -> Result<Self> {
        let support_dir = tempfile::Builder::new()
            .prefix("pywinpack-support-")
            .tempdir()
            .fs_context("creating support directory", std::env::temp_dir())?;
        Ok(Self {
            settings,
            source,
            manifest: InstallManifest::new(),
            support_dir,
        })
    }

    /// Recreates the build and dist directories and assembles the bundle.
    ///
    /// Inputs are checked first, so a configuration error leaves the
    /// previous build untouched. Any manifest from an earlier run is
    /// discarded.
    pub async fn prepare(&mut self) -> Result<DependencyReport> {
        log::info!(
            "Assembling {} {} for Python {} ({}-bit)",
            self.settings.app_name(),
            self.settings.version_string(),
            self.settings.py_version(),
            self.settings.arch().bits()
        );

        let dependencies = assembly::preflight(&self.settings)?;

        create_dir_all(self.settings.build_dir(), true).await?;
        create_dir_all(self.settings.dist_dir(), true).await?;

        self.manifest = InstallManifest::new();
        let report = assembly::assemble(
            &self.settings,
            &self.source,
            dependencies,
            &mut self.manifest,
            self.support_dir.path(),
        )
        .await?;

        if !report.skipped.is_empty() {
            log::warn!(
                "{} dependencies were skipped and are missing from the bundle",
                report.skipped.len()
            );
        }
        Ok(report)
    }

    /// Assembles the bundle, then creates every artifact kind.
    pub async fn bundle(&mut self) -> Result<Vec<BundledArtifact>> {
        self.prepare().await?;
        self.bundle_types(PackageType::all()).await
    }

    /// Creates the given artifact kinds from the assembled build directory.
    ///
    /// Artifacts are produced in the order given; the first failure aborts.
    pub async fn bundle_types(&self, types: &[PackageType]) -> Result<Vec<BundledArtifact>> {
        let mut artifacts = Vec::with_capacity(types.len());

        for package_type in types {
            let path = match package_type {
                PackageType::Nsis => nsis::bundle_project(&self.settings, &self.manifest).await?,
                PackageType::Zip => archive::bundle_project(&self.settings).await?,
            };

            let size = tokio::fs::metadata(&path)
                .await
                .fs_context("reading artifact metadata", &path)?
                .len();
            let checksum = calculate_sha256(&path).await?;

            artifacts.push(BundledArtifact {
                package_type: *package_type,
                path,
                size,
                checksum,
            });
        }

        Ok(artifacts)
    }

    /// Returns a reference to the bundler settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The install manifest built by the last [`Bundler::prepare`].
    pub fn manifest(&self) -> &InstallManifest {
        &self.manifest
    }
}
