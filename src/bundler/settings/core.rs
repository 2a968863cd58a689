//! Core Settings struct and implementations.

use super::{Arch, CommandSpec, PackageSettings, ShortcutSpec};
use std::path::{Path, PathBuf};

/// Default embeddable Python version.
pub const DEFAULT_PY_VERSION: &str = "3.10.11";

/// Default package index.
pub const DEFAULT_INDEX_URL: &str = "https://pypi.org";

/// An extra file or directory requested by configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExtraFileSpec {
    /// Absolute source path.
    pub source: PathBuf,
    /// Logical destination; the install root when absent.
    pub destination: Option<String>,
}

/// Immutable description of one bundle build.
///
/// Constructed via [`SettingsBuilder`](super::SettingsBuilder) and handed by
/// reference to every stage of the pipeline.
///
/// # Examples
///
/// ```no_run
/// use pywinpack::bundler::{PackageSettings, SettingsBuilder};
///
/// # fn example() -> pywinpack::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .project_root("/work/myapp")
///     .package_settings(PackageSettings {
///         app_name: "MyApp".into(),
///         version: "1.0.0".into(),
///         ..Default::default()
///     })
///     .build()?;
/// assert_eq!(settings.build_dir(), std::path::Path::new("/work/myapp/build/winpacker"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Settings {
    pub(super) package: PackageSettings,
    pub(super) project_root: PathBuf,
    pub(super) package_dir: PathBuf,
    pub(super) py_version: String,
    pub(super) arch: Arch,
    pub(super) icon: Option<PathBuf>,
    pub(super) license: Option<PathBuf>,
    pub(super) build_dir: PathBuf,
    pub(super) dist_dir: PathBuf,
    pub(super) include_msvcrt: bool,
    pub(super) msvcrt_dir: Option<PathBuf>,
    pub(super) launcher_dir: Option<PathBuf>,
    pub(super) makensis: Option<PathBuf>,
    pub(super) index_url: String,
    pub(super) lockfile: PathBuf,
    pub(super) commands: Vec<CommandSpec>,
    pub(super) shortcuts: Vec<ShortcutSpec>,
    pub(super) local_wheels: Vec<PathBuf>,
    pub(super) extra_files: Vec<ExtraFileSpec>,
    pub(super) exclude: Vec<String>,
}

impl Settings {
    /// Application metadata.
    pub fn package(&self) -> &PackageSettings {
        &self.package
    }

    /// Application name.
    pub fn app_name(&self) -> &str {
        &self.package.app_name
    }

    /// Application version.
    pub fn version_string(&self) -> &str {
        &self.package.version
    }

    /// Project root directory.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Directory scanned for first-party packages.
    pub fn package_dir(&self) -> &Path {
        &self.package_dir
    }

    /// Full embeddable Python version, e.g. `3.10.11`.
    pub fn py_version(&self) -> &str {
        &self.py_version
    }

    /// `(major, minor)` of the target Python.
    ///
    /// Components that are not plain numbers count as 0.
    pub fn py_version_tuple(&self) -> (u32, u32) {
        let mut parts = self
            .py_version
            .split('.')
            .map(|p| p.parse::<u32>().unwrap_or(0));
        (parts.next().unwrap_or(0), parts.next().unwrap_or(0))
    }

    /// Target architecture.
    pub fn arch(&self) -> Arch {
        self.arch
    }

    /// Application icon, if configured.
    pub fn icon(&self) -> Option<&Path> {
        self.icon.as_deref()
    }

    /// File name of the icon inside the build directory.
    pub fn icon_name(&self) -> Option<String> {
        self.icon
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }

    /// License file, if configured.
    pub fn license(&self) -> Option<&Path> {
        self.license.as_deref()
    }

    /// File name of the license inside the build directory.
    pub fn license_name(&self) -> Option<String> {
        self.license
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }

    /// Scratch directory assembled into the artifacts.
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Directory receiving the artifacts.
    pub fn dist_dir(&self) -> &Path {
        &self.dist_dir
    }

    /// Whether redistributable runtime files are bundled.
    pub fn include_msvcrt(&self) -> bool {
        self.include_msvcrt
    }

    /// Directory holding `x64/` and `x86/` runtime file folders.
    pub fn msvcrt_dir(&self) -> Option<&Path> {
        self.msvcrt_dir.as_deref()
    }

    /// Directory holding prebuilt launcher stubs.
    pub fn launcher_dir(&self) -> Option<&Path> {
        self.launcher_dir.as_deref()
    }

    /// Explicit makensis path.
    pub fn makensis(&self) -> Option<&Path> {
        self.makensis.as_deref()
    }

    /// Package index base URL.
    pub fn index_url(&self) -> &str {
        &self.index_url
    }

    /// Lockfile listing resolved dependencies.
    pub fn lockfile(&self) -> &Path {
        &self.lockfile
    }

    /// Launchers to generate, in configuration order.
    pub fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    /// Shortcuts to create, in configuration order.
    pub fn shortcuts(&self) -> &[ShortcutSpec] {
        &self.shortcuts
    }

    /// Local wheel files merged into the package directory.
    pub fn local_wheels(&self) -> &[PathBuf] {
        &self.local_wheels
    }

    /// Extra files and directories requested by configuration.
    pub fn extra_files(&self) -> &[ExtraFileSpec] {
        &self.extra_files
    }

    /// Exclude patterns.
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Installer executable file name, e.g. `My_App_1.0.exe`.
    pub fn installer_name(&self) -> String {
        format!("{}.exe", self.package.artifact_stem())
    }

    /// Archive file name, e.g. `My_App_1.0.zip`.
    pub fn archive_name(&self) -> String {
        format!("{}.zip", self.package.artifact_stem())
    }
}
