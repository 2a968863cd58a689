//! Builder for constructing Settings.

use super::{
    Arch, CommandSpec, ExtraFileSpec, PackageSettings, Settings, ShortcutSpec,
    core::{DEFAULT_INDEX_URL, DEFAULT_PY_VERSION},
};
use crate::bundler::error::{Error, ErrorExt, Result};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Builder for constructing [`Settings`].
///
/// Relative paths are resolved against the project root when [`build`] runs.
///
/// [`build`]: SettingsBuilder::build
#[derive(Default)]
pub struct SettingsBuilder {
    project_root: Option<PathBuf>,
    package_settings: Option<PackageSettings>,
    package_dir: Option<PathBuf>,
    py_version: Option<String>,
    arch: Arch,
    icon: Option<PathBuf>,
    license: Option<PathBuf>,
    build_dir: Option<PathBuf>,
    dist_dir: Option<PathBuf>,
    include_msvcrt: Option<bool>,
    msvcrt_dir: Option<PathBuf>,
    launcher_dir: Option<PathBuf>,
    makensis: Option<PathBuf>,
    index_url: Option<String>,
    lockfile: Option<PathBuf>,
    commands: Vec<CommandSpec>,
    shortcuts: Vec<ShortcutSpec>,
    local_wheels: Vec<PathBuf>,
    extra_files: Vec<ExtraFileSpec>,
    exclude: Vec<String>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the project root.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn project_root<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.project_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets application metadata.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn package_settings(mut self, settings: PackageSettings) -> Self {
        self.package_settings = Some(settings);
        self
    }

    /// Sets the directory scanned for first-party packages.
    ///
    /// Default: the project root
    pub fn package_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.package_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the embeddable Python version.
    ///
    /// Default: [`DEFAULT_PY_VERSION`]
    pub fn py_version(mut self, version: impl Into<String>) -> Self {
        self.py_version = Some(version.into());
        self
    }

    /// Sets the target architecture.
    ///
    /// Default: [`Arch::X64`]
    pub fn arch(mut self, arch: Arch) -> Self {
        self.arch = arch;
        self
    }

    /// Sets the application icon.
    pub fn icon<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.icon = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the license file.
    pub fn license<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.license = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the build directory.
    ///
    /// Default: `build/winpacker`
    pub fn build_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.build_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the artifact output directory.
    ///
    /// Default: `dist`
    pub fn dist_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.dist_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables or disables bundling of redistributable runtime files.
    ///
    /// Default: true
    pub fn include_msvcrt(mut self, include: bool) -> Self {
        self.include_msvcrt = Some(include);
        self
    }

    /// Sets the directory holding redistributable runtime files.
    pub fn msvcrt_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.msvcrt_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the directory holding prebuilt launcher stubs.
    pub fn launcher_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.launcher_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets an explicit makensis executable.
    pub fn makensis<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.makensis = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the package index base URL.
    ///
    /// Default: [`DEFAULT_INDEX_URL`]
    pub fn index_url(mut self, url: impl Into<String>) -> Self {
        self.index_url = Some(url.into());
        self
    }

    /// Sets the lockfile path.
    ///
    /// Default: `pdm.lock`
    pub fn lockfile<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.lockfile = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the launchers to generate.
    pub fn commands(mut self, commands: Vec<CommandSpec>) -> Self {
        self.commands = commands;
        self
    }

    /// Sets the installer shortcuts.
    pub fn shortcuts(mut self, shortcuts: Vec<ShortcutSpec>) -> Self {
        self.shortcuts = shortcuts;
        self
    }

    /// Sets local wheels to merge in.
    pub fn local_wheels(mut self, wheels: Vec<PathBuf>) -> Self {
        self.local_wheels = wheels;
        self
    }

    /// Sets extra files and directories to ship.
    pub fn extra_files(mut self, files: Vec<ExtraFileSpec>) -> Self {
        self.extra_files = files;
        self
    }

    /// Sets exclude patterns.
    pub fn exclude(mut self, patterns: Vec<String>) -> Self {
        self.exclude = patterns;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the project root or the package
    /// settings are missing, if the application name is empty, if two
    /// commands share a name, if `include_msvcrt` is enabled explicitly
    /// without an `msvcrt_dir`, or if the build or dist directory would wipe
    /// the project (see [`check_output_dirs`]).
    pub fn build(self) -> Result<Settings> {
        let project_root = self
            .project_root
            .ok_or_else(|| Error::Configuration("project_root is required".into()))?;
        let package = self
            .package_settings
            .ok_or_else(|| Error::Configuration("package_settings is required".into()))?;
        if package.app_name.trim().is_empty() {
            return Err(Error::Configuration("app_name must not be empty".into()));
        }

        for (i, command) in self.commands.iter().enumerate() {
            if self.commands[..i].iter().any(|c| c.name == command.name) {
                return Err(Error::Configuration(format!(
                    "command {} is defined twice",
                    command.name
                )));
            }
        }

        if self.include_msvcrt == Some(true) && self.msvcrt_dir.is_none() {
            return Err(Error::Configuration(
                "include_msvcrt is enabled but no msvcrt_dir is configured".into(),
            ));
        }

        let resolve = |p: PathBuf| project_root.join(p);

        let build_dir = absolute(&resolve(
            self.build_dir
                .unwrap_or_else(|| Path::new("build").join("winpacker")),
        ))?;
        let dist_dir = absolute(&resolve(
            self.dist_dir.unwrap_or_else(|| PathBuf::from("dist")),
        ))?;
        check_output_dirs(&absolute(&project_root)?, &build_dir, &dist_dir)?;

        Ok(Settings {
            package_dir: self
                .package_dir
                .map(resolve)
                .unwrap_or_else(|| project_root.clone()),
            py_version: self
                .py_version
                .unwrap_or_else(|| DEFAULT_PY_VERSION.to_string()),
            arch: self.arch,
            icon: self.icon.map(resolve),
            license: self.license.map(resolve),
            build_dir,
            dist_dir,
            include_msvcrt: self.include_msvcrt.unwrap_or(true),
            msvcrt_dir: self.msvcrt_dir.map(resolve),
            launcher_dir: self.launcher_dir.map(resolve),
            makensis: self.makensis.map(resolve),
            index_url: self
                .index_url
                .unwrap_or_else(|| DEFAULT_INDEX_URL.to_string()),
            lockfile: resolve(self.lockfile.unwrap_or_else(|| PathBuf::from("pdm.lock"))),
            commands: self.commands,
            shortcuts: self
                .shortcuts
                .into_iter()
                .map(|s| ShortcutSpec {
                    icon: s.icon.map(resolve),
                    ..s
                })
                .collect(),
            local_wheels: self.local_wheels.into_iter().map(resolve).collect(),
            extra_files: self
                .extra_files
                .into_iter()
                .map(|f| ExtraFileSpec {
                    source: resolve(f.source),
                    ..f
                })
                .collect(),
            exclude: self.exclude,
            package,
            project_root,
        })
    }
}

/// Lexically absolute form of `path`, with `.` and `..` folded.
fn absolute(path: &Path) -> Result<PathBuf> {
    Ok(path
        .absolutize()
        .fs_context("resolving path", path)?
        .into_owned())
}

/// Rejects build and dist directories that a clean run would erase along
/// with the project, or with each other.
///
/// Both directories are deleted recursively before every build, so neither
/// may be the project root or one of its ancestors, and neither may contain
/// the other.
fn check_output_dirs(project_root: &Path, build_dir: &Path, dist_dir: &Path) -> Result<()> {
    for (key, dir) in [("build_directory", build_dir), ("dist_directory", dist_dir)] {
        if project_root.starts_with(dir) {
            return Err(Error::Configuration(format!(
                "{key} {} contains the project root {}",
                dir.display(),
                project_root.display()
            )));
        }
    }
    if build_dir.starts_with(dist_dir) || dist_dir.starts_with(build_dir) {
        return Err(Error::Configuration(format!(
            "build_directory {} and dist_directory {} overlap",
            build_dir.display(),
            dist_dir.display()
        )));
    }
    Ok(())
}
