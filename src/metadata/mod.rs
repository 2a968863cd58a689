//! Bundle configuration from a project's `pyproject.toml`.
//!
//! Reads `[project]`, `[tool.pdm.build]`, and `[tool.pdm.win-packer]`, checks
//! every command and shortcut, resolves extra preambles to text, and builds
//! the immutable [`Settings`]. Nothing on disk is touched besides reading.

use crate::bundler::{
    Arch, CommandSpec, EntryPoint, Error, PackageSettings, Preamble, Settings, SettingsBuilder,
    ShortcutSpec, settings::ExtraFileSpec,
};
use crate::error::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration file read from the project root.
pub const PYPROJECT_FILE: &str = "pyproject.toml";

#[derive(Debug, Default, Deserialize)]
struct PyProject {
    #[serde(default)]
    project: ProjectTable,
    #[serde(default)]
    tool: ToolTable,
}

#[derive(Debug, Default, Deserialize)]
struct ProjectTable {
    name: Option<String>,
    version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ToolTable {
    #[serde(default)]
    pdm: PdmTable,
}

#[derive(Debug, Default, Deserialize)]
struct PdmTable {
    #[serde(default)]
    build: BuildTable,
    #[serde(default, rename = "win-packer")]
    win_packer: WinPackerTable,
}

#[derive(Debug, Default, Deserialize)]
struct BuildTable {
    #[serde(rename = "package-dir")]
    package_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct WinPackerTable {
    app_name: Option<String>,
    py_version: Option<String>,
    py_bit: Option<i64>,
    include_msvcrt: Option<bool>,
    msvcrt_dir: Option<PathBuf>,
    license: Option<PathBuf>,
    icon: Option<PathBuf>,
    build_directory: Option<PathBuf>,
    dist_directory: Option<PathBuf>,
    publisher: Option<String>,
    launcher_dir: Option<PathBuf>,
    makensis: Option<PathBuf>,
    index_url: Option<String>,
    #[serde(default)]
    local_wheels: Vec<PathBuf>,
    #[serde(default)]
    files: Vec<FileEntry>,
    #[serde(default)]
    exclude: Vec<String>,
    // Kept as tables so declaration order survives.
    #[serde(default)]
    commands: toml::Table,
    #[serde(default)]
    shortcuts: toml::Table,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FileEntry {
    Path(PathBuf),
    Detailed {
        path: PathBuf,
        destination: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawPreamble {
    File(PathBuf),
    Inline { source: String },
}

#[derive(Debug, Deserialize)]
struct RawCommand {
    entry_point: Option<String>,
    #[serde(default)]
    console: bool,
    extra_preamble: Option<RawPreamble>,
    #[serde(default)]
    env: toml::Table,
}

#[derive(Debug, Deserialize)]
struct RawShortcut {
    target: Option<String>,
    parameters: Option<String>,
    icon: Option<PathBuf>,
}

/// Loads `<project_dir>/pyproject.toml` into [`Settings`].
pub fn load_settings(project_dir: &Path) -> Result<Settings> {
    let path = project_dir.join(PYPROJECT_FILE);
    let content = std::fs::read_to_string(&path).map_err(|e| {
        Error::Configuration(format!("failed to read {}: {e}", path.display()))
    })?;
    parse_settings(&content, project_dir)
}

/// Parses pyproject content for a project rooted at `project_root`.
pub fn parse_settings(content: &str, project_root: &Path) -> Result<Settings> {
    let pyproject: PyProject = toml::from_str(content)?;
    let config = pyproject.tool.pdm.win_packer;

    let app_name = config
        .app_name
        .or(pyproject.project.name)
        .ok_or_else(|| {
            Error::Configuration(
                "no application name: set [project] name or [tool.pdm.win-packer] app_name".into(),
            )
        })?;
    let package = PackageSettings {
        app_name,
        version: pyproject
            .project
            .version
            .unwrap_or_else(|| "0.0.0".to_string()),
        publisher: config.publisher,
    };

    let package_dir = pyproject
        .tool
        .pdm
        .build
        .package_dir
        .unwrap_or_else(|| PathBuf::from("."));
    let commands = parse_commands(&config.commands, project_root)?;
    let shortcuts = parse_shortcuts(&config.shortcuts)?;

    let mut builder = SettingsBuilder::new()
        .project_root(project_root)
        .package_settings(package)
        .package_dir(&package_dir)
        .arch(Arch::from_bits(config.py_bit.unwrap_or(64))?)
        .commands(commands)
        .shortcuts(shortcuts)
        .local_wheels(
            // Local wheels are named relative to the package root.
            config
                .local_wheels
                .into_iter()
                .map(|w| project_root.join(&package_dir).join(w))
                .collect(),
        )
        .extra_files(
            config
                .files
                .into_iter()
                .map(|entry| match entry {
                    FileEntry::Path(source) => ExtraFileSpec {
                        source,
                        destination: None,
                    },
                    FileEntry::Detailed { path, destination } => ExtraFileSpec {
                        source: path,
                        destination,
                    },
                })
                .collect(),
        )
        .exclude(config.exclude);

    if let Some(version) = config.py_version {
        builder = builder.py_version(version);
    }
    if let Some(include) = config.include_msvcrt {
        builder = builder.include_msvcrt(include);
    }
    if let Some(dir) = config.msvcrt_dir {
        builder = builder.msvcrt_dir(dir);
    }
    if let Some(license) = config.license {
        builder = builder.license(license);
    }
    if let Some(icon) = config.icon {
        builder = builder.icon(icon);
    }
    if let Some(dir) = config.build_directory {
        builder = builder.build_dir(dir);
    }
    if let Some(dir) = config.dist_directory {
        builder = builder.dist_dir(dir);
    }
    if let Some(dir) = config.launcher_dir {
        builder = builder.launcher_dir(dir);
    }
    if let Some(path) = config.makensis {
        builder = builder.makensis(path);
    }
    if let Some(url) = config.index_url {
        builder = builder.index_url(url);
    }

    Ok(builder.build()?)
}

fn parse_commands(table: &toml::Table, project_root: &Path) -> Result<Vec<CommandSpec>> {
    let mut commands = Vec::with_capacity(table.len());
    for (name, value) in table {
        let raw: RawCommand = value.clone().try_into().map_err(|e| {
            Error::Configuration(format!("command {name} is malformed: {e}"))
        })?;

        let entry_point: EntryPoint = raw
            .entry_point
            .ok_or_else(|| Error::Configuration(format!("command {name} has no entry_point")))?
            .parse()?;

        let preamble = match raw.extra_preamble {
            Some(RawPreamble::File(path)) => Preamble::FilePath(path),
            Some(RawPreamble::Inline { source }) => Preamble::InlineSource(source),
            None => Preamble::None,
        };

        let env = raw
            .env
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    toml::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect();

        commands.push(CommandSpec {
            name: name.clone(),
            entry_point,
            console: raw.console,
            extra_preamble: preamble.resolve(project_root).map_err(|e| {
                Error::Configuration(format!("command {name}: unreadable extra_preamble: {e}"))
            })?,
            env,
        });
    }
    Ok(commands)
}

fn parse_shortcuts(table: &toml::Table) -> Result<Vec<ShortcutSpec>> {
    let mut shortcuts = Vec::with_capacity(table.len());
    for (name, value) in table {
        let raw: RawShortcut = value.clone().try_into().map_err(|e| {
            Error::Configuration(format!("shortcut {name} is malformed: {e}"))
        })?;
        let target = raw
            .target
            .ok_or_else(|| Error::Configuration(format!("shortcut '{name}' must have a target")))?;
        shortcuts.push(ShortcutSpec {
            name: name.clone(),
            target,
            parameters: raw.parameters,
            icon: raw.icon,
        });
    }
    Ok(shortcuts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BundlerError;

    const FULL: &str = r#"
[project]
name = "myapp"
version = "1.2.0"

[tool.pdm.build]
package-dir = "src"

[tool.pdm.win-packer]
app_name = "My App"
py_version = "3.11.4"
py_bit = 32
publisher = "Acme"
icon = "assets/app.ico"
local_wheels = ["wheels/extra-1.0-py3-none-any.whl"]
files = ["README.md", { path = "data", destination = "$INSTDIR/data" }]
exclude = ["data/cache"]

[tool.pdm.win-packer.commands.zeta]
entry_point = "myapp.cli:main"
console = true
env = { APP_MODE = "prod", LEVEL = 3 }
extra_preamble = { source = "import faulthandler" }

[tool.pdm.win-packer.commands.alpha]
entry_point = "myapp.gui:run"

[tool.pdm.win-packer.shortcuts."My App"]
target = "$INSTDIR\\bin\\alpha.exe"
"#;

    fn configuration_error(err: BundlerError) -> String {
        match err {
            BundlerError::Bundler(Error::Configuration(msg)) => msg,
            other => panic!("expected a configuration error, got {other:?}"),
        }
    }

    #[test]
    fn full_configuration() {
        let root = Path::new("/work/myapp");
        let settings = parse_settings(FULL, root).unwrap();

        assert_eq!(settings.app_name(), "My App");
        assert_eq!(settings.version_string(), "1.2.0");
        assert_eq!(settings.py_version(), "3.11.4");
        assert_eq!(settings.arch(), Arch::X86);
        assert_eq!(settings.package_dir(), root.join("src"));
        assert_eq!(settings.icon(), Some(root.join("assets/app.ico").as_path()));
        assert_eq!(
            settings.local_wheels(),
            &[root.join("src").join("wheels/extra-1.0-py3-none-any.whl")]
        );
        assert_eq!(settings.extra_files()[1].destination.as_deref(), Some("$INSTDIR/data"));
        assert_eq!(settings.exclude(), &["data/cache".to_string()]);

        let names: Vec<&str> = settings.commands().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
        let zeta = &settings.commands()[0];
        assert!(zeta.console);
        assert_eq!(zeta.extra_preamble, "import faulthandler");
        assert_eq!(
            zeta.env,
            vec![
                ("APP_MODE".to_string(), "prod".to_string()),
                ("LEVEL".to_string(), "3".to_string())
            ]
        );
        assert!(!settings.commands()[1].console);

        assert_eq!(settings.shortcuts()[0].name, "My App");
        assert_eq!(settings.shortcuts()[0].target, "$INSTDIR\\bin\\alpha.exe");
    }

    #[test]
    fn defaults_apply() {
        let settings = parse_settings("[project]\nname = \"tool\"\n", Path::new("/p")).unwrap();
        assert_eq!(settings.app_name(), "tool");
        assert_eq!(settings.version_string(), "0.0.0");
        assert_eq!(settings.py_version(), "3.10.11");
        assert_eq!(settings.arch(), Arch::X64);
        assert_eq!(settings.build_dir(), Path::new("/p/build/winpacker"));
        assert_eq!(settings.dist_dir(), Path::new("/p/dist"));
        assert!(settings.include_msvcrt());
        assert!(settings.commands().is_empty());
    }

    #[test]
    fn dist_directory_at_project_root_is_rejected() {
        let content = "[project]\nname = \"a\"\n[tool.pdm.win-packer]\ndist_directory = \".\"\n";
        let msg = configuration_error(parse_settings(content, Path::new("/p")).unwrap_err());
        assert!(msg.contains("dist_directory"), "{msg}");

        let content = "[project]\nname = \"a\"\n[tool.pdm.win-packer]\nbuild_directory = \"..\"\n";
        let msg = configuration_error(parse_settings(content, Path::new("/p/app")).unwrap_err());
        assert!(msg.contains("build_directory"), "{msg}");
    }

    #[test]
    fn command_without_entry_point_is_rejected() {
        let content = "[project]\nname = \"a\"\n[tool.pdm.win-packer.commands.app]\nconsole = true\n";
        let msg = configuration_error(parse_settings(content, Path::new("/p")).unwrap_err());
        assert!(msg.contains("no entry_point"), "{msg}");
    }

    #[test]
    fn malformed_entry_point_is_rejected() {
        let content =
            "[project]\nname = \"a\"\n[tool.pdm.win-packer.commands.app]\nentry_point = \"my-pkg:main\"\n";
        configuration_error(parse_settings(content, Path::new("/p")).unwrap_err());
    }

    #[test]
    fn shortcut_without_target_is_rejected() {
        let content = "[project]\nname = \"a\"\n[tool.pdm.win-packer.shortcuts.App]\nicon = \"a.ico\"\n";
        let msg = configuration_error(parse_settings(content, Path::new("/p")).unwrap_err());
        assert!(msg.contains("must have a target"), "{msg}");
    }

    #[test]
    fn invalid_bitness_is_rejected() {
        let content = "[project]\nname = \"a\"\n[tool.pdm.win-packer]\npy_bit = 16\n";
        configuration_error(parse_settings(content, Path::new("/p")).unwrap_err());
    }

    #[test]
    fn preamble_file_is_read_at_load_time() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("pre.py"), "import os\n").unwrap();
        let content = "[project]\nname = \"a\"\n[tool.pdm.win-packer.commands.app]\n\
                       entry_point = \"a:main\"\nextra_preamble = \"pre.py\"\n";
        let settings = parse_settings(content, root.path()).unwrap();
        assert_eq!(settings.commands()[0].extra_preamble, "import os\n");
    }

    #[test]
    fn missing_pyproject_is_a_configuration_error() {
        let root = tempfile::tempdir().unwrap();
        configuration_error(load_settings(root.path()).unwrap_err());
    }
}
