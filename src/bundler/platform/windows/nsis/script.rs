//! NSIS installer script generation.
//!
//! Builds the template namespace from settings and the install manifest,
//! renders it with Handlebars, and writes the result with a UTF-8 BOM.

use super::{
    template::NSI_TEMPLATE,
    utils::{self, nsis_join},
};
use crate::bundler::{
    assembly::MSVCRT_DIR,
    error::{Error, ErrorExt, Result},
    manifest::{ExtraFile, FileGroup, INSTALL_ROOT, InstallManifest},
    settings::Settings,
};
use handlebars::Handlebars;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// File name of the rendered installer definition inside the build directory.
pub const NSI_FILE_NAME: &str = "installer.nsi";

/// Interpreter used by the installer to run the PATH helper.
const INSTALLED_PYTHON: &str = r#""$INSTDIR\Python\python""#;

#[derive(Debug, Serialize)]
struct PlacedEntry {
    name: String,
    destination: String,
    install_path: String,
}

#[derive(Debug, Serialize)]
struct PlacedDirectory {
    name: String,
    destination: String,
    install_path: String,
    source_glob: String,
}

#[derive(Debug, Serialize)]
struct SupportFile {
    name: String,
    source: String,
}

#[derive(Debug, Serialize)]
struct IconFile {
    name: String,
    install_path: String,
}

/// One row of the shortcut table.
#[derive(Debug, Serialize)]
pub struct ShortcutEntry {
    pub name: String,
    pub target: String,
    pub parameters: String,
    /// Icon file name in the build directory, if any.
    pub icon: Option<String>,
    pub icon_path: String,
    pub lnk_path: String,
}

/// Everything the installer template can refer to.
#[derive(Debug, Serialize)]
struct NsiNamespace<'a> {
    app_name: &'a str,
    app_version: &'a str,
    version_nsis: String,
    publisher: &'a str,
    installer_name: String,
    grouped_files: Vec<FileGroup>,
    icon: Option<String>,
    icon_install_path: Option<String>,
    icon_files: Vec<IconFile>,
    arch_tag: &'static str,
    py_version: &'a str,
    py_bit: u32,
    py_major_version: u32,
    is_64bit: bool,
    single_shortcut: bool,
    shortcuts: Vec<ShortcutEntry>,
    has_commands: bool,
    python: &'static str,
    license_file: Option<String>,
    install_dirs: Vec<PlacedDirectory>,
    extra_files: &'a [ExtraFile],
    install_files: Vec<PlacedEntry>,
    msvcrt_files: Vec<SupportFile>,
}

/// Derives the shortcut table.
///
/// Every shortcut needs a target. A shortcut icon outside the build
/// directory is copied in; shortcuts without one use the bundle icon.
pub fn shortcut_table(settings: &Settings) -> Result<Vec<ShortcutEntry>> {
    let shortcuts = settings.shortcuts();
    let single = shortcuts.len() == 1;
    let build_dir = settings.build_dir();

    let mut table = Vec::with_capacity(shortcuts.len());
    for shortcut in shortcuts {
        if shortcut.target.trim().is_empty() {
            return Err(Error::Configuration(format!(
                "shortcut '{}' must have a target",
                shortcut.name
            )));
        }

        let icon = match &shortcut.icon {
            Some(path) => Some(stage_icon(path, build_dir)?),
            None => settings.icon_name(),
        };

        let lnk_path = if single {
            format!("$SMPROGRAMS\\{}.lnk", shortcut.name)
        } else {
            format!("$SMPROGRAMS\\${{PRODUCT_NAME}}\\{}.lnk", shortcut.name)
        };

        table.push(ShortcutEntry {
            name: shortcut.name.clone(),
            target: shortcut.target.clone(),
            parameters: shortcut.parameters.clone().unwrap_or_default(),
            icon_path: icon
                .as_deref()
                .map(|i| nsis_join(INSTALL_ROOT, i))
                .unwrap_or_default(),
            icon,
            lnk_path,
        });
    }
    Ok(table)
}

/// Copies `icon` into the build directory unless a file of that name is there.
fn stage_icon(icon: &Path, build_dir: &Path) -> Result<String> {
    let name = icon
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::Configuration(format!("invalid icon path {}", icon.display())))?;
    let staged = build_dir.join(&name);
    if !staged.exists() {
        std::fs::copy(icon, &staged).fs_context("copying shortcut icon", icon)?;
    }
    Ok(name)
}

fn icon_files(settings: &Settings, shortcuts: &[ShortcutEntry]) -> Vec<IconFile> {
    let mut names: Vec<String> = Vec::new();
    let candidates = settings
        .icon_name()
        .into_iter()
        .chain(shortcuts.iter().filter_map(|s| s.icon.clone()));
    for name in candidates {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
        .into_iter()
        .map(|name| IconFile {
            install_path: nsis_join(INSTALL_ROOT, &name),
            name,
        })
        .collect()
}

fn namespace<'a>(settings: &'a Settings, manifest: &'a InstallManifest) -> Result<NsiNamespace<'a>> {
    let shortcuts = shortcut_table(settings)?;
    let icon = settings.icon_name();
    let arch = settings.arch();

    let install_files = manifest
        .files()
        .iter()
        .map(|f| PlacedEntry {
            install_path: nsis_join(&f.destination, &f.name),
            name: f.name.clone(),
            destination: f.destination.clone(),
        })
        .collect();

    let install_dirs = manifest
        .directories()
        .iter()
        .map(|d| PlacedDirectory {
            install_path: nsis_join(&d.destination, &d.name),
            source_glob: format!("{}\\*.*", d.name),
            name: d.name.clone(),
            destination: d.destination.clone(),
        })
        .collect();

    let msvcrt_files = manifest
        .runtime_support_files()
        .iter()
        .map(|name| SupportFile {
            source: format!("{MSVCRT_DIR}\\{name}"),
            name: name.clone(),
        })
        .collect();

    Ok(NsiNamespace {
        app_name: settings.app_name(),
        app_version: settings.version_string(),
        version_nsis: utils::format_version_for_nsis(settings.version_string()),
        publisher: settings.package().publisher.as_deref().unwrap_or(""),
        installer_name: settings.installer_name(),
        grouped_files: manifest.group_files_by_destination(),
        icon_install_path: icon.as_deref().map(|i| nsis_join(INSTALL_ROOT, i)),
        icon_files: icon_files(settings, &shortcuts),
        icon,
        arch_tag: arch.arch_tag(),
        py_version: settings.py_version(),
        py_bit: arch.bits(),
        py_major_version: settings.py_version_tuple().0,
        is_64bit: arch.bits() == 64,
        single_shortcut: shortcuts.len() == 1,
        shortcuts,
        has_commands: !settings.commands().is_empty(),
        python: INSTALLED_PYTHON,
        license_file: settings.license_name(),
        install_dirs,
        extra_files: manifest.extra_files(),
        install_files,
        msvcrt_files,
    })
}

/// Renders the installer definition to a string.
pub fn render_nsi_script(settings: &Settings, manifest: &InstallManifest) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string(NSI_FILE_NAME, NSI_TEMPLATE)
        .map_err(|e| Error::GenericError(format!("failed to register NSI template: {e}")))?;

    let data = namespace(settings, manifest)?;
    Ok(handlebars.render(NSI_FILE_NAME, &data)?)
}

/// Generate NSI installer script from template.
///
/// Returns the path of `installer.nsi` inside the build directory.
pub async fn generate_nsi_script(settings: &Settings, manifest: &InstallManifest) -> Result<PathBuf> {
    let content = render_nsi_script(settings, manifest)?;
    let nsi_path = settings.build_dir().join(NSI_FILE_NAME);
    utils::write_utf8_bom(&nsi_path, &content).await?;
    log::debug!("Wrote {}", nsi_path.display());
    Ok(nsi_path)
}
