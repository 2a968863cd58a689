//! Queued extra files and directories.

use super::RESERVED_BUILD_NAMES;
use crate::bundler::{
    error::{Error, Result},
    manifest::InstallManifest,
    settings::Settings,
    utils::{
        exclude::ExcludeMatcher,
        fs::{copy_dir, copy_file, unique_destination},
    },
};

/// Copies every queued extra input into the build directory.
///
/// Each lands under a free name (`name.1.ext`, `name.2.ext`, ... when taken)
/// and is recorded as a file or directory under its requested destination.
/// Directory copies honour the configured exclude patterns.
pub fn materialize_extra_files(settings: &Settings, manifest: &mut InstallManifest) -> Result<()> {
    let exclude = ExcludeMatcher::new(settings.exclude())?;
    let exclude = (!exclude.is_empty()).then_some(&exclude);
    let build_dir = settings.build_dir();

    for extra in manifest.extra_files().to_vec() {
        let name = extra
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::Configuration(format!("invalid extra file {}", extra.source.display()))
            })?;

        let dest = unique_destination(build_dir, &name, RESERVED_BUILD_NAMES);
        let final_name = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or(name);
        log::debug!("Copying {} -> {final_name}", extra.source.display());

        if extra.source.is_dir() {
            copy_dir(&extra.source, &dest, exclude)?;
            manifest.add_directory(final_name, extra.destination);
        } else {
            copy_file(&extra.source, &dest)?;
            manifest.add_file(final_name, extra.destination);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{
        manifest::INSTALL_ROOT,
        settings::{PackageSettings, SettingsBuilder},
    };
    use std::path::Path;

    fn settings(root: &Path, exclude: Vec<String>) -> Settings {
        let settings = SettingsBuilder::new()
            .project_root(root)
            .package_settings(PackageSettings {
                app_name: "App".into(),
                version: "1.0".into(),
                ..Default::default()
            })
            .exclude(exclude)
            .build()
            .unwrap();
        std::fs::create_dir_all(settings.build_dir()).unwrap();
        settings
    }

    #[test]
    fn same_named_files_get_numbered() {
        let root = tempfile::tempdir().unwrap();
        let settings = settings(root.path(), Vec::new());
        for dir in ["a", "b", "c"] {
            std::fs::create_dir_all(root.path().join(dir)).unwrap();
            std::fs::write(root.path().join(dir).join("report.txt"), dir).unwrap();
        }

        let mut manifest = InstallManifest::new();
        manifest.add_extra_file(root.path().join("a/report.txt"), INSTALL_ROOT);
        manifest.add_extra_file(root.path().join("b/report.txt"), "$INSTDIR\\docs");
        manifest.add_extra_file(root.path().join("c/report.txt"), INSTALL_ROOT);
        materialize_extra_files(&settings, &mut manifest).unwrap();

        let names: Vec<&str> = manifest.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["report.txt", "report.1.txt", "report.2.txt"]);
        assert_eq!(manifest.files()[1].destination, "$INSTDIR\\docs");
        let build = settings.build_dir();
        assert_eq!(std::fs::read_to_string(build.join("report.2.txt")).unwrap(), "c");
    }

    #[test]
    fn installer_definition_name_is_never_used() {
        let root = tempfile::tempdir().unwrap();
        let settings = settings(root.path(), Vec::new());
        std::fs::write(root.path().join("installer.nsi"), b"user file").unwrap();

        let mut manifest = InstallManifest::new();
        manifest.add_extra_file(root.path().join("installer.nsi"), INSTALL_ROOT);
        materialize_extra_files(&settings, &mut manifest).unwrap();

        assert_eq!(manifest.files()[0].name, "installer.1.nsi");
    }

    #[test]
    fn directories_respect_excludes() {
        let root = tempfile::tempdir().unwrap();
        let settings = settings(root.path(), vec!["data/cache".into()]);
        std::fs::create_dir_all(root.path().join("data/cache")).unwrap();
        std::fs::write(root.path().join("data/cache/tmp.bin"), b"x").unwrap();
        std::fs::write(root.path().join("data/config.ini"), b"[a]").unwrap();

        let mut manifest = InstallManifest::new();
        manifest.add_extra_file(root.path().join("data"), INSTALL_ROOT);
        materialize_extra_files(&settings, &mut manifest).unwrap();

        assert_eq!(manifest.directories()[0].name, "data");
        let copied = settings.build_dir().join("data");
        assert!(copied.join("config.ini").is_file());
        assert!(!copied.join("cache").exists());
    }
}
