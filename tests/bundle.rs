//! End-to-end assembly against a local package source.

use pywinpack::{
    bundler::{
        Bundler, DependencySpec, Error, PackageSource, PackageType, TargetPython, WheelLookup,
    },
    metadata,
};
use std::{
    collections::HashMap,
    io::{Read, Write},
    path::{Path, PathBuf},
};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

const T64_STUB: &[u8] = b"MZ-console-64";
const W64_STUB: &[u8] = b"MZ-windowed-64";

/// Serves fixture files by the last segment of their URL.
struct LocalSource {
    dir: PathBuf,
    wheels: HashMap<String, String>,
    source_only: Vec<String>,
}

impl PackageSource for LocalSource {
    async fn find_wheel(
        &self,
        dependency: &DependencySpec,
        _target: &TargetPython,
    ) -> pywinpack::bundler::Result<WheelLookup> {
        if self.source_only.contains(&dependency.name) {
            return Ok(WheelLookup::SourceOnly);
        }
        Ok(match self.wheels.get(&dependency.name) {
            Some(filename) => WheelLookup::Wheel {
                filename: filename.clone(),
                url: format!("https://files.example.org/{filename}"),
            },
            None => WheelLookup::NotFound,
        })
    }

    async fn fetch(&self, url: &str) -> pywinpack::bundler::Result<PathBuf> {
        let name = url.rsplit('/').next().unwrap_or(url);
        let path = self.dir.join(name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(Error::GenericError(format!("no fixture for {url}")))
        }
    }
}

fn write_zip(path: &Path, members: &[(&str, &str)]) {
    let file = std::fs::File::create(path).unwrap();
    let mut zw = zip::ZipWriter::new(file);
    for (name, data) in members {
        zw.start_file(*name, SimpleFileOptions::default()).unwrap();
        zw.write_all(data.as_bytes()).unwrap();
    }
    zw.finish().unwrap();
}

fn zip_names(path: &Path) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

struct Fixture {
    _root: TempDir,
    project: PathBuf,
    source: LocalSource,
}

/// A project `myapp` depending on `mypkg`, with one console command and a
/// shortcut, plus the downloads it needs.
fn fixture(extra_config: &str, lock: &str) -> Fixture {
    let root = TempDir::new().unwrap();
    let project = root.path().join("myapp");
    let downloads = root.path().join("downloads");
    let stubs = project.join("stubs");
    std::fs::create_dir_all(&downloads).unwrap();
    std::fs::create_dir_all(&stubs).unwrap();

    std::fs::write(stubs.join("t64.exe"), T64_STUB).unwrap();
    std::fs::write(stubs.join("w64.exe"), W64_STUB).unwrap();

    std::fs::write(
        project.join("pyproject.toml"),
        format!(
            r#"
[project]
name = "myapp"
version = "1.0"

[tool.pdm.win-packer]
py_version = "3.10.11"
include_msvcrt = false
launcher_dir = "stubs"
{extra_config}

[tool.pdm.win-packer.commands.app]
entry_point = "mypkg.cli:main"
console = true

[tool.pdm.win-packer.shortcuts."My App"]
target = "$INSTDIR\\bin\\app.exe"
"#
        ),
    )
    .unwrap();
    std::fs::write(project.join("pdm.lock"), lock).unwrap();

    write_zip(
        &downloads.join("mypkg-1.0-py3-none-any.whl"),
        &[
            ("mypkg/__init__.py", ""),
            ("mypkg/cli.py", "def main():\n    print('hi')\n"),
            ("mypkg-1.0.data/purelib/mypkg/extra.py", "EXTRA = 1\n"),
            ("mypkg-1.0.dist-info/METADATA", "Name: mypkg\n"),
        ],
    );
    write_zip(
        &downloads.join("python-3.10.11-embed-amd64.zip"),
        &[
            ("python.exe", "MZ-python"),
            ("python310.zip", "PK"),
            ("python310._pth", "python310.zip\r\n."),
        ],
    );

    Fixture {
        _root: root,
        project,
        source: LocalSource {
            dir: downloads,
            wheels: HashMap::from([("mypkg".to_string(), "mypkg-1.0-py3-none-any.whl".to_string())]),
            source_only: Vec::new(),
        },
    }
}

const LOCK: &str = r#"
[[package]]
name = "mypkg"
version = "1.0"
groups = ["default"]
"#;

#[tokio::test]
async fn assembles_build_directory_and_archive() {
    let fx = fixture("", LOCK);
    let settings = metadata::load_settings(&fx.project).unwrap();
    let build = settings.build_dir().to_path_buf();

    let mut bundler = Bundler::with_source(settings, fx.source).unwrap();
    let report = bundler.prepare().await.unwrap();
    assert_eq!(report.installed, vec![DependencySpec::new("mypkg", "1.0")]);
    assert!(report.skipped.is_empty());

    assert!(build.join("pkgs/mypkg/__init__.py").is_file());
    assert!(build.join("pkgs/mypkg/extra.py").is_file());
    assert!(!build.join("pkgs/mypkg-1.0.data").exists());
    assert!(build.join("Python/python.exe").is_file());
    assert!(build.join("_system_path.py").is_file());

    let pth = std::fs::read_to_string(build.join("Python/python310._pth")).unwrap();
    assert!(pth.ends_with("..\\pkgs\r\nimport site\r\n"));

    let launcher = std::fs::read(build.join("bin/app.exe")).unwrap();
    assert!(launcher.starts_with(T64_STUB));

    let manifest = bundler.manifest();
    assert!(manifest.has_directory("bin"));
    assert!(manifest.has_directory("Python"));
    assert!(manifest.files().iter().all(|f| !f.name.contains("LICENSE")));

    let artifacts = bundler.bundle_types(&[PackageType::Zip]).await.unwrap();
    assert_eq!(artifacts.len(), 1);
    let archive = &artifacts[0];
    assert_eq!(archive.path.file_name().unwrap(), "myapp_1.0.zip");
    assert_eq!(archive.checksum.len(), 64);

    let names = zip_names(&archive.path);
    assert!(names.iter().any(|n| n == "pkgs/mypkg/extra.py"));
    assert!(names.iter().any(|n| n == "bin/app.exe"));
    assert!(!names.iter().any(|n| n == "_system_path.py"));
    assert!(!names.iter().any(|n| n == "installer.nsi"));
}

#[tokio::test]
async fn launcher_runs_entry_point() {
    let fx = fixture("", LOCK);
    let settings = metadata::load_settings(&fx.project).unwrap();
    let build = settings.build_dir().to_path_buf();

    let mut bundler = Bundler::with_source(settings, fx.source).unwrap();
    bundler.prepare().await.unwrap();

    let launcher = std::fs::read(build.join("bin/app.exe")).unwrap();
    let start = launcher
        .windows(4)
        .position(|w| w == b"PK\x03\x04")
        .expect("embedded archive");
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(&launcher[start..])).unwrap();
    let mut script = String::new();
    archive
        .by_name("__main__.py")
        .unwrap()
        .read_to_string(&mut script)
        .unwrap();
    assert!(script.contains("from mypkg.cli import main"));
}

#[tokio::test]
async fn unresolved_dependencies_are_skipped() {
    let lock = r#"
[[package]]
name = "mypkg"
version = "1.0"

[[package]]
name = "legacy"
version = "0.1"

[[package]]
name = "ghost"
version = "9.9"
"#;
    let mut fx = fixture("", lock);
    fx.source.source_only.push("legacy".to_string());
    let settings = metadata::load_settings(&fx.project).unwrap();

    let mut bundler = Bundler::with_source(settings, fx.source).unwrap();
    let report = bundler.prepare().await.unwrap();

    assert_eq!(report.installed, vec![DependencySpec::new("mypkg", "1.0")]);
    assert_eq!(report.skipped.len(), 2);
    assert!(report.skipped.iter().all(Error::is_recoverable));
}

#[tokio::test]
async fn extra_files_keep_names_and_destinations() -> anyhow::Result<()> {
    let fx = fixture(
        r#"files = ["README.txt", { path = "data", destination = '$INSTDIR/share' }]"#,
        LOCK,
    );
    std::fs::write(fx.project.join("README.txt"), "read me")?;
    std::fs::create_dir_all(fx.project.join("data"))?;
    std::fs::write(fx.project.join("data/table.csv"), "a,b")?;
    let settings = metadata::load_settings(&fx.project)?;
    let build = settings.build_dir().to_path_buf();

    let mut bundler = Bundler::with_source(settings, fx.source)?;
    bundler.prepare().await?;

    assert!(build.join("README.txt").is_file());
    assert!(build.join("data/table.csv").is_file());

    let manifest = bundler.manifest();
    assert!(
        manifest
            .files()
            .iter()
            .any(|f| f.name == "README.txt" && f.destination == "$INSTDIR")
    );
    assert!(
        manifest
            .directories()
            .iter()
            .any(|d| d.name == "data" && d.destination == "$INSTDIR\\share")
    );
    Ok(())
}

#[tokio::test]
async fn missing_lockfile_is_a_configuration_error() {
    let fx = fixture("", LOCK);
    std::fs::remove_file(fx.project.join("pdm.lock")).unwrap();
    let settings = metadata::load_settings(&fx.project).unwrap();
    let build = settings.build_dir().to_path_buf();
    std::fs::create_dir_all(&build).unwrap();
    std::fs::write(build.join("previous.txt"), "last run").unwrap();

    let mut bundler = Bundler::with_source(settings, fx.source).unwrap();
    let err = bundler.prepare().await.unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));

    assert!(build.join("previous.txt").is_file());
    assert!(!build.join("Python").exists());
}

#[tokio::test]
async fn missing_inputs_are_reported_before_the_build_starts() {
    for (config, input) in [
        ("icon = 'app.ico'", "icon"),
        ("license = 'LICENSE'", "license"),
        ("files = ['missing.txt']", "extra file"),
    ] {
        let fx = fixture(config, LOCK);
        let settings = metadata::load_settings(&fx.project).unwrap();
        let build = settings.build_dir().to_path_buf();
        std::fs::create_dir_all(&build).unwrap();
        std::fs::write(build.join("previous.txt"), "last run").unwrap();

        let mut bundler = Bundler::with_source(settings, fx.source).unwrap();
        match bundler.prepare().await.unwrap_err() {
            Error::Configuration(msg) => assert!(msg.contains(input), "{msg}"),
            other => panic!("expected a configuration error for {input}, got {other:?}"),
        }
        assert!(build.join("previous.txt").is_file(), "{input}");
    }
}

#[test]
fn dist_directory_at_project_root_is_refused() {
    let fx = fixture("dist_directory = '.'", LOCK);
    assert!(metadata::load_settings(&fx.project).is_err());
    assert!(fx.project.join("pyproject.toml").is_file());
    assert!(fx.project.join("pdm.lock").is_file());
}

#[cfg(unix)]
#[tokio::test]
async fn installer_is_compiled_and_kept_out_of_the_archive() {
    use std::os::unix::fs::PermissionsExt;

    let root = TempDir::new().unwrap();
    let makensis = root.path().join("makensis");
    std::fs::write(
        &makensis,
        "#!/bin/sh\nfor arg in \"$@\"; do\n  case \"$arg\" in -DOUTPUT_FILE=*) out=\"${arg#-DOUTPUT_FILE=}\";; esac\ndone\nprintf installer > \"$out\"\n",
    )
    .unwrap();
    std::fs::set_permissions(&makensis, std::fs::Permissions::from_mode(0o755)).unwrap();

    let fx = fixture(&format!("makensis = '{}'", makensis.display()), LOCK);
    let settings = metadata::load_settings(&fx.project).unwrap();
    let build = settings.build_dir().to_path_buf();

    let mut bundler = Bundler::with_source(settings, fx.source).unwrap();
    let artifacts = bundler.bundle().await.unwrap();
    assert_eq!(artifacts.len(), 2);
    assert_eq!(artifacts[0].package_type, PackageType::Nsis);
    assert_eq!(std::fs::read(&artifacts[0].path).unwrap(), b"installer");

    let nsi = std::fs::read(build.join("installer.nsi")).unwrap();
    assert!(nsi.starts_with(b"\xEF\xBB\xBF"));
    let nsi = String::from_utf8_lossy(&nsi);
    assert!(nsi.contains("My App.lnk"));
    assert!(nsi.contains("_system_path.py"));

    let names = zip_names(&artifacts[1].path);
    assert!(!names.iter().any(|n| n == "installer.nsi"));
    assert!(names.iter().any(|n| n == "Python/python.exe"));
}
