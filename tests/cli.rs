//! Command line failures that stop before any download.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn pywinpack() -> Command {
    Command::cargo_bin("pywinpack").unwrap()
}

#[test]
fn command_without_entry_point_is_rejected() {
    let project = TempDir::new().unwrap();
    std::fs::write(
        project.path().join("pyproject.toml"),
        r#"
[project]
name = "myapp"
version = "1.0"

[tool.pdm.win-packer.commands.app]
console = true
"#,
    )
    .unwrap();

    pywinpack()
        .arg("--project")
        .arg(project.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("entry_point"))
        .stderr(predicate::str::contains("hint:"));

    assert!(!project.path().join("build").exists());
}

#[test]
fn missing_pyproject_is_reported() {
    let project = TempDir::new().unwrap();

    pywinpack()
        .arg("--project")
        .arg(project.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("pyproject.toml"));
}

#[test]
fn skipping_every_artifact_is_rejected() {
    let project = TempDir::new().unwrap();

    pywinpack()
        .args(["--no-installer", "--no-archive", "--project"])
        .arg(project.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nothing to build"));
}
