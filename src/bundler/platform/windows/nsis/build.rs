//! NSIS installer build execution.
//!
//! Compiles NSI scripts into Windows installer executables using makensis.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::{path::Path, process::Stdio};

/// Run makensis to compile NSI script into installer executable.
///
/// The compiler's output is discarded; a non-zero exit status is an
/// [`Error::ExternalToolFailure`].
pub async fn run_makensis(makensis: &Path, nsi_path: &Path, output_path: &Path) -> Result<()> {
    log::info!("Running {}...", makensis.display());

    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .fs_context("creating installer output directory", parent)?;
    }

    let status = tokio::process::Command::new(makensis)
        .arg("-V2")
        .args(["-INPUTCHARSET", "UTF8"])
        .arg(format!("-DOUTPUT_FILE={}", output_path.display()))
        .arg(nsi_path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|e| Error::CommandFailed {
            command: makensis.display().to_string(),
            error: e,
        })?;

    if !status.success() {
        return Err(Error::ExternalToolFailure {
            tool: "makensis".into(),
            reason: format!("compilation of {} failed ({status})", nsi_path.display()),
        });
    }

    if !output_path.is_file() {
        return Err(Error::ExternalToolFailure {
            tool: "makensis".into(),
            reason: format!("no installer written to {}", output_path.display()),
        });
    }

    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn fake_compiler(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("makensis");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn non_zero_exit_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let compiler = fake_compiler(dir.path(), "exit 1");
        let err = run_makensis(&compiler, &dir.path().join("installer.nsi"), &dir.path().join("out.exe"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ExternalToolFailure { .. }));
    }

    #[tokio::test]
    async fn output_flag_names_the_installer() {
        let dir = tempfile::tempdir().unwrap();
        // Writes to the path passed as -DOUTPUT_FILE=<path>.
        let compiler = fake_compiler(
            dir.path(),
            r#"for a in "$@"; do case "$a" in -DOUTPUT_FILE=*) echo ok > "${a#-DOUTPUT_FILE=}";; esac; done"#,
        );
        let output = dir.path().join("dist").join("App_1.0.exe");
        run_makensis(&compiler, &dir.path().join("installer.nsi"), &output)
            .await
            .unwrap();
        assert!(output.is_file());
    }
}
