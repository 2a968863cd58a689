//! Locating the NSIS compiler.

use crate::bundler::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Default install locations checked after `PATH`.
const WELL_KNOWN_LOCATIONS: &[&str] = &[
    r"C:\Program Files (x86)\NSIS\makensis.exe",
    r"C:\Program Files\NSIS\makensis.exe",
];

/// Get the makensis executable.
///
/// An explicitly configured path wins; otherwise `PATH` is searched, then the
/// default NSIS install directories.
pub fn find_makensis(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(Error::ExternalToolFailure {
            tool: "makensis".into(),
            reason: format!("configured compiler {} does not exist", path.display()),
        });
    }

    if let Ok(path) = which::which("makensis") {
        return Ok(path);
    }

    WELL_KNOWN_LOCATIONS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
        .ok_or_else(|| Error::ExternalToolFailure {
            tool: "makensis".into(),
            reason: "makensis not found. Install NSIS, set `makensis` in the configuration, \
                     or pass --no-installer"
                .into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("makensis.exe");
        let err = find_makensis(Some(&missing)).unwrap_err();
        assert!(matches!(err, Error::ExternalToolFailure { .. }));

        std::fs::write(&missing, b"").unwrap();
        assert_eq!(find_makensis(Some(&missing)).unwrap(), missing);
    }
}
