//! Pinned dependencies read from the project lockfile.

use crate::bundler::error::{Error, ErrorExt, Result};
use serde::Deserialize;
use std::{fmt, path::Path};

/// A dependency pinned to an exact version.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DependencySpec {
    /// Distribution name as written in the lockfile.
    pub name: String,
    /// Exact version.
    pub version: String,
}

impl DependencySpec {
    /// Creates a pinned dependency.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=={}", self.name, self.version)
    }
}

#[derive(Deserialize)]
struct Lockfile {
    #[serde(default)]
    package: Vec<LockedPackage>,
}

#[derive(Deserialize)]
struct LockedPackage {
    name: String,
    version: String,
    #[serde(default)]
    groups: Option<Vec<String>>,
}

/// Reads the runtime dependencies pinned in `pdm.lock`.
///
/// Entries restricted to non-default groups are left out, as are extras
/// entries (`name[extra]`), whose files come with the base package.
pub fn read_lockfile(path: &Path) -> Result<Vec<DependencySpec>> {
    if !path.is_file() {
        return Err(Error::Configuration(format!(
            "no lockfile found at {}, please run `pdm lock` first",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).fs_context("reading lockfile", path)?;
    parse_lockfile(&content)
}

/// Parses lockfile text; see [`read_lockfile`].
pub fn parse_lockfile(content: &str) -> Result<Vec<DependencySpec>> {
    let lockfile: Lockfile = toml::from_str(content)?;

    Ok(lockfile
        .package
        .into_iter()
        .filter(|p| !p.name.contains('['))
        .filter(|p| {
            p.groups
                .as_ref()
                .is_none_or(|groups| groups.iter().any(|g| g == "default"))
        })
        .map(|p| DependencySpec::new(p.name, p.version))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOCK: &str = r#"
[metadata]
groups = ["default", "dev"]

[[package]]
name = "requests"
version = "2.31.0"
groups = ["default"]

[[package]]
name = "pytest"
version = "7.4.0"
groups = ["dev"]

[[package]]
name = "requests[socks]"
version = "2.31.0"
groups = ["default"]

[[package]]
name = "six"
version = "1.16.0"
"#;

    #[test]
    fn keeps_default_group_only() {
        let deps = parse_lockfile(LOCK).unwrap();
        assert_eq!(
            deps,
            vec![
                DependencySpec::new("requests", "2.31.0"),
                DependencySpec::new("six", "1.16.0"),
            ]
        );
        assert_eq!(deps[0].to_string(), "requests==2.31.0");
    }

    #[test]
    fn missing_lockfile_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_lockfile(&dir.path().join("pdm.lock")),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn empty_lockfile() {
        assert!(parse_lockfile("").unwrap().is_empty());
    }
}
