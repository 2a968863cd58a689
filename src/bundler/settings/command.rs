//! Launcher command definitions.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::{fmt, path::Path, str::FromStr};

/// A `module.path:function` reference.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntryPoint {
    /// Dotted module path, e.g. `mypkg.cli`.
    pub module: String,
    /// Function name, e.g. `main`.
    pub function: String,
}

impl FromStr for EntryPoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            Error::Configuration(format!(
                "invalid entry point {s:?}: expected \"module.path:function\""
            ))
        };

        let (module, function) = s.split_once(':').ok_or_else(invalid)?;
        let module = module.trim();
        let function = function.trim();

        if !module.split('.').all(is_identifier) || !is_identifier(function) {
            return Err(invalid());
        }

        Ok(Self {
            module: module.to_string(),
            function: function.to_string(),
        })
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.function)
    }
}

/// Python identifier check: a letter or underscore, then letters, digits or underscores.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// Extra source inlined into a launcher's bootstrap script.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Preamble {
    /// Source text given directly.
    InlineSource(String),
    /// Path to a file holding the source.
    FilePath(std::path::PathBuf),
    /// Nothing to inline.
    #[default]
    None,
}

impl Preamble {
    /// Reads the preamble text.
    ///
    /// Relative file paths are taken from `base`.
    pub fn resolve(&self, base: &Path) -> Result<String> {
        match self {
            Preamble::InlineSource(source) => Ok(source.clone()),
            Preamble::FilePath(path) => {
                let path = base.join(path);
                std::fs::read_to_string(&path).fs_context("reading extra preamble", &path)
            }
            Preamble::None => Ok(String::new()),
        }
    }
}

/// One native launcher to generate.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommandSpec {
    /// Launcher name; the executable is `<name>.exe`.
    pub name: String,
    /// Function the launcher calls.
    pub entry_point: EntryPoint,
    /// Console (`true`) or windowed (`false`) program.
    pub console: bool,
    /// Extra source run before the entry point, already resolved to text.
    pub extra_preamble: String,
    /// Environment variables set before the entry point runs, in order.
    pub env: Vec<(String, String)>,
}

impl CommandSpec {
    /// Creates a console command with no preamble and no environment.
    pub fn new(name: impl Into<String>, entry_point: &str) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            entry_point: entry_point.parse()?,
            console: true,
            extra_preamble: String::new(),
            env: Vec::new(),
        })
    }
}
