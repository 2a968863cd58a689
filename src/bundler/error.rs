//! Error types for bundle assembly and artifact generation.
//!
//! The first five variants are the failure kinds the pipeline reasons about;
//! everything below them is plumbing from the crates the bundler sits on.

use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Result type alias for bundler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while assembling a bundle or generating its artifacts.
#[derive(Error, Debug)]
pub enum Error {
    /// A required configuration value is missing or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A directory and a regular file collided while merging two trees.
    #[error("merge conflict: {} clashes with {}", source_path.display(), destination.display())]
    MergeConflict {
        /// Entry in the tree being merged in
        source_path: PathBuf,
        /// Entry of the other type already present in the destination tree
        destination: PathBuf,
    },

    /// A package archive produced nothing to install.
    #[error("did not find any files to extract from {}", archive.display())]
    ExtractionEmpty {
        /// The offending archive
        archive: PathBuf,
    },

    /// No usable binary package exists for a dependency.
    #[error("cannot resolve {dependency}: {reason}")]
    DependencyUnresolved {
        /// `name==version` of the dependency
        dependency: String,
        /// Why it was not resolved
        reason: String,
    },

    /// An external tool or remote service failed.
    #[error("{tool} failed: {reason}")]
    ExternalToolFailure {
        /// Tool or service name
        tool: String,
        /// Failure description
        reason: String,
    },

    /// Filesystem operation failed on a specific path.
    #[error("{context} {}: {source}", path.display())]
    Fs {
        /// What was being done
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Spawning a child process failed.
    #[error("failed to run {command}: {error}")]
    CommandFailed {
        /// Program name
        command: String,
        /// Underlying error
        error: io::Error,
    },

    /// Bare IO error.
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    /// Zip archive error.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Walking a directory tree failed.
    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Stripping a path prefix failed.
    #[error("path error: {0}")]
    StripPrefix(#[from] std::path::StripPrefixError),

    /// Glob pattern could not be compiled.
    #[error("invalid exclude pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Template rendering failed.
    #[error("template error: {0}")]
    Template(#[from] handlebars::RenderError),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML parsing error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Anything else.
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// Whether the pipeline may log this error and carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::DependencyUnresolved { .. })
    }
}

/// Attaches a path and a description to IO failures.
pub trait ErrorExt<T> {
    /// Convert the error into [`Error::Fs`].
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T, E: Into<io::Error>> ErrorExt<T> for std::result::Result<T, E> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|e| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            source: e.into(),
        })
    }
}

/// Adds a message to a missing value or a failure.
pub trait Context<T> {
    /// Turn `None`/`Err` into [`Error::GenericError`] carrying `msg`.
    fn context<C: Display>(self, msg: C) -> Result<T>;
}

impl<T> Context<T> for Option<T> {
    fn context<C: Display>(self, msg: C) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(msg.to_string()))
    }
}

impl<T> Context<T> for Result<T> {
    fn context<C: Display>(self, msg: C) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{msg}: {e}")))
    }
}

/// Return early with an [`Error::GenericError`].
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($($arg)*)))
    };
}
