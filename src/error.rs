//! Top-level error types for the command line tool.
//!
//! Engine failures arrive as [`crate::bundler::Error`]; this module wraps
//! them together with argument errors for `main`.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for all bundler operations
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Bundler errors
    #[error("{0}")]
    Bundler(#[from] crate::bundler::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl BundlerError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        use crate::bundler::Error as Engine;

        match self {
            BundlerError::Toml(_) => vec!["Fix the syntax error in pyproject.toml".to_string()],
            BundlerError::Bundler(Engine::Configuration(_)) => vec![
                "Check the [tool.pdm.win-packer] section of pyproject.toml".to_string(),
            ],
            BundlerError::Bundler(Engine::MergeConflict { .. }) => vec![
                "Two packages ship a file and a directory under the same name".to_string(),
                "Remove one of them from the lockfile or local_wheels".to_string(),
            ],
            BundlerError::Bundler(Engine::ExternalToolFailure { tool, .. }) if tool == "makensis" => {
                vec![
                    "Install NSIS or set `makensis` in the configuration".to_string(),
                    "Run with --no-installer to build only the zip archive".to_string(),
                ]
            }
            BundlerError::Bundler(Engine::Http(_)) => {
                vec!["Check your network connection and index_url".to_string()]
            }
            _ => Vec::new(),
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            BundlerError::Bundler(e) => e.is_recoverable(),
            _ => false,
        }
    }
}
