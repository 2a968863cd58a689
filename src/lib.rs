//! Windows bundler library for Python projects
//!
//! This library provides the bundling functionality for creating:
//! - an assembled build directory (embeddable Python, dependencies, launchers)
//! - a Windows installer (.exe via NSIS)
//! - a portable zip archive
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
