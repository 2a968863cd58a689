//! Bundle orchestration and coordination.
//!
//! This module provides the main [`Bundler`] orchestrator that assembles a
//! build directory and produces the distributable artifacts from it.
//!
//! # Overview
//!
//! The bundler:
//! 1. Reads configuration from [`Settings`](crate::bundler::Settings)
//! 2. Recreates the build and dist directories
//! 3. Assembles the bundle, filling the install manifest
//! 4. Runs the requested artifact generators
//! 5. Returns [`BundledArtifact`] results with size and checksum
//!
//! # Example
//!
//! ```no_run
//! use pywinpack::bundler::{Bundler, PackageSettings, SettingsBuilder};
//!
//! # async fn example() -> pywinpack::bundler::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .project_root("/work/myapp")
//!     .package_settings(PackageSettings {
//!         app_name: "MyApp".into(),
//!         version: "1.0.0".into(),
//!         ..Default::default()
//!     })
//!     .build()?;
//!
//! let mut bundler = Bundler::new(settings)?;
//! let artifacts = bundler.bundle().await?;
//!
//! for artifact in artifacts {
//!     println!("Created: {} ({} bytes)", artifact.path.display(), artifact.size);
//!     println!("SHA256: {}", artifact.checksum);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA256 checksum calculation for artifacts
//! - [`orchestrator`] - Main [`Bundler`] struct and bundling operations

mod checksum;
mod orchestrator;

pub use checksum::calculate_sha256;
pub use orchestrator::Bundler;

use crate::bundler::PackageType;
use std::path::PathBuf;

/// A produced distributable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundledArtifact {
    /// Kind of artifact.
    pub package_type: PackageType,
    /// Absolute output path.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Hex-encoded SHA-256 of the file.
    pub checksum: String,
}
