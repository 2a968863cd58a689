//! Windows bundle assembly engine.
//!
//! Turns a Python project into a self-contained Windows application bundle:
//! an embeddable interpreter, the project's locked dependencies unpacked from
//! wheels, native launchers for its commands, and any extra files. The
//! assembled build directory is then shipped as an NSIS installer and a
//! portable zip archive.
//!
//! # Module Organization
//!
//! - [`settings`] - immutable build description and its builder
//! - [`manifest`] - what ships and where it lands
//! - [`wheel`] - lockfile reading, wheel lookup, and extraction
//! - [`launcher`] - native launcher generation
//! - [`assembly`] - the ordered assembly steps
//! - [`builder`] - the [`Bundler`] orchestrator
//! - [`platform`] - installer and archive generators
//! - [`utils`] - filesystem, exclusion, and download helpers

pub mod assembly;
pub mod builder;
pub mod error;
pub mod launcher;
pub mod manifest;
pub mod platform;
pub mod settings;
pub mod utils;
pub mod wheel;

pub use builder::{BundledArtifact, Bundler};
pub use error::{Error, Result};
pub use manifest::{INSTALL_ROOT, InstallManifest};
pub use platform::PackageType;
pub use settings::{
    Arch, CommandSpec, EntryPoint, PackageSettings, Preamble, Settings, SettingsBuilder,
    ShortcutSpec,
};
pub use wheel::{DependencySpec, PackageSource, PypiSource, TargetPython, WheelLookup};
