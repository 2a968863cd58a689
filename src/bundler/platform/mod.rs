//! Artifact generators.
//!
//! Both generators read the build directory and the frozen install manifest;
//! neither depends on the other's output.

pub mod windows;

use std::fmt;

/// Kind of distributable produced from the build directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PackageType {
    /// NSIS installer executable.
    Nsis,
    /// Portable zip archive.
    Zip,
}

impl PackageType {
    /// Every artifact kind, in build order.
    pub fn all() -> &'static [PackageType] {
        &[PackageType::Nsis, PackageType::Zip]
    }

    /// Short lowercase name used in output.
    pub fn short_name(&self) -> &'static str {
        match self {
            PackageType::Nsis => "nsis",
            PackageType::Zip => "zip",
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
