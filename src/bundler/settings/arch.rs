//! Target interpreter bit width and the names derived from it.

use crate::bundler::error::{Error, Result};

/// Bit width of the bundled Windows interpreter.
///
/// Every architecture-specific name in the bundle (download file, wheel
/// platform tag, launcher stub, redistributable folder) hangs off this.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Arch {
    /// 32-bit x86 interpreter.
    X86,
    /// 64-bit x86_64 interpreter.
    #[default]
    X64,
}

impl Arch {
    /// Parses the configured bit width (32 or 64).
    pub fn from_bits(bits: i64) -> Result<Self> {
        match bits {
            32 => Ok(Arch::X86),
            64 => Ok(Arch::X64),
            other => Err(Error::Configuration(format!(
                "py_bit must be 32 or 64, got {other}"
            ))),
        }
    }

    /// Bit width as a number.
    pub fn bits(self) -> u32 {
        match self {
            Arch::X86 => 32,
            Arch::X64 => 64,
        }
    }

    /// Suffix of the embeddable distribution archive.
    pub fn embed_suffix(self) -> &'static str {
        match self {
            Arch::X86 => "win32",
            Arch::X64 => "amd64",
        }
    }

    /// Wheel platform tag for this architecture.
    pub fn platform_tag(self) -> &'static str {
        match self {
            Arch::X86 => "win32",
            Arch::X64 => "win_amd64",
        }
    }

    /// Directory name of the redistributable runtime files.
    pub fn msvcrt_dir(self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::X64 => "x64",
        }
    }

    /// Tag appended to the installer's Python references.
    pub fn arch_tag(self) -> &'static str {
        match self {
            Arch::X86 => "",
            Arch::X64 => ".amd64",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_widths() {
        assert_eq!(Arch::from_bits(32).unwrap(), Arch::X86);
        assert_eq!(Arch::from_bits(64).unwrap().bits(), 64);
        assert!(matches!(Arch::from_bits(16), Err(Error::Configuration(_))));
    }

    #[test]
    fn derived_names() {
        assert_eq!(Arch::X64.platform_tag(), "win_amd64");
        assert_eq!(Arch::X86.embed_suffix(), "win32");
        assert_eq!(Arch::X86.msvcrt_dir(), "x86");
        assert_eq!(Arch::X64.arch_tag(), ".amd64");
    }
}
