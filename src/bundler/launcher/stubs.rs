//! Prebuilt native launcher stubs.
//!
//! The stubs are distlib's simple launchers: `t` (console) and `w`
//! (windowed) variants for 32 and 64 bit. They find the zip appended to
//! their own image and run it with the interpreter named in the shebang line.

use crate::{
    bail,
    bundler::{
        error::{ErrorExt, Result},
        settings::{Arch, CommandSpec},
        wheel::PackageSource,
    },
};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Where stubs are fetched from when no local directory is configured.
pub const DISTLIB_STUB_URL: &str = "https://raw.githubusercontent.com/pypa/distlib/0.3.8/distlib";

/// One of the four stub binaries.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct StubVariant {
    /// Console (`t`) or windowed (`w`) stub.
    pub console: bool,
    /// 32 or 64 bit.
    pub bits: u32,
}

impl StubVariant {
    /// Variant for a command on `arch`.
    pub fn for_command(command: &CommandSpec, arch: Arch) -> Self {
        Self {
            console: command.console,
            bits: arch.bits(),
        }
    }

    /// Stub file name, e.g. `t64.exe`.
    pub fn file_name(self) -> String {
        format!("{}{}.exe", if self.console { 't' } else { 'w' }, self.bits)
    }

    /// Shebang line pointing the stub at the bundled interpreter.
    pub fn shebang(self) -> &'static [u8] {
        if self.console {
            b"#!<launcher_dir>\\..\\Python\\python.exe\r\n"
        } else {
            b"#!<launcher_dir>\\..\\Python\\pythonw.exe\r\n"
        }
    }
}

/// Stub binaries available to the launcher generator.
#[derive(Clone, Debug, Default)]
pub struct LauncherStubs {
    paths: BTreeMap<StubVariant, PathBuf>,
}

impl LauncherStubs {
    /// Stubs read from a directory holding `t32.exe`, `t64.exe`, `w32.exe`, `w64.exe`.
    pub fn from_dir(dir: &Path) -> Self {
        let mut paths = BTreeMap::new();
        for console in [true, false] {
            for bits in [32, 64] {
                let variant = StubVariant { console, bits };
                paths.insert(variant, dir.join(variant.file_name()));
            }
        }
        Self { paths }
    }

    /// Fetches the variants the commands need through `source`.
    pub async fn fetch<S: PackageSource>(
        source: &S,
        commands: &[CommandSpec],
        arch: Arch,
    ) -> Result<Self> {
        let mut paths = BTreeMap::new();
        for command in commands {
            let variant = StubVariant::for_command(command, arch);
            if paths.contains_key(&variant) {
                continue;
            }
            let url = format!("{DISTLIB_STUB_URL}/{}", variant.file_name());
            paths.insert(variant, source.fetch(&url).await?);
        }
        Ok(Self { paths })
    }

    /// Reads the stub binary for `variant`.
    pub fn read(&self, variant: StubVariant) -> Result<Vec<u8>> {
        let Some(path) = self.paths.get(&variant) else {
            bail!("no launcher stub {} available", variant.file_name());
        };
        std::fs::read(path).fs_context("reading launcher stub", path)
    }
}
