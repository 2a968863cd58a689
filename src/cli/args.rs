//! Command line argument parsing and validation.

use crate::bundler::PackageType;
use clap::Parser;
use std::path::PathBuf;

/// Windows bundler for Python projects
#[derive(Parser, Debug)]
#[command(
    name = "pywinpack",
    version,
    about = "Bundles a Python project into a Windows installer and zip archive",
    long_about = "Assembles a self-contained Windows bundle from a Python project: an embeddable
interpreter, the locked dependencies, native launchers for the configured commands,
and extra files. The bundle is shipped as an NSIS installer and a portable zip archive.

Configuration is read from [tool.pdm.win-packer] in pyproject.toml.

Usage:
  pywinpack
  pywinpack --project path/to/app --no-installer"
)]
pub struct Args {
    /// Project directory holding pyproject.toml
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub project: PathBuf,

    /// Skip the NSIS installer
    #[arg(long)]
    pub no_installer: bool,

    /// Skip the zip archive
    #[arg(long)]
    pub no_archive: bool,

    /// Log per-file detail
    #[arg(short, long, env = "PYWINPACK_VERBOSE")]
    pub verbose: bool,
}

impl Args {
    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if !self.project.is_dir() {
            return Err(format!(
                "Project directory {} does not exist",
                self.project.display()
            ));
        }
        if self.no_installer && self.no_archive {
            return Err("--no-installer and --no-archive together leave nothing to build".into());
        }
        Ok(())
    }

    /// Artifact kinds to produce, in build order.
    pub fn package_types(&self) -> Vec<PackageType> {
        PackageType::all()
            .iter()
            .copied()
            .filter(|t| match t {
                PackageType::Nsis => !self.no_installer,
                PackageType::Zip => !self.no_archive,
            })
            .collect()
    }
}
