//! Command line interface for pywinpack.
//!
//! Loads the project configuration, assembles the bundle, and reports the
//! produced artifacts.

mod args;

pub use args::Args;

use crate::{
    bundler::Bundler,
    error::{CliError, Result},
    metadata,
};

/// Runs a build for already-parsed arguments.
pub async fn execute(args: &Args) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let settings = metadata::load_settings(&args.project)?;
    let mut bundler = Bundler::new(settings)?;

    bundler.prepare().await?;
    let artifacts = bundler.bundle_types(&args.package_types()).await?;

    for artifact in &artifacts {
        println!(
            "{:<5} {} ({} bytes)",
            artifact.package_type,
            artifact.path.display(),
            artifact.size
        );
        println!("      sha256 {}", artifact.checksum);
    }
    Ok(0)
}
