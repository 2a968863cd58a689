//! pywinpack - Windows bundles for Python projects.
//!
//! This binary assembles a Python project into an NSIS installer and a
//! portable zip archive.

use clap::Parser;
use pywinpack::cli::{self, Args};
use std::process;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // RUST_LOG wins; --verbose only moves the default
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let exit_code = match cli::execute(&args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            for suggestion in e.recovery_suggestions() {
                eprintln!("  hint: {suggestion}");
            }
            1
        }
    };

    process::exit(exit_code);
}
