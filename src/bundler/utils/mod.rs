//! Shared helpers: filesystem merging and copying, exclusion patterns, downloads.

pub mod exclude;
pub mod fs;
pub mod http;

use crate::bundler::error::{Error, Result};

/// Runs blocking filesystem work on tokio's blocking pool and waits for it.
pub async fn blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| Error::GenericError(format!("blocking task panicked: {e}")))?
}
