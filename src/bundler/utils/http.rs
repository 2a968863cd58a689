//! HTTP utilities for fetching runtimes, wheels and launcher stubs.
//!
//! Downloads land in a per-user cache and are reused on later runs.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::path::{Path, PathBuf};

/// Returns the cache directory used for downloaded files, creating it if needed.
pub fn cache_dir() -> Result<PathBuf> {
    let dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("pywinpack");
    std::fs::create_dir_all(&dir).fs_context("creating cache directory", &dir)?;
    Ok(dir)
}

/// Downloads a file from a URL.
///
/// Returns the file contents as a byte vector. Non-success statuses are
/// reported as [`Error::ExternalToolFailure`].
pub async fn download(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    log::info!("Downloading {}", url);

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::ExternalToolFailure {
            tool: "download".into(),
            reason: format!("GET {url} returned {status}"),
        });
    }

    let bytes = response.bytes().await?;
    Ok(bytes.to_vec())
}

/// Downloads `url` into `dest` unless `dest` already exists.
///
/// The body is written to a sibling temporary file first and renamed into
/// place, so an interrupted download never leaves a truncated cache entry.
pub async fn download_cached(client: &reqwest::Client, url: &str, dest: &Path) -> Result<()> {
    if dest.is_file() {
        log::debug!("Using cached {}", dest.display());
        return Ok(());
    }

    let bytes = download(client, url).await?;
    let partial = dest.with_extension("part");
    tokio::fs::write(&partial, &bytes)
        .await
        .fs_context("writing download", &partial)?;
    tokio::fs::rename(&partial, dest)
        .await
        .fs_context("moving download into cache", dest)?;
    Ok(())
}

/// Last path segment of a URL, used as the cache file name.
pub fn url_file_name(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url)
        .map_err(|e| Error::GenericError(format!("invalid URL {url}: {e}")))?;
    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::GenericError(format!("URL {url} has no file name")))
}
