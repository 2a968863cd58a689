//! NSIS utility functions.
//!
//! Version formatting, NSIS path joining, and BOM-prefixed script output.

use crate::bundler::error::{ErrorExt, Result};
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Format version string for NSIS VIProductVersion.
///
/// NSIS requires exactly 4 numeric parts (major.minor.patch.build):
/// - "1" -> "1.0.0.0"
/// - "1.2.3" -> "1.2.3.0"
/// - "1.2.3.4.5" -> "1.2.3.4" (truncates to first 4)
///
/// Non-numeric suffixes such as `1.0rc1` keep only their leading digits.
pub fn format_version_for_nsis(version: &str) -> String {
    let mut parts: Vec<String> = version
        .split('.')
        .take(4)
        .map(|part| {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            if digits.is_empty() { "0".to_string() } else { digits }
        })
        .collect();
    parts.resize(4, "0".to_string());
    parts.join(".")
}

/// Joins an NSIS logical directory and a name with a backslash.
pub fn nsis_join(destination: &str, name: &str) -> String {
    format!("{}\\{}", destination.trim_end_matches('\\'), name)
}

/// Write file with UTF-8 BOM (required by NSIS).
///
/// NSIS requires installer scripts to be encoded with UTF-8 BOM (byte order mark).
pub async fn write_utf8_bom(path: &Path, content: &str) -> Result<()> {
    let mut file = tokio::fs::File::create(path)
        .await
        .fs_context("creating NSI script file", path)?;

    // Write UTF-8 BOM: EF BB BF
    file.write_all(&[0xEF, 0xBB, 0xBF])
        .await
        .fs_context("writing UTF-8 BOM", path)?;
    file.write_all(content.as_bytes())
        .await
        .fs_context("writing NSI content", path)?;
    file.flush().await.fs_context("flushing NSI file", path)?;

    Ok(())
}
