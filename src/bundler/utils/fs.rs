//! File system utilities for bundling.
//!
//! Provides the tree merge used to combine package payloads, plain recursive
//! copies, collision-free naming inside the build directory, and idempotent
//! directory creation.

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    utils::exclude::ExcludeMatcher,
};
use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::fs;

/// Normalizes a path to use `/` as the only separator.
///
/// `.` components are dropped; the result is what exclude patterns match against.
pub fn normalize_path(path: impl AsRef<Path>) -> String {
    let raw = path.as_ref().to_string_lossy().replace('\\', "/");
    let parts: Vec<&str> = raw.split('/').filter(|p| !p.is_empty() && *p != ".").collect();
    let joined = parts.join("/");
    if raw.starts_with('/') {
        format!("/{joined}")
    } else {
        joined
    }
}

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_dir_all(path).await?;
    }

    // create_dir_all is already idempotent - succeeds even if dir exists
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()), // Idempotent
        Err(e) => Err(Error::Fs {
            context: "removing directory",
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Makes sure `path` is a directory, creating it if needed.
///
/// Fails if something other than a directory already occupies the path.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        return Err(Error::GenericError(format!(
            "{} exists and is not a directory",
            path.display()
        )));
    }
    std::fs::create_dir_all(path).fs_context("creating directory", path)
}

/// Copies a regular file from one path to another, creating any parent
/// directories of the destination path as necessary.
///
/// Fails if the source path is a directory or doesn't exist.
pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Err(Error::GenericError(format!("{from:?} does not exist")));
    }
    if !from.is_file() {
        return Err(Error::GenericError(format!("{from:?} is not a file")));
    }
    if let Some(dest_dir) = to.parent() {
        std::fs::create_dir_all(dest_dir).fs_context("creating directory", dest_dir)?;
    }
    std::fs::copy(from, to).fs_context("copying file", from)?;
    Ok(())
}

/// Recursively copies a directory from one path to another.
///
/// Entries matched by `exclude` are skipped, along with everything below an
/// excluded directory. Patterns see the path relative to the parent of
/// `from`, so a pattern can name the copied directory itself.
pub fn copy_dir(from: &Path, to: &Path, exclude: Option<&ExcludeMatcher>) -> Result<()> {
    if !from.is_dir() {
        return Err(Error::GenericError(format!("{from:?} is not a Directory")));
    }
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent).fs_context("creating directory", parent)?;
    }

    let base = from.parent().unwrap_or(from);
    let mut walker = walkdir::WalkDir::new(from).sort_by_file_name().into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry?;
        let rel_path = entry.path().strip_prefix(from)?;

        if let Some(matcher) = exclude {
            if !rel_path.as_os_str().is_empty()
                && matcher.is_excluded(entry.path().strip_prefix(base)?)
            {
                if entry.file_type().is_dir() {
                    walker.skip_current_dir();
                }
                continue;
            }
        }

        let dest_path = to.join(rel_path);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest_path).fs_context("creating directory", &dest_path)?;
        } else {
            std::fs::copy(entry.path(), &dest_path).fs_context("copying file", entry.path())?;
        }
    }

    Ok(())
}

/// Merges the contents of `src` into the existing directory `dst`.
///
/// Directories present on both sides are merged recursively, directories only
/// present in `src` are copied whole, and files from `src` overwrite
/// same-named files in `dst`. A file meeting a directory of the same name,
/// in either direction, is a [`Error::MergeConflict`].
///
/// Conflicts are detected over the whole tree before anything is written, so
/// a failed merge leaves `dst` untouched.
pub fn merge_dir_into(src: &Path, dst: &Path) -> Result<()> {
    check_merge(src, dst)?;
    apply_merge(src, dst)
}

fn check_merge(src: &Path, dst: &Path) -> Result<()> {
    for entry in sorted_entries(src)? {
        let dst_p = dst.join(entry.file_name());
        let src_is_dir = entry.path().is_dir();
        if src_is_dir && dst_p.is_dir() {
            check_merge(&entry.path(), &dst_p)?;
        } else if (src_is_dir && dst_p.is_file()) || (!src_is_dir && dst_p.is_dir()) {
            return Err(Error::MergeConflict {
                source_path: entry.path(),
                destination: dst_p,
            });
        }
    }
    Ok(())
}

fn apply_merge(src: &Path, dst: &Path) -> Result<()> {
    for entry in sorted_entries(src)? {
        let src_p = entry.path();
        let dst_p = dst.join(entry.file_name());
        if src_p.is_dir() {
            if dst_p.is_dir() {
                apply_merge(&src_p, &dst_p)?;
            } else {
                copy_dir(&src_p, &dst_p, None)?;
            }
        } else {
            std::fs::copy(&src_p, &dst_p).fs_context("copying file", &src_p)?;
        }
    }
    Ok(())
}

/// Lists a directory in file-name order.
pub fn sorted_entries(dir: &Path) -> Result<Vec<std::fs::DirEntry>> {
    let mut entries = std::fs::read_dir(dir)
        .fs_context("reading directory", dir)?
        .collect::<io::Result<Vec<_>>>()
        .fs_context("reading directory", dir)?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

/// Finds a free name for `file_name` inside `dir`.
///
/// The first candidate is the name itself, then `stem.1.ext`, `stem.2.ext`
/// and so on. Names listed in `reserved` count as taken even if absent.
pub fn unique_destination(dir: &Path, file_name: &str, reserved: &[&str]) -> PathBuf {
    let original = Path::new(file_name);
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    let suffix = original
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let taken = |name: &str| reserved.contains(&name) || dir.join(name).exists();

    let mut name = file_name.to_string();
    let mut n = 1u32;
    while taken(&name) {
        name = format!("{stem}.{n}{suffix}");
        n += 1;
    }
    dir.join(name)
}
