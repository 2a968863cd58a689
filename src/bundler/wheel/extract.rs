//! Unpacking wheels into the shared package directory.
//!
//! A wheel is unpacked into a private staging directory first. Payload that
//! the wheel parks under `<name>.data/` (pure and platform library trees, and
//! the `data/Lib/site-packages` layout some third-party builds use) is moved
//! up to the staging root, and what remains is merged into the target with
//! [`merge_dir_into`] semantics.

use crate::bundler::{
    error::{Error, ErrorExt, Result},
    utils::{
        exclude::ExcludeMatcher,
        fs::{copy_file, ensure_dir, merge_dir_into, sorted_entries},
    },
};
use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};

/// Suffix marking a wheel's data directory.
pub const DATA_SUFFIX: &str = ".data";

/// Prefix prepended to archive member names before exclude matching.
pub const EXCLUDE_PREFIX: &str = "pkgs";

/// Extracts the importable contents of `wheel` into `target_dir`.
///
/// Members matching `exclude` (tested as `pkgs/<member>`) are skipped. The
/// staging directory is removed on every exit path.
///
/// # Errors
///
/// - [`Error::ExtractionEmpty`] if nothing is left to copy after exclusions
/// - [`Error::MergeConflict`] if a file and a directory collide in `target_dir`
pub fn extract_wheel(
    wheel: &Path,
    target_dir: &Path,
    exclude: Option<&ExcludeMatcher>,
) -> Result<()> {
    extract_wheel_in(wheel, target_dir, exclude, &std::env::temp_dir())
}

/// [`extract_wheel`] with the staging directory created under `staging_parent`.
fn extract_wheel_in(
    wheel: &Path,
    target_dir: &Path,
    exclude: Option<&ExcludeMatcher>,
    staging_parent: &Path,
) -> Result<()> {
    let staging = tempfile::Builder::new()
        .prefix("pywinpack-wheel-")
        .tempdir_in(staging_parent)
        .fs_context("creating staging directory", staging_parent)?;

    unpack_archive(wheel, staging.path(), exclude)?;
    lift_data_payload(staging.path())?;

    ensure_dir(target_dir)?;
    let copied = copy_to_target(staging.path(), target_dir)?;
    if copied == 0 {
        return Err(Error::ExtractionEmpty {
            archive: wheel.to_path_buf(),
        });
    }

    log::debug!(
        "Extracted {} top-level entries from {}",
        copied,
        wheel.display()
    );
    Ok(())
}

fn unpack_archive(wheel: &Path, staging: &Path, exclude: Option<&ExcludeMatcher>) -> Result<()> {
    let file = File::open(wheel).fs_context("opening wheel", wheel)?;
    let mut archive = zip::ZipArchive::new(io::BufReader::new(file))?;

    for i in 0..archive.len() {
        let mut member = archive.by_index(i)?;
        let Some(rel_path) = member.enclosed_name() else {
            log::warn!(
                "Skipping unsafe path {:?} in {}",
                member.name(),
                wheel.display()
            );
            continue;
        };

        if let Some(matcher) = exclude {
            if matcher.is_excluded(Path::new(EXCLUDE_PREFIX).join(&rel_path)) {
                log::debug!("Excluding {}", rel_path.display());
                continue;
            }
        }

        let out_path = staging.join(&rel_path);
        if member.is_dir() {
            std::fs::create_dir_all(&out_path).fs_context("creating directory", &out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).fs_context("creating directory", parent)?;
        }
        let mut out = File::create(&out_path).fs_context("creating file", &out_path)?;
        io::copy(&mut member, &mut out).fs_context("writing file", &out_path)?;
    }

    Ok(())
}

fn is_data_dir(path: &Path) -> bool {
    path.is_dir()
        && path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().ends_with(DATA_SUFFIX))
}

/// Moves library payload out of `*.data` directories into `staging`.
fn lift_data_payload(staging: &Path) -> Result<()> {
    for entry in sorted_entries(staging)? {
        let data_dir = entry.path();
        if !is_data_dir(&data_dir) {
            continue;
        }

        for lib in ["purelib", "platlib"] {
            let lib_dir = data_dir.join(lib);
            if lib_dir.is_dir() {
                merge_dir_into(&lib_dir, staging)?;
            }
        }

        for site_packages in misplaced_site_packages(&data_dir.join("data"))? {
            merge_dir_into(&site_packages, staging)?;
        }
    }
    Ok(())
}

/// `data/Lib/site-packages` directories, matched case-insensitively.
fn misplaced_site_packages(data: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    if !data.is_dir() {
        return Ok(found);
    }

    for lib in sorted_entries(data)? {
        if !lib.file_name().eq_ignore_ascii_case("lib") || !lib.path().is_dir() {
            continue;
        }
        for sp in sorted_entries(&lib.path())? {
            if sp.file_name().eq_ignore_ascii_case("site-packages") && sp.path().is_dir() {
                found.push(sp.path());
            }
        }
    }
    Ok(found)
}

/// Copies every non-data top-level staging entry into `target`.
///
/// Returns how many entries were copied.
fn copy_to_target(staging: &Path, target: &Path) -> Result<usize> {
    let mut copied = 0;

    for entry in sorted_entries(staging)? {
        let src = entry.path();
        if src
            .file_name()
            .is_some_and(|n| n.to_string_lossy().ends_with(DATA_SUFFIX))
        {
            continue;
        }

        let dst = target.join(entry.file_name());
        if src.is_dir() {
            if dst.exists() && !dst.is_dir() {
                return Err(Error::MergeConflict {
                    source_path: src,
                    destination: dst,
                });
            }
            ensure_dir(&dst)?;
            merge_dir_into(&src, &dst)?;
        } else {
            if dst.is_dir() {
                return Err(Error::MergeConflict {
                    source_path: src,
                    destination: dst,
                });
            }
            copy_file(&src, &dst)?;
        }
        copied += 1;
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn make_wheel(dir: &Path, name: &str, members: &[(&str, &str)]) -> PathBuf {
        let path = dir.join(name);
        let mut zw = zip::ZipWriter::new(File::create(&path).unwrap());
        for (member, content) in members {
            zw.start_file(*member, SimpleFileOptions::default()).unwrap();
            zw.write_all(content.as_bytes()).unwrap();
        }
        zw.finish().unwrap();
        path
    }

    #[test]
    fn purelib_payload_lands_in_the_package() {
        let work = tempfile::tempdir().unwrap();
        let target = work.path().join("pkgs");
        let wheel = make_wheel(
            work.path(),
            "mypkg-1.0-py3-none-any.whl",
            &[
                ("mypkg/__init__.py", "init"),
                ("mypkg.data/purelib/mypkg/extra.py", "extra"),
                ("mypkg-1.0.dist-info/METADATA", "Name: mypkg"),
            ],
        );

        extract_wheel(&wheel, &target, None).unwrap();

        assert!(target.join("mypkg/__init__.py").is_file());
        assert_eq!(
            std::fs::read_to_string(target.join("mypkg/extra.py")).unwrap(),
            "extra"
        );
        assert!(target.join("mypkg-1.0.dist-info/METADATA").is_file());
        assert!(!target.join("mypkg.data").exists());
    }

    #[test]
    fn platlib_and_site_packages_are_lifted() {
        let work = tempfile::tempdir().unwrap();
        let target = work.path().join("pkgs");
        let wheel = make_wheel(
            work.path(),
            "native-2.0-cp310-cp310-win_amd64.whl",
            &[
                ("native.data/platlib/_native.pyd", "binary"),
                ("native.data/data/LIB/Site-Packages/native_extra/x.py", "x"),
                ("native.data/scripts/tool.py", "script"),
            ],
        );

        extract_wheel(&wheel, &target, None).unwrap();

        assert!(target.join("_native.pyd").is_file());
        assert!(target.join("native_extra/x.py").is_file());
        assert!(!target.join("scripts").exists());
    }

    #[test]
    fn wheels_merge_into_a_shared_directory() {
        let work = tempfile::tempdir().unwrap();
        let target = work.path().join("pkgs");
        let first = make_wheel(
            work.path(),
            "ns_a-1.0-py3-none-any.whl",
            &[("ns/a.py", "a"), ("ns/shared.py", "first")],
        );
        let second = make_wheel(
            work.path(),
            "ns_b-1.0-py3-none-any.whl",
            &[("ns/b.py", "b"), ("ns/shared.py", "second")],
        );

        extract_wheel(&first, &target, None).unwrap();
        extract_wheel(&second, &target, None).unwrap();

        assert!(target.join("ns/a.py").is_file());
        assert!(target.join("ns/b.py").is_file());
        assert_eq!(
            std::fs::read_to_string(target.join("ns/shared.py")).unwrap(),
            "second"
        );
    }

    #[test]
    fn excluding_everything_is_an_empty_extraction() {
        let work = tempfile::tempdir().unwrap();
        let wheel = make_wheel(
            work.path(),
            "tests_only-1.0-py3-none-any.whl",
            &[("tests/test_a.py", "a"), ("tests/test_b.py", "b")],
        );
        let matcher = ExcludeMatcher::new(["pkgs/tests"]).unwrap();

        let err = extract_wheel(&wheel, &work.path().join("pkgs"), Some(&matcher)).unwrap_err();
        assert!(matches!(err, Error::ExtractionEmpty { archive } if archive == wheel));
    }

    #[test]
    fn excluded_members_are_skipped() {
        let work = tempfile::tempdir().unwrap();
        let target = work.path().join("pkgs");
        let wheel = make_wheel(
            work.path(),
            "lib-1.0-py3-none-any.whl",
            &[("lib/core.py", "core"), ("lib/tests/test_core.py", "t")],
        );
        let matcher = ExcludeMatcher::new(["pkgs/lib/tests"]).unwrap();

        extract_wheel(&wheel, &target, Some(&matcher)).unwrap();

        assert!(target.join("lib/core.py").is_file());
        assert!(!target.join("lib/tests").exists());
    }

    #[test]
    fn file_against_existing_directory_conflicts() {
        let work = tempfile::tempdir().unwrap();
        let target = work.path().join("pkgs");
        std::fs::create_dir_all(target.join("clash")).unwrap();
        let wheel = make_wheel(
            work.path(),
            "clash-1.0-py3-none-any.whl",
            &[("clash", "a file")],
        );

        let err = extract_wheel(&wheel, &target, None).unwrap_err();
        assert!(matches!(err, Error::MergeConflict { .. }));
        assert!(target.join("clash").is_dir());
    }

    #[test]
    fn staging_is_removed_when_extraction_fails() {
        let work = tempfile::tempdir().unwrap();
        let staging_parent = work.path().join("staging");
        std::fs::create_dir(&staging_parent).unwrap();
        let target = work.path().join("pkgs");
        std::fs::create_dir_all(target.join("clash")).unwrap();

        let empty = make_wheel(work.path(), "empty-1.0-py3-none-any.whl", &[("tests/t.py", "t")]);
        let matcher = ExcludeMatcher::new(["pkgs/tests"]).unwrap();
        let err = extract_wheel_in(&empty, &target, Some(&matcher), &staging_parent).unwrap_err();
        assert!(matches!(err, Error::ExtractionEmpty { .. }));
        assert_eq!(std::fs::read_dir(&staging_parent).unwrap().count(), 0);

        let clash = make_wheel(work.path(), "clash-1.0-py3-none-any.whl", &[("clash", "file")]);
        let err = extract_wheel_in(&clash, &target, None, &staging_parent).unwrap_err();
        assert!(matches!(err, Error::MergeConflict { .. }));
        assert_eq!(std::fs::read_dir(&staging_parent).unwrap().count(), 0);

        let ok = make_wheel(work.path(), "ok-1.0-py3-none-any.whl", &[("ok/__init__.py", "")]);
        extract_wheel_in(&ok, &target, None, &staging_parent).unwrap();
        assert_eq!(std::fs::read_dir(&staging_parent).unwrap().count(), 0);
    }

    #[test]
    fn corrupt_archive_is_an_error() {
        let work = tempfile::tempdir().unwrap();
        let bogus = work.path().join("bogus-1.0-py3-none-any.whl");
        std::fs::write(&bogus, b"not a zip").unwrap();
        assert!(matches!(
            extract_wheel(&bogus, &work.path().join("pkgs"), None),
            Err(Error::Zip(_))
        ));
    }
}
