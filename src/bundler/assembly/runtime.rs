//! Interpreter runtime and the files that sit next to it.

use super::{MSVCRT_DIR, PYTHON_DIR, SYSTEM_PATH_HELPER};
use crate::bundler::{
    error::{ErrorExt, Result},
    manifest::{INSTALL_ROOT, InstallManifest},
    settings::{Arch, Settings},
    utils::{
        blocking,
        fs::{copy_file, ensure_dir, sorted_entries},
    },
    wheel::PackageSource,
};
use regex::Regex;
use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    path::Path,
    sync::LazyLock,
};

/// Lines appended to every `._pth` file of the embeddable runtime.
const PTH_SUFFIX: &[u8] = b"\r\n..\\pkgs\r\nimport site\r\n";

static RE_PRERELEASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(a|b|rc)\d+$").expect("prerelease regex is valid")
});

/// Installer-side helper that adds or removes a directory on the user's PATH.
pub(super) const SYSTEM_PATH_SCRIPT: &str = r#"import ctypes
import sys
import winreg


def _key():
    return winreg.OpenKey(winreg.HKEY_CURRENT_USER, 'Environment', 0,
                          winreg.KEY_QUERY_VALUE | winreg.KEY_SET_VALUE)


def _notify():
    HWND_BROADCAST = 0xFFFF
    WM_SETTINGCHANGE = 0x1A
    SMTO_ABORTIFHUNG = 0x0002
    result = ctypes.c_long()
    ctypes.windll.user32.SendMessageTimeoutW(
        HWND_BROADCAST, WM_SETTINGCHANGE, 0, 'Environment',
        SMTO_ABORTIFHUNG, 5000, ctypes.byref(result))


def _get(key):
    try:
        value, kind = winreg.QueryValueEx(key, 'PATH')
    except FileNotFoundError:
        return [], winreg.REG_EXPAND_SZ
    return [p for p in value.split(';') if p], kind


def add(path):
    with _key() as key:
        parts, kind = _get(key)
        if path.lower() in (p.lower() for p in parts):
            return
        parts.append(path)
        winreg.SetValueEx(key, 'PATH', 0, kind, ';'.join(parts))
    _notify()


def remove(path):
    with _key() as key:
        parts, kind = _get(key)
        kept = [p for p in parts if p.lower() != path.lower()]
        if kept == parts:
            return
        winreg.SetValueEx(key, 'PATH', 0, kind, ';'.join(kept))
    _notify()


if __name__ == '__main__':
    action, target = sys.argv[1], sys.argv[2]
    {'add': add, 'remove': remove}[action](target)
"#;

/// Download location of the embeddable runtime for `version` on `arch`.
///
/// Pre-release versions live under the directory of their final release.
pub fn python_download_url(version: &str, arch: Arch) -> String {
    let directory = RE_PRERELEASE.replace(version, "");
    format!(
        "https://www.python.org/ftp/python/{directory}/python-{version}-embed-{}.zip",
        arch.embed_suffix()
    )
}

/// Copies the bundle icon into the build directory.
pub fn prepare_icon(settings: &Settings) -> Result<()> {
    let (Some(icon), Some(name)) = (settings.icon(), settings.icon_name()) else {
        log::debug!("No icon configured");
        return Ok(());
    };
    log::info!("Copying icon {}", icon.display());
    copy_file(icon, &settings.build_dir().join(name))
}

/// Fetches and unpacks the embeddable interpreter into `<build>/Python`.
///
/// The runtime directory and the PATH helper are recorded in the manifest;
/// the helper is written into `support_dir` and queued as an extra file.
pub async fn prepare_python<S: PackageSource>(
    settings: &Settings,
    source: &S,
    manifest: &mut InstallManifest,
    support_dir: &Path,
) -> Result<()> {
    let url = python_download_url(settings.py_version(), settings.arch());
    log::info!("Getting embeddable Python {}", settings.py_version());
    log::debug!("Runtime URL: {url}");
    let archive = source.fetch(&url).await?;

    let python_dir = settings.build_dir().join(PYTHON_DIR);
    let target = python_dir.clone();
    let patched = blocking(move || unpack_runtime(&archive, &target)).await?;
    log::debug!("Patched {patched} path configuration files");

    manifest.add_directory(PYTHON_DIR, INSTALL_ROOT);

    let helper = support_dir.join(SYSTEM_PATH_HELPER);
    tokio::fs::write(&helper, SYSTEM_PATH_SCRIPT)
        .await
        .fs_context("writing PATH helper", &helper)?;
    manifest.add_extra_file(helper, INSTALL_ROOT);
    Ok(())
}

/// Unpacks the runtime zip and appends the package search lines to its
/// top-level `._pth` files. Returns how many were patched.
pub fn unpack_runtime(archive: &Path, python_dir: &Path) -> Result<usize> {
    ensure_dir(python_dir)?;
    let file = File::open(archive).fs_context("opening runtime archive", archive)?;
    let mut zip = zip::ZipArchive::new(io::BufReader::new(file))?;
    zip.extract(python_dir)?;

    let mut patched = 0;
    for entry in sorted_entries(python_dir)? {
        let path = entry.path();
        let is_pth = path.extension().is_some_and(|e| e == "_pth");
        if !is_pth || !path.is_file() {
            continue;
        }
        let mut pth = OpenOptions::new()
            .append(true)
            .open(&path)
            .fs_context("opening path configuration", &path)?;
        pth.write_all(PTH_SUFFIX)
            .fs_context("patching path configuration", &path)?;
        patched += 1;
    }
    Ok(patched)
}

/// Copies the redistributable runtime DLLs for the target architecture.
///
/// The DLLs are opt-in: they are bundled only when `msvcrt_dir` is set.
/// Without it the bundle relies on the runtime installed on the target
/// machine and the installer omits its runtime section.
pub fn prepare_msvcrt(settings: &Settings, manifest: &mut InstallManifest) -> Result<()> {
    if !settings.include_msvcrt() {
        return Ok(());
    }
    let Some(root) = settings.msvcrt_dir() else {
        log::info!("No msvcrt_dir configured; the bundle uses the system C runtime");
        return Ok(());
    };
    let src = root.join(settings.arch().msvcrt_dir());
    if !src.is_dir() {
        log::warn!("{} does not exist; skipping msvcrt files", src.display());
        return Ok(());
    }

    log::info!("Copying msvcrt files from {}", src.display());
    let dst = settings.build_dir().join(MSVCRT_DIR);
    ensure_dir(&dst)?;
    for entry in sorted_entries(&src)? {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        copy_file(&path, &dst.join(&name))?;
        manifest.add_runtime_support_file(name);
    }
    Ok(())
}

/// Copies the license file and records it for the install root.
pub fn prepare_license(settings: &Settings, manifest: &mut InstallManifest) -> Result<()> {
    let (Some(license), Some(name)) = (settings.license(), settings.license_name()) else {
        return Ok(());
    };
    log::info!("Copying license file {}", license.display());
    copy_file(license, &settings.build_dir().join(&name))?;
    manifest.add_file(name, INSTALL_ROOT);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zip::write::SimpleFileOptions;

    #[test]
    fn runtime_url_drops_prerelease_from_directory() {
        assert_eq!(
            python_download_url("3.10.11", Arch::X64),
            "https://www.python.org/ftp/python/3.10.11/python-3.10.11-embed-amd64.zip"
        );
        assert_eq!(
            python_download_url("3.12.0rc2", Arch::X86),
            "https://www.python.org/ftp/python/3.12.0/python-3.12.0rc2-embed-win32.zip"
        );
    }

    #[test]
    fn pth_files_get_package_lines() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("python.zip");
        let mut zw = zip::ZipWriter::new(File::create(&archive).unwrap());
        zw.start_file("python.exe", SimpleFileOptions::default()).unwrap();
        zw.write_all(b"MZ").unwrap();
        zw.start_file("python310._pth", SimpleFileOptions::default()).unwrap();
        zw.write_all(b"python310.zip\r\n.").unwrap();
        zw.finish().unwrap();

        let python_dir = dir.path().join("build/Python");
        assert_eq!(unpack_runtime(&archive, &python_dir).unwrap(), 1);

        let pth = std::fs::read(python_dir.join("python310._pth")).unwrap();
        assert_eq!(pth, b"python310.zip\r\n.\r\n..\\pkgs\r\nimport site\r\n");
        assert_eq!(std::fs::read(python_dir.join("python.exe")).unwrap(), b"MZ");
    }
}
