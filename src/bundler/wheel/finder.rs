//! Locating and fetching binary packages for pinned dependencies.
//!
//! [`PackageSource`] is the seam between the assembler and the network: the
//! PyPI-backed implementation lives here, and tests plug in a local one.

use super::lockfile::DependencySpec;
use crate::bundler::{
    error::{Error, Result},
    settings::{Arch, Settings},
    utils::http,
};
use regex::Regex;
use serde::Deserialize;
use std::{
    future::Future,
    path::PathBuf,
    sync::LazyLock,
};

/// Wheel file name grammar, per the binary distribution format.
static RE_WHEEL_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<name>.+?)-(?P<ver>.+?)(-(?P<build>\d[^-]*))?-(?P<pyver>[^-]+?)-(?P<abi>[^-]+?)-(?P<plat>[^-]+?)\.whl$")
        .expect("wheel name regex is valid")
});

/// Tags parsed from a wheel file name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WheelName {
    /// Distribution name.
    pub name: String,
    /// Version.
    pub version: String,
    /// Python tags, e.g. `py2`, `py3`, `cp310`.
    pub python_tags: Vec<String>,
    /// ABI tags, e.g. `none`, `abi3`, `cp310`.
    pub abi_tags: Vec<String>,
    /// Platform tags, e.g. `any`, `win_amd64`.
    pub platform_tags: Vec<String>,
}

impl WheelName {
    /// Parses `name-version(-build)?-pyver-abi-plat.whl`.
    ///
    /// Returns `None` for anything that is not a wheel file name.
    pub fn parse(file_name: &str) -> Option<Self> {
        let caps = RE_WHEEL_NAME.captures(file_name)?;
        let split = |key: &str| -> Vec<String> {
            caps[key]
                .split('.')
                .map(|s| s.to_ascii_lowercase())
                .collect()
        };
        Some(Self {
            name: caps["name"].to_string(),
            version: caps["ver"].to_string(),
            python_tags: split("pyver"),
            abi_tags: split("abi"),
            platform_tags: split("plat"),
        })
    }
}

/// The interpreter a bundle targets, for wheel compatibility checks.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TargetPython {
    major: u32,
    minor: u32,
    arch: Arch,
}

impl TargetPython {
    /// Creates a target for CPython `major.minor` on `arch`.
    pub fn new(major: u32, minor: u32, arch: Arch) -> Self {
        Self { major, minor, arch }
    }

    /// Target described by the bundle settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let (major, minor) = settings.py_version_tuple();
        Self::new(major, minor, settings.arch())
    }

    /// Supported `(python, abi, platform)` tags, most specific first.
    pub fn supported_tags(&self) -> Vec<(String, String, String)> {
        let (major, minor) = (self.major, self.minor);
        let cp = format!("cp{major}{minor}");
        let plat = self.arch.platform_tag().to_string();
        let mut tags = Vec::new();

        let mut push = |py: &str, abi: &str, plat: &str| {
            tags.push((py.to_string(), abi.to_string(), plat.to_string()));
        };

        push(&cp, &cp, &plat);
        for m in (2..=minor).rev() {
            push(&format!("cp{major}{m}"), "abi3", &plat);
        }
        push(&cp, "none", &plat);
        for m in (0..=minor).rev() {
            push(&format!("py{major}{m}"), "none", &plat);
        }
        push(&format!("py{major}"), "none", &plat);
        push(&cp, "none", "any");
        for m in (0..=minor).rev() {
            push(&format!("py{major}{m}"), "none", "any");
        }
        push(&format!("py{major}"), "none", "any");

        tags
    }

    /// Rank of a wheel for this target; lower is better, `None` if unusable.
    pub fn rank(&self, wheel: &WheelName) -> Option<usize> {
        self.supported_tags().iter().position(|(py, abi, plat)| {
            wheel.python_tags.contains(py)
                && wheel.abi_tags.contains(abi)
                && wheel.platform_tags.contains(plat)
        })
    }
}

/// Outcome of looking a dependency up.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WheelLookup {
    /// A compatible wheel.
    Wheel {
        /// Wheel file name.
        filename: String,
        /// Download location.
        url: String,
    },
    /// The release exists, but only as source distributions.
    SourceOnly,
    /// No such release, or nothing usable for the target.
    NotFound,
}

/// Where binary packages and other downloads come from.
pub trait PackageSource {
    /// Finds the best wheel of `dependency` for `target`.
    fn find_wheel(
        &self,
        dependency: &DependencySpec,
        target: &TargetPython,
    ) -> impl Future<Output = Result<WheelLookup>> + Send;

    /// Makes the file at `url` available locally and returns its path.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<PathBuf>> + Send;
}

#[derive(Deserialize)]
struct ReleaseInfo {
    #[serde(default)]
    urls: Vec<ReleaseFile>,
}

#[derive(Deserialize)]
struct ReleaseFile {
    filename: String,
    url: String,
    packagetype: String,
    #[serde(default)]
    yanked: bool,
}

/// Package index client using the PyPI JSON API, with an on-disk cache.
#[derive(Clone, Debug)]
pub struct PypiSource {
    client: reqwest::Client,
    index_url: String,
    cache_dir: PathBuf,
}

impl PypiSource {
    /// Creates a client for `index_url` caching into `cache_dir`.
    pub fn new(index_url: impl Into<String>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            client: reqwest::Client::new(),
            index_url: index_url.into().trim_end_matches('/').to_string(),
            cache_dir: cache_dir.into(),
        }
    }

    /// Creates a client using the settings' index and the user cache directory.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(settings.index_url(), http::cache_dir()?))
    }
}

/// Normalizes a distribution name the way package indexes do.
pub fn canonical_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_sep = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !last_sep {
                out.push('-');
            }
            last_sep = true;
        } else {
            out.push(c.to_ascii_lowercase());
            last_sep = false;
        }
    }
    out
}

fn pick_wheel(files: Vec<ReleaseFile>, target: &TargetPython) -> WheelLookup {
    let has_sdist = files.iter().any(|f| f.packagetype == "sdist");

    let best = files
        .into_iter()
        .filter(|f| f.packagetype == "bdist_wheel" && !f.yanked)
        .filter_map(|f| {
            let rank = target.rank(&WheelName::parse(&f.filename)?)?;
            Some((rank, f))
        })
        .min_by_key(|(rank, _)| *rank);

    match best {
        Some((_, f)) => WheelLookup::Wheel {
            filename: f.filename,
            url: f.url,
        },
        None if has_sdist => WheelLookup::SourceOnly,
        None => WheelLookup::NotFound,
    }
}

impl PackageSource for PypiSource {
    async fn find_wheel(
        &self,
        dependency: &DependencySpec,
        target: &TargetPython,
    ) -> Result<WheelLookup> {
        let url = format!(
            "{}/pypi/{}/{}/json",
            self.index_url,
            canonical_name(&dependency.name),
            dependency.version
        );
        log::debug!("Looking up {} at {}", dependency, url);

        let response = self.client.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(WheelLookup::NotFound);
        }
        if !response.status().is_success() {
            return Err(Error::ExternalToolFailure {
                tool: "package index".into(),
                reason: format!("GET {url} returned {}", response.status()),
            });
        }

        let release: ReleaseInfo = serde_json::from_slice(&response.bytes().await?)?;
        Ok(pick_wheel(release.urls, target))
    }

    async fn fetch(&self, url: &str) -> Result<PathBuf> {
        let dest = self.cache_dir.join(http::url_file_name(url)?);
        http::download_cached(&self.client, url, &dest).await?;
        Ok(dest)
    }
}
