//! The install manifest: everything that ships, with where it lands.
//!
//! Destinations are NSIS-style logical paths rooted at [`INSTALL_ROOT`]. The
//! assembler appends to the manifest while it populates the build directory;
//! the artifact generators only ever see it through a shared reference.

use std::path::PathBuf;

/// Logical destination meaning "the installation directory".
pub const INSTALL_ROOT: &str = "$INSTDIR";

/// A file or directory in the build directory and its install destination.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct InstallEntry {
    /// Name directly under the build directory.
    pub name: String,
    /// Logical destination directory.
    pub destination: String,
}

/// An input queued for copying into the build directory.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ExtraFile {
    /// Absolute path of the file or directory to copy.
    pub source: PathBuf,
    /// Logical destination directory.
    pub destination: String,
}

/// Files of one destination directory, in manifest order.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct FileGroup {
    /// Logical destination directory.
    pub destination: String,
    /// Build-directory names placed there.
    pub files: Vec<String>,
}

/// Record of what the build directory contributes to the shipped artifacts.
#[derive(Clone, Debug, Default)]
pub struct InstallManifest {
    files: Vec<InstallEntry>,
    directories: Vec<InstallEntry>,
    runtime_support_files: Vec<String>,
    extra_files: Vec<ExtraFile>,
}

/// Normalizes a destination to backslash separators, defaulting to the install root.
pub fn normalize_destination(destination: Option<&str>) -> String {
    match destination.map(str::trim) {
        Some(d) if !d.is_empty() => d.replace('/', "\\"),
        _ => INSTALL_ROOT.to_string(),
    }
}

impl InstallManifest {
    /// Creates an empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a single file placed directly under the build directory.
    ///
    /// An empty name is logged and ignored.
    pub fn add_file(&mut self, name: impl Into<String>, destination: impl Into<String>) {
        let name = name.into();
        if name.is_empty() {
            log::warn!("Ignoring manifest file with an empty name");
            return;
        }
        self.files.push(InstallEntry {
            name,
            destination: destination.into(),
        });
    }

    /// Records a whole directory placed directly under the build directory.
    ///
    /// An empty name is logged and ignored.
    pub fn add_directory(&mut self, name: impl Into<String>, destination: impl Into<String>) {
        let name = name.into();
        if name.is_empty() {
            log::warn!("Ignoring manifest directory with an empty name");
            return;
        }
        self.directories.push(InstallEntry {
            name,
            destination: destination.into(),
        });
    }

    /// Records a redistributable runtime support file.
    pub fn add_runtime_support_file(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !name.is_empty() {
            self.runtime_support_files.push(name);
        }
    }

    /// Queues an input to be copied into the build directory later.
    pub fn add_extra_file(&mut self, source: impl Into<PathBuf>, destination: impl Into<String>) {
        self.extra_files.push(ExtraFile {
            source: source.into(),
            destination: destination.into(),
        });
    }

    /// Files in insertion order.
    pub fn files(&self) -> &[InstallEntry] {
        &self.files
    }

    /// Directories in insertion order.
    pub fn directories(&self) -> &[InstallEntry] {
        &self.directories
    }

    /// Runtime support file names.
    pub fn runtime_support_files(&self) -> &[String] {
        &self.runtime_support_files
    }

    /// Queued extra inputs.
    pub fn extra_files(&self) -> &[ExtraFile] {
        &self.extra_files
    }

    /// Whether a directory of this name has already been recorded.
    pub fn has_directory(&self, name: &str) -> bool {
        self.directories.iter().any(|d| d.name == name)
    }

    /// Groups files by destination.
    ///
    /// Files are stably sorted by destination first, so entries sharing a
    /// destination form one group even if they were added apart from each
    /// other; within a group the insertion order is kept.
    pub fn group_files_by_destination(&self) -> Vec<FileGroup> {
        let mut sorted: Vec<&InstallEntry> = self.files.iter().collect();
        sorted.sort_by(|a, b| a.destination.cmp(&b.destination));

        let mut groups: Vec<FileGroup> = Vec::new();
        for entry in sorted {
            match groups.last_mut() {
                Some(group) if group.destination == entry.destination => {
                    group.files.push(entry.name.clone());
                }
                _ => groups.push(FileGroup {
                    destination: entry.destination.clone(),
                    files: vec![entry.name.clone()],
                }),
            }
        }
        groups
    }
}
