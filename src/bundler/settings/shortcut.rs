//! Start-menu shortcut definitions.

use std::path::PathBuf;

/// A Start-menu shortcut created by the installer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShortcutSpec {
    /// Shortcut label.
    pub name: String,
    /// What the shortcut launches, e.g. `$INSTDIR\bin\app.exe`.
    pub target: String,
    /// Command-line parameters passed to the target.
    pub parameters: Option<String>,
    /// Icon file; the bundle icon is used when absent.
    pub icon: Option<PathBuf>,
}
