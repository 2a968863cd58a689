//! Application metadata.

/// Application metadata shown by the installer and used in artifact names.
///
/// # Examples
///
/// ```no_run
/// use pywinpack::bundler::PackageSettings;
///
/// let package = PackageSettings {
///     app_name: "My App".into(),
///     version: "1.0.0".into(),
///     publisher: Some("Example Corp".into()),
/// };
/// assert_eq!(package.artifact_stem(), "My_App_1.0.0");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PackageSettings {
    /// Name displayed to users.
    ///
    /// Defaults to the project name.
    pub app_name: String,

    /// Application version.
    ///
    /// Default: "0.0.0"
    pub version: String,

    /// Publisher shown in Add/Remove Programs.
    ///
    /// Default: None
    pub publisher: Option<String>,
}

impl PackageSettings {
    /// `<name>_<version>` with spaces replaced, shared by both artifact names.
    pub fn artifact_stem(&self) -> String {
        format!("{}_{}", self.app_name, self.version).replace(' ', "_")
    }
}
