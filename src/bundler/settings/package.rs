//! Application metadata.

use crate::bundler::error::{Error, Result};

/// Application metadata consumed by the installer target.
///
/// Usually derived from the `[package]` and `[package.metadata.bundle]`
/// sections of `Cargo.toml`.
///
/// # Examples
///
/// ```
/// use kodegen_bundler_nsis::bundler::AppInfo;
///
/// let info = AppInfo {
///     name: "myapp".into(),
///     product_name: "My App".into(),
///     version: "1.2.3".into(),
///     build_number: Some("42".into()),
///     ..Default::default()
/// };
/// assert_eq!(info.product_filename(), "My App");
/// assert_eq!(info.build_version(), "1.2.3.42");
/// ```
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct AppInfo {
    /// Application identifier in reverse domain notation.
    ///
    /// Default: `com.kodegen.<name>` when empty.
    pub id: String,

    /// Package name (no spaces), used for artifact display names.
    pub name: String,

    /// Product name displayed to users.
    pub product_name: String,

    /// File-system safe product name.
    ///
    /// Default: `product_name` with reserved characters removed.
    pub product_filename: Option<String>,

    /// Version string in semantic versioning format.
    pub version: String,

    /// Brief description of the application.
    pub description: String,

    /// Publisher/company name.
    pub company_name: String,

    /// Copyright notice.
    ///
    /// Default: `Copyright © <company_name>` when empty.
    pub copyright: String,

    /// CI build number; becomes the fourth version component.
    pub build_number: Option<String>,

    /// Explicit file version.
    ///
    /// Default: `<version>.<build_number>`, or `<version>` without a build number.
    pub build_version: Option<String>,
}

impl AppInfo {
    /// Application identifier, falling back to `com.kodegen.<name>`.
    pub fn id(&self) -> String {
        if self.id.is_empty() {
            format!("com.kodegen.{}", self.name)
        } else {
            self.id.clone()
        }
    }

    /// Product name safe to use in file names.
    pub fn product_filename(&self) -> String {
        match &self.product_filename {
            Some(name) => name.clone(),
            None => sanitize_file_name(&self.product_name),
        }
    }

    /// Copyright notice, falling back to `Copyright © <company>`.
    pub fn copyright(&self) -> String {
        if self.copyright.is_empty() {
            format!("Copyright © {}", self.company_name)
        } else {
            self.copyright.clone()
        }
    }

    /// Build number or `"0"` when absent.
    pub fn build_number(&self) -> &str {
        self.build_number.as_deref().unwrap_or("0")
    }

    /// Version written into the `FileVersion` resource field.
    pub fn build_version(&self) -> String {
        match (&self.build_version, &self.build_number) {
            (Some(explicit), _) => explicit.clone(),
            (None, Some(number)) => format!("{}.{}", self.version, number),
            (None, None) => self.version.clone(),
        }
    }

    /// Parses [`AppInfo::version`] as a semantic version.
    pub fn semver(&self) -> Result<semver::Version> {
        semver::Version::parse(&self.version).map_err(|source| Error::InvalidVersion {
            version: self.version.clone(),
            source,
        })
    }
}

/// Removes characters Windows does not allow in file names.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '/' | '\\' | '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>'))
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}
