//! Bundle configuration and file association definitions.

use super::{ResourceOverride, WindowsSettings};
use crate::bundler::{Error, Result};
use std::path::PathBuf;

/// Compression applied to intermediate archives and the installer itself.
///
/// Only [`Compression::Store`] turns compression off; every other mode makes
/// makensis use LZMA with a 64 MB dictionary.
///
/// # Configuration
///
/// ```toml
/// [package.metadata.bundle]
/// compression = "maximum"  # or "store" or "normal"
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// No compression - fastest, largest output.
    Store,

    /// Balanced compression (default).
    #[default]
    Normal,

    /// Smallest output, slowest build.
    Maximum,
}

impl Compression {
    /// 7-Zip `-mx` level for this mode.
    pub fn seven_zip_level(self) -> u8 {
        match self {
            Compression::Store => 0,
            Compression::Normal => 7,
            Compression::Maximum => 9,
        }
    }
}

/// A file type the installed application registers itself for.
///
/// # Configuration
///
/// ```toml
/// [[package.metadata.bundle.file_associations]]
/// ext = ".foo"
/// name = "Foo Document"
/// description = "Document edited with Foo"
/// icon = "assets/foo.ico"
/// ```
#[derive(Debug, Clone, Default, Eq, PartialEq, serde::Deserialize)]
pub struct FileAssociation {
    /// Extension, with or without the leading dot.
    pub ext: String,

    /// Registered file type name.
    pub name: String,

    /// Text shown in the Explorer `Type` column.
    ///
    /// Default: None (empty description)
    #[serde(default)]
    pub description: Option<String>,

    /// Icon for files of this type.
    ///
    /// Conventional file: `<ext>.ico` in the build resources directory.
    #[serde(default)]
    pub icon: ResourceOverride,
}

impl FileAssociation {
    /// Creates an association with only extension and name set.
    pub fn new(ext: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ext: ext.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the icon override.
    pub fn icon(mut self, icon: ResourceOverride) -> Self {
        self.icon = icon;
        self
    }

    /// Extension without its leading dot.
    pub fn normalized_ext(&self) -> &str {
        normalize_ext(&self.ext)
    }

    /// Rejects descriptors that cannot be written into the association macros.
    ///
    /// The normalized extension and the name must be non-empty, the
    /// extension must not still start with a dot, and no field may contain
    /// a double quote.
    pub fn validate(&self) -> Result<()> {
        let ext = self.normalized_ext();
        if ext.is_empty() {
            return Err(Error::Config(format!(
                "file association {:?} has an empty extension",
                self.ext
            )));
        }
        if ext.starts_with('.') {
            return Err(Error::Config(format!(
                "file association extension {:?} has more than one leading dot",
                self.ext
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Config(format!(
                "file association for .{ext} has an empty name"
            )));
        }

        let fields = [
            ("extension", self.ext.as_str()),
            ("name", self.name.as_str()),
            ("description", self.description.as_deref().unwrap_or_default()),
        ];
        for (field, value) in fields {
            if value.contains('"') {
                return Err(Error::Config(format!(
                    "file association {field} {value:?} contains a double quote"
                )));
            }
        }
        Ok(())
    }
}

/// Strips a single leading dot from an extension.
///
/// Normalizing an already normalized extension returns it unchanged;
/// extensions that keep a leading dot are rejected by
/// [`FileAssociation::validate`].
pub fn normalize_ext(ext: &str) -> &str {
    ext.strip_prefix('.').unwrap_or(ext)
}

/// Bundle configuration shared by all installer targets.
///
/// # Configuration
///
/// Add to `Cargo.toml`:
///
/// ```toml
/// [package.metadata.bundle]
/// identifier = "com.example.app"
/// publisher = "Example Inc."
/// icon = "assets/icon.ico"
/// compression = "normal"
/// ```
///
/// # See Also
///
/// - [`WindowsSettings`] - Windows installer configuration
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct BundleSettings {
    /// Bundle identifier in reverse domain notation.
    ///
    /// Default: None (`com.kodegen.<name>`)
    pub identifier: Option<String>,

    /// Publisher/company name.
    ///
    /// Default: None
    pub publisher: Option<String>,

    /// Product name shown to users when it differs from the package name.
    ///
    /// Default: None (package name)
    pub product_name: Option<String>,

    /// Application icon (.ico).
    ///
    /// Default: None (`icon.ico` from the build resources directory)
    pub icon: Option<PathBuf>,

    /// Copyright notice string.
    ///
    /// Default: None
    pub copyright: Option<String>,

    /// Compression for archives and installer.
    ///
    /// Default: [`Compression::Normal`]
    pub compression: Compression,

    /// File associations registered on every platform.
    ///
    /// Default: Empty
    pub file_associations: Vec<FileAssociation>,

    /// Windows-specific settings.
    ///
    /// See [`WindowsSettings`] for details.
    pub windows: WindowsSettings,
}
