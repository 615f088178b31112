//! Windows platform-specific settings.

use super::FileAssociation;
use std::path::{Path, PathBuf};

/// Windows installer configuration.
///
/// Configures the NSIS installer target and optional Authenticode code
/// signing of the produced binaries.
///
/// # Configuration
///
/// Add to `Cargo.toml`:
///
/// ```toml
/// [package.metadata.bundle.windows]
/// cert_path = "cert.pem"
/// key_path = "key.pem"
/// timestamp_url = "http://timestamp.digicert.com"
/// legal_trademarks = "Example is a trademark of Example Inc."
/// ```
///
/// # Code Signing
///
/// Signing uses `osslsigncode` when `cert_path` is set, or `sign_command`
/// when a custom tool is configured. Without either, binaries are left
/// unsigned.
///
/// # See Also
///
/// - [`NsisSettings`] - NSIS installer configuration
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct WindowsSettings {
    // === Signing Configuration ===
    /// Path to certificate file (.pem, .crt, .pfx).
    ///
    /// For PKCS#12 (.pfx), also set `password`.
    ///
    /// Default: None (unsigned)
    pub cert_path: Option<PathBuf>,

    /// Path to private key file (.pem, .key).
    ///
    /// Not needed for PKCS#12 (.pfx) files which contain both cert and key.
    ///
    /// Default: None
    pub key_path: Option<PathBuf>,

    /// Password for encrypted key or PKCS#12 file.
    ///
    /// Default: None
    pub password: Option<String>,

    /// Timestamp server URL for signature timestamping.
    ///
    /// Default: None (no timestamp)
    pub timestamp_url: Option<String>,

    /// Custom sign command for alternative signing tools.
    ///
    /// `%1` is replaced with the binary path.
    /// Example: "signtool sign /sha1 ABC123... %1"
    ///
    /// Default: None (uses osslsigncode)
    pub sign_command: Option<String>,

    // === Version Resource ===
    /// Value of the `LegalTrademarks` version resource field.
    ///
    /// Default: None (field omitted)
    pub legal_trademarks: Option<String>,

    /// Windows-only file associations, appended to the global list.
    ///
    /// Default: Empty
    pub file_associations: Vec<FileAssociation>,

    // === Installer Settings ===
    /// NSIS EXE installer settings.
    ///
    /// See [`NsisSettings`] for details.
    pub nsis: NsisSettings,
}

/// Where an optional installer asset comes from.
///
/// Distinguishes "not configured" (look for the conventional file in the
/// build resources directory) from "explicitly disabled".
///
/// In TOML, a string selects a path and `false` disables the asset:
///
/// ```toml
/// [package.metadata.bundle.windows.nsis]
/// installer_header = "assets/header.bmp"
/// include = false
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum ResourceOverride {
    /// Use the conventional file when it exists.
    #[default]
    Unspecified,
    /// Never use a custom file.
    Disabled,
    /// Use this file, relative to the project directory.
    Path(PathBuf),
}

impl ResourceOverride {
    /// Shorthand for [`ResourceOverride::Path`].
    pub fn path(path: impl AsRef<Path>) -> Self {
        ResourceOverride::Path(path.as_ref().to_path_buf())
    }
}

impl<'de> serde::Deserialize<'de> for ResourceOverride {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Enabled(bool),
            Path(PathBuf),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Enabled(false) => ResourceOverride::Disabled,
            Raw::Enabled(true) => ResourceOverride::Unspecified,
            Raw::Path(path) => ResourceOverride::Path(path),
        })
    }
}

/// NSIS installer (.exe) configuration.
///
/// Every field has a stated default so the installer builder never has to
/// guess at missing values.
///
/// # Configuration
///
/// Add to `Cargo.toml`:
///
/// ```toml
/// [package.metadata.bundle.windows.nsis]
/// one_click = false
/// per_machine = true
/// guid = "2d4a6b4e-0a1f-4d7e-9a55-0b1f5c3e8a21"
/// ```
///
/// # See Also
///
/// - [`WindowsSettings`] - Windows installer configuration
/// - [`ResourceOverride`] - Optional asset selection
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct NsisSettings {
    /// Install immediately without showing a wizard.
    ///
    /// Default: true
    pub one_click: bool,

    /// Install for all users of the machine.
    ///
    /// Default: false
    pub per_machine: bool,

    /// Let a non-one-click installer request elevation.
    ///
    /// Default: true
    pub allow_elevation: bool,

    /// Launch the application when a one-click install finishes.
    ///
    /// Default: true
    pub run_after_finish: bool,

    /// Fixed installer GUID.
    ///
    /// Default: None (derived from the application id)
    pub guid: Option<String>,

    /// Header bitmap for the wizard (non-one-click only).
    ///
    /// Conventional file: `installerHeader.bmp`
    pub installer_header: ResourceOverride,

    /// Header icon (one-click only).
    ///
    /// Conventional file: `installerHeaderIcon.ico`
    pub installer_header_icon: ResourceOverride,

    /// Full replacement for the built-in installer script.
    ///
    /// Conventional file: `installer.nsi`
    pub script: ResourceOverride,

    /// Script fragment included before the installer script.
    ///
    /// Conventional file: `installer.nsh`
    pub include: ResourceOverride,
}

impl Default for NsisSettings {
    fn default() -> Self {
        Self {
            one_click: true,
            per_machine: false,
            allow_elevation: true,
            run_after_finish: true,
            guid: None,
            installer_header: ResourceOverride::Unspecified,
            installer_header_icon: ResourceOverride::Unspecified,
            script: ResourceOverride::Unspecified,
            include: ResourceOverride::Unspecified,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let nsis = NsisSettings::default();
        assert!(nsis.one_click);
        assert!(!nsis.per_machine);
        assert!(nsis.allow_elevation);
        assert!(nsis.run_after_finish);
        assert_eq!(nsis.script, ResourceOverride::Unspecified);
    }

    #[test]
    fn resource_override_from_toml() {
        let nsis: NsisSettings = toml::from_str(
            r#"
            one_click = false
            installer_header = "assets/header.bmp"
            include = false
            "#,
        )
        .unwrap();
        assert!(!nsis.one_click);
        assert!(nsis.run_after_finish);
        assert_eq!(
            nsis.installer_header,
            ResourceOverride::path("assets/header.bmp")
        );
        assert_eq!(nsis.include, ResourceOverride::Disabled);
        assert_eq!(nsis.installer_header_icon, ResourceOverride::Unspecified);
    }
}
