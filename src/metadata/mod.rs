//! Application metadata from a single Cargo.toml
//!
//! Reads `[package]` for identity and `[package.metadata.bundle]` for
//! installer configuration:
//!
//! ```toml
//! [package.metadata.bundle]
//! identifier = "com.example.app"
//! publisher = "Example Inc."
//! product_name = "Example App"
//! compression = "maximum"
//!
//! [[package.metadata.bundle.file_associations]]
//! ext = "exdoc"
//! name = "Example Document"
//!
//! [package.metadata.bundle.windows.nsis]
//! one_click = false
//! installer_header = false
//! ```

use crate::bundler::{AppInfo, BundleSettings};
use crate::error::{BundlerError, CliError, Result};
use std::path::Path;

/// Complete manifest data from Cargo.toml
#[derive(Debug, Clone)]
pub struct CargoManifest {
    /// Application identity ([package] section merged with bundle overrides)
    pub app_info: AppInfo,

    /// Bundle settings (from [package.metadata.bundle] section + asset discovery)
    pub bundle_settings: BundleSettings,
}

/// Load the manifest at `cargo_toml_path` (single read + parse).
pub fn load_manifest(cargo_toml_path: &Path) -> Result<CargoManifest> {
    let manifest = std::fs::read_to_string(cargo_toml_path).map_err(|e| {
        BundlerError::Cli(CliError::ExecutionFailed {
            command: "read_cargo_toml".to_string(),
            reason: format!("Failed to read {}: {}", cargo_toml_path.display(), e),
        })
    })?;

    let cargo_dir = cargo_toml_path.parent().ok_or_else(|| {
        BundlerError::Cli(CliError::InvalidArguments {
            reason: "Invalid Cargo.toml path".to_string(),
        })
    })?;

    let mut parsed = parse_manifest(&manifest)?;
    discover_bundle_assets(cargo_dir, &mut parsed.bundle_settings);
    Ok(parsed)
}

/// Parse manifest text without touching the file system.
pub fn parse_manifest(manifest: &str) -> Result<CargoManifest> {
    let toml_value: toml::Value = toml::from_str(manifest)?;

    let package = toml_value.get("package").ok_or_else(|| {
        BundlerError::Cli(CliError::InvalidArguments {
            reason: "No [package] section in Cargo.toml".to_string(),
        })
    })?;

    let required = |key: &str| -> Result<String> {
        package
            .get(key)
            .and_then(|v| v.as_str())
            .map(String::from)
            .ok_or_else(|| {
                BundlerError::Cli(CliError::InvalidArguments {
                    reason: format!("Missing '{key}' in [package]"),
                })
            })
    };

    let name = required("name")?;
    let version = required("version")?;
    let description = package
        .get("description")
        .and_then(|v| v.as_str())
        .unwrap_or("Rust application")
        .to_string();
    let first_author = package
        .get("authors")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|v| v.as_str())
        .map(author_name);

    let bundle_settings = match package.get("metadata").and_then(|m| m.get("bundle")) {
        Some(bundle) => bundle.clone().try_into::<BundleSettings>()?,
        None => BundleSettings::default(),
    };

    let app_info = AppInfo {
        id: bundle_settings.identifier.clone().unwrap_or_default(),
        product_name: bundle_settings
            .product_name
            .clone()
            .unwrap_or_else(|| name.clone()),
        company_name: bundle_settings
            .publisher
            .clone()
            .or(first_author)
            .unwrap_or_default(),
        copyright: bundle_settings.copyright.clone().unwrap_or_default(),
        name,
        version,
        description,
        ..Default::default()
    };

    Ok(CargoManifest {
        app_info,
        bundle_settings,
    })
}

/// `"Jane Doe <jane@example.com>"` -> `"Jane Doe"`.
fn author_name(author: &str) -> String {
    author.split('<').next().unwrap_or(author).trim().to_string()
}

/// Use `assets/img/icon.ico` as the application icon when none is configured.
///
/// The build resources directory is searched later by the installer builder;
/// this only covers the conventional crate asset location.
fn discover_bundle_assets(package_root: &Path, settings: &mut BundleSettings) {
    if settings.icon.is_some() {
        return;
    }

    let icon_path = package_root.join("assets").join("img").join("icon.ico");
    if icon_path.is_file() {
        log::info!("Found Windows icon: {}", icon_path.display());
        settings.icon = Some(icon_path);
    } else {
        log::debug!("Windows icon not found: {}", icon_path.display());
    }
}
