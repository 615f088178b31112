//! NSIS utility functions.
//!
//! Helper functions for version formatting, file naming, quoting and
//! host-specific path handling.

use crate::bundler::{
    error::{Error, Result},
    settings::{AppInfo, Arch},
};
use std::path::Path;

/// Wraps a value in double quotes for makensis.
pub fn quote(value: &str) -> String {
    format!("\"{value}\"")
}

/// Format version for NSIS VIProductVersion.
///
/// makensis only accepts exactly 4 numeric parts (major.minor.patch.build),
/// so pre-release and build metadata are dropped and the build number is
/// appended:
/// - "1.2.3" with no build number -> "1.2.3.0"
/// - "1.2.3-beta.1" with build number 7 -> "1.2.3.7"
///
/// # Errors
///
/// Fails when the version is not semver or the build number is not numeric.
pub fn product_version(app: &AppInfo) -> Result<String> {
    let version = app.semver()?;
    let build = app.build_number();
    if build.is_empty() || !build.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::Config(format!(
            "build number must be numeric, got `{build}`"
        )));
    }
    Ok(format!(
        "{}.{}.{}.{}",
        version.major, version.minor, version.patch, build
    ))
}

/// Installer file name: `<productFilename> Setup <version>.exe`.
pub fn installer_file_name(app: &AppInfo) -> String {
    format!("{} Setup {}.exe", app.product_filename(), app.version)
}

/// Display name of the registered installer artifact: `<name>-Setup-<version>.exe`.
pub fn artifact_display_name(app: &AppInfo) -> String {
    format!("{}-Setup-{}.exe", app.name, app.version)
}

/// Intermediate per-architecture archive name.
pub fn archive_file_name(app: &AppInfo, arch: Arch) -> String {
    format!("{}-{}-{}.nsis.7z", app.name, app.version, arch)
}

/// Path of a host file as seen from inside Wine (`Z:` maps to `/`).
pub fn wine_path(path: &Path) -> String {
    let native = path.to_string_lossy().replace('/', "\\");
    if native.starts_with('\\') {
        format!("Z:{native}")
    } else {
        format!("Z:\\{native}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(version: &str, build: Option<&str>) -> AppInfo {
        AppInfo {
            name: "demo".into(),
            product_name: "Demo App".into(),
            version: version.into(),
            build_number: build.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn product_version_always_has_four_parts() {
        for (version, build, expected) in [
            ("1.2.3", None, "1.2.3.0"),
            ("1.2.3", Some("99"), "1.2.3.99"),
            ("0.0.1-alpha.2", None, "0.0.1.0"),
            ("10.20.30-rc.1+build.5", Some("4"), "10.20.30.4"),
        ] {
            let formatted = product_version(&app(version, build)).unwrap();
            assert_eq!(formatted, expected);
            let parts: Vec<_> = formatted.split('.').collect();
            assert_eq!(parts.len(), 4);
            assert!(parts.iter().all(|p| p.parse::<u64>().is_ok()));
        }
    }

    #[test]
    fn non_numeric_build_number_is_rejected() {
        let err = product_version(&app("1.0.0", Some("abc"))).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn malformed_version_is_rejected() {
        assert!(product_version(&app("1.0", None)).is_err());
    }

    #[test]
    fn names() {
        let app = app("2.0.0", None);
        assert_eq!(installer_file_name(&app), "Demo App Setup 2.0.0.exe");
        assert_eq!(artifact_display_name(&app), "demo-Setup-2.0.0.exe");
        assert_eq!(archive_file_name(&app, Arch::X64), "demo-2.0.0-x64.nsis.7z");
    }

    #[test]
    fn wine_paths_use_z_drive() {
        assert_eq!(
            wine_path(Path::new("/tmp/build/uninstaller.exe")),
            "Z:\\tmp\\build\\uninstaller.exe"
        );
    }
}
