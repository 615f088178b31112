//! External tool detection and availability checking.
//!
//! Runtime detection of the tools an installer build needs: makensis to
//! compile, 7-Zip to archive and Wine to self-extract the uninstaller on
//! non-Windows hosts.

use std::sync::LazyLock;

/// Check if makensis is available for NSIS installer creation.
///
/// Cached result to avoid repeated subprocess calls during bundling.
pub static HAS_MAKENSIS: LazyLock<bool> = LazyLock::new(|| match which::which("makensis") {
    Ok(path) => {
        log::debug!("Found makensis at: {}", path.display());

        match std::process::Command::new(&path).arg("-VERSION").output() {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout);
                log::info!("✓ makensis available: {}", version.trim());
                true
            }
            Ok(output) => {
                log::warn!(
                    "makensis found at {} but -VERSION check failed (exit code: {:?}). \
                         Stderr: {}",
                    path.display(),
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr)
                );
                false
            }
            Err(e) => {
                log::warn!(
                    "makensis found at {} but failed to execute: {}. \
                         Check file permissions.",
                    path.display(),
                    e
                );
                false
            }
        }
    }
    Err(e) => {
        log::debug!("makensis not found in PATH: {}", e);
        false
    }
});

/// Check if a 7-Zip command line tool (`7za` or `7z`) is on `PATH`.
pub static HAS_SEVEN_ZIP: LazyLock<bool> =
    LazyLock::new(|| which::which("7za").or_else(|_| which::which("7z")).is_ok());

/// Check if Wine is available for running Windows binaries.
pub static HAS_WINE: LazyLock<bool> = LazyLock::new(|| which::which("wine").is_ok());

/// Names of required tools that are missing on this host.
pub fn missing_tools() -> Vec<&'static str> {
    let mut missing = Vec::new();
    if !*HAS_MAKENSIS {
        missing.push("makensis");
    }
    if !*HAS_SEVEN_ZIP {
        missing.push("7za");
    }
    if !cfg!(windows) && !*HAS_WINE {
        missing.push("wine");
    }
    missing
}
