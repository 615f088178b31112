//! NSIS toolset location.
//!
//! Downloading and caching makensis is handled outside this crate; here we
//! only describe where an installed toolset lives.

use crate::bundler::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the NSIS installation directory.
pub const NSIS_HOME_ENV: &str = "NSIS_HOME";

/// An installed NSIS toolset.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NsisToolset {
    /// The makensis executable.
    pub makensis: PathBuf,
    /// Installation directory, exported to makensis as `NSISDIR`.
    pub nsis_dir: PathBuf,
}

impl NsisToolset {
    /// Toolset unpacked into `dir` with per-host binary directories
    /// (`Bin` on Windows, `mac` on macOS, `linux` elsewhere).
    pub fn from_install_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let (bin_dir, exe) = if cfg!(windows) {
            ("Bin", "makensis.exe")
        } else if cfg!(target_os = "macos") {
            ("mac", "makensis")
        } else {
            ("linux", "makensis")
        };
        Self {
            makensis: dir.join(bin_dir).join(exe),
            nsis_dir: dir.to_path_buf(),
        }
    }

    /// Locates NSIS.
    ///
    /// Uses `NSIS_HOME` when set, otherwise the `makensis` found on `PATH`
    /// together with its data directory.
    pub fn locate() -> Result<Self> {
        if let Some(home) = std::env::var_os(NSIS_HOME_ENV) {
            let toolset = Self::from_install_dir(PathBuf::from(home));
            log::debug!("Using NSIS from {}: {}", NSIS_HOME_ENV, toolset.makensis.display());
            return Ok(toolset);
        }

        match which::which("makensis") {
            Ok(makensis) => {
                let nsis_dir = system_nsis_dir(&makensis)?;
                Ok(Self { makensis, nsis_dir })
            }
            Err(_) => Err(Error::GenericError(
                "makensis not found. Please install NSIS (e.g., apt-get install nsis) or set NSIS_HOME"
                    .into(),
            )),
        }
    }
}

/// Data directory of a system-installed makensis.
///
/// Package managers put it at `<prefix>/share/nsis`; a portable install keeps
/// everything next to the binary.
fn system_nsis_dir(makensis: &Path) -> Result<PathBuf> {
    let bin_dir = makensis
        .parent()
        .ok_or_else(|| Error::GenericError("makensis path has no parent directory".into()))?;

    if let Some(prefix) = bin_dir.parent() {
        let share = prefix.join("share").join("nsis");
        if share.is_dir() {
            return Ok(share);
        }
    }
    Ok(bin_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_dir_layout() {
        let toolset = NsisToolset::from_install_dir("/cache/nsis-3.0.0");
        assert_eq!(toolset.nsis_dir, PathBuf::from("/cache/nsis-3.0.0"));
        assert!(toolset.makensis.starts_with("/cache/nsis-3.0.0"));
        assert!(
            toolset
                .makensis
                .file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with("makensis"))
        );
    }

    #[test]
    fn portable_install_uses_binary_dir() {
        let dir = tempfile::tempdir().unwrap();
        let makensis = dir.path().join("bin").join("makensis");
        assert_eq!(system_nsis_dir(&makensis).unwrap(), dir.path().join("bin"));

        std::fs::create_dir_all(dir.path().join("share").join("nsis")).unwrap();
        assert_eq!(
            system_nsis_dir(&makensis).unwrap(),
            dir.path().join("share").join("nsis")
        );
    }
}
