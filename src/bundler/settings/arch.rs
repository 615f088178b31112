//! CPU architecture types and utilities.

use std::{fmt, str::FromStr};

/// CPU architecture of a Windows application build.
///
/// NSIS installers can carry one payload per architecture; the installer
/// script picks the matching one at install time through the `APP_64` and
/// `APP_32` defines.
///
/// # Examples
///
/// ```
/// use kodegen_bundler_nsis::bundler::Arch;
///
/// let arch: Arch = "x86_64".parse().unwrap();
/// assert_eq!(arch, Arch::X64);
/// assert_eq!(arch.to_string(), "x64");
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// x86 / i686 (32-bit)
    #[serde(alias = "ia32", alias = "i686")]
    X86,
    /// x86_64 / AMD64 (64-bit)
    #[serde(alias = "x86_64", alias = "amd64")]
    X64,
}

impl Arch {
    /// Name of the define that carries this architecture's archive path.
    pub fn app_define(self) -> &'static str {
        match self {
            Arch::X64 => "APP_64",
            Arch::X86 => "APP_32",
        }
    }

    /// Short architecture suffix used in intermediate file names.
    pub fn as_str(self) -> &'static str {
        match self {
            Arch::X64 => "x64",
            Arch::X86 => "x86",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = crate::bundler::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x64" | "x86_64" | "amd64" => Ok(Arch::X64),
            "x86" | "ia32" | "i686" | "i386" => Ok(Arch::X86),
            other => Err(crate::bundler::Error::ArchError(format!(
                "Unsupported architecture for NSIS: {other}"
            ))),
        }
    }
}
