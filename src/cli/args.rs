//! Command line argument parsing and validation.

use crate::bundler::Arch;
use clap::Parser;
use std::path::PathBuf;

/// Windows NSIS installer builder
#[derive(Parser, Debug)]
#[command(
    name = "kodegen_bundler_nsis",
    version,
    about = "Builds a Windows NSIS installer from prepared application directories",
    long_about = "Builds a Windows NSIS installer from prepared application directories.

Each --app-dir is packed into a per-architecture 7z archive; makensis then
compiles the uninstaller and the installer, and both are signed when signing
is configured in [package.metadata.bundle.windows].

Usage:
  kodegen_bundler_nsis --app-dir x64=dist/win-unpacked
  kodegen_bundler_nsis --app-dir x64=dist/win-unpacked --app-dir ia32=dist/win-ia32-unpacked
  kodegen_bundler_nsis --app-dir x64=dist/win-unpacked --dry-run

Exit code 0 = installer guaranteed to exist in the output directory."
)]
pub struct Args {
    /// Project directory containing Cargo.toml
    #[arg(short = 'p', long, value_name = "DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Application directory for an architecture, as ARCH=DIR (repeatable)
    #[arg(short = 'a', long = "app-dir", value_name = "ARCH=DIR", value_parser = parse_app_dir, required = true)]
    pub app_dirs: Vec<(Arch, PathBuf)>,

    /// Output directory for archives and the installer (default: <project>/dist)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Build resources directory (default: <project>/build)
    #[arg(long, value_name = "DIR")]
    pub build_resources: Option<PathBuf>,

    /// Directory holding installer.nsi and FileAssociation.nsh
    #[arg(long, value_name = "DIR", env = "KODEGEN_NSIS_TEMPLATES")]
    pub templates_dir: Option<PathBuf>,

    /// Numeric build number appended to the product version
    #[arg(long, value_name = "N", env = "BUILD_NUMBER")]
    pub build_number: Option<String>,

    /// Print the makensis defines and commands as JSON instead of building
    #[arg(long)]
    pub dry_run: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if let Some(build_number) = &self.build_number {
            if build_number.is_empty() || !build_number.chars().all(|c| c.is_ascii_digit()) {
                return Err(format!("Build number must be numeric: `{build_number}`"));
            }
        }

        for (i, (arch, _)) in self.app_dirs.iter().enumerate() {
            if self.app_dirs[..i].iter().any(|(seen, _)| seen == arch) {
                return Err(format!("Architecture {arch} given more than once"));
            }
        }

        Ok(())
    }
}

/// Parses `x64=dist/win-unpacked`.
fn parse_app_dir(value: &str) -> Result<(Arch, PathBuf), String> {
    let (arch, dir) = value
        .split_once('=')
        .ok_or_else(|| format!("expected ARCH=DIR, got `{value}`"))?;
    let arch = arch.parse::<Arch>().map_err(|e| e.to_string())?;
    if dir.is_empty() {
        return Err("application directory is empty".to_string());
    }
    Ok((arch, PathBuf::from(dir)))
}
