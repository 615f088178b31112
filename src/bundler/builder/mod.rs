//! Bundle orchestration and coordination.
//!
//! This module provides the [`Bundler`] that wires the NSIS installer
//! builder to real collaborators (7-Zip, makensis, osslsigncode and the
//! file system) and turns the registered installer into a
//! [`BundledArtifact`].
//!
//! # Example
//!
//! ```no_run
//! use kodegen_bundler_nsis::bundler::{AppInfo, Arch, Bundler, SettingsBuilder};
//!
//! # async fn example() -> kodegen_bundler_nsis::bundler::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .project_dir(".")
//!     .app_info(AppInfo {
//!         name: "my-app".into(),
//!         product_name: "My App".into(),
//!         version: "1.0.0".into(),
//!         ..Default::default()
//!     })
//!     .build()?;
//!
//! let bundler = Bundler::new(settings)?;
//! let artifacts = bundler.bundle(&[(Arch::X64, "dist/win-unpacked".into())]).await?;
//!
//! for artifact in artifacts.artifacts() {
//!     println!("Created: {} ({} bytes)", artifact.display_name, artifact.size);
//!     println!("SHA256: {}", artifact.checksum);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`checksum`] - SHA256 checksum calculation for artifacts
//! - [`orchestrator`] - [`Bundler`] and the production collaborators
//! - [`tool_detection`] - External tool availability checking

pub mod checksum;
pub mod orchestrator;
pub mod tool_detection;

pub use orchestrator::{
    ArtifactCollector, BundleOutcome, BundledArtifact, Bundler, FsResourceLister, TempDirFiles,
};
