//! NSIS installer bundling core.
//!
//! - [`settings`] - Configuration types and [`SettingsBuilder`]
//! - [`platform`] - The NSIS target and Windows signing
//! - [`collaborators`] - Interfaces to external tools
//! - [`archive`] / [`process`] - 7-Zip and child process implementations
//! - [`builder`] - [`Bundler`] wiring everything together

pub mod archive;
pub mod builder;
pub mod collaborators;
pub mod error;
pub mod platform;
pub mod process;
pub mod settings;
pub mod utils;

pub use builder::{BundleOutcome, BundledArtifact, Bundler};
pub use error::{Error, Result};
pub use settings::{
    AppInfo, Arch, BundleSettings, Compression, FileAssociation, NsisSettings, ResourceOverride,
    Settings, SettingsBuilder, WindowsSettings,
};
