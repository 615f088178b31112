//! Configuration structures for bundling operations.
//!
//! This module provides the configuration types for the NSIS installer
//! target: application metadata, installer options, file associations,
//! signing configuration, and a builder for constructing settings.

mod arch;
mod builder;
mod bundle;
mod core;
mod package;
mod windows;

// Re-export all public types
pub use arch::Arch;
pub use builder::SettingsBuilder;
pub use bundle::{BundleSettings, Compression, FileAssociation, normalize_ext};
pub use core::Settings;
pub use package::AppInfo;
pub use windows::{NsisSettings, ResourceOverride, WindowsSettings};
