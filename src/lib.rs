//! Windows NSIS installer builder library
//!
//! Builds Windows installers with NSIS: per-architecture 7z archives,
//! makensis defines and commands, installer script synthesis with file
//! association macros, a two-pass compile producing a signed uninstaller,
//! and signing of the final installer.
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
