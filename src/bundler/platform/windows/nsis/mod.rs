//! Windows NSIS installer creation.
//!
//! Builds Windows installers with NSIS (Nullsoft Scriptable Install System).
//! Application directories are packed into per-architecture 7z archives that
//! the installer unpacks at install time; makensis compiles the installer
//! script twice so the uninstaller embedded in the installer can be signed.
//!
//! # Module Organization
//!
//! - `resources` - Optional installer asset lookup
//! - `defines` - makensis defines and commands
//! - `associations` - File association macros
//! - `script` - Installer script assembly
//! - `build` - makensis execution
//! - `installer` - Build sequence
//! - `toolset` - NSIS toolset location
//! - `utils` - Helper functions (version formatting, file naming, etc.)

mod associations;
mod build;
mod defines;
mod installer;
mod resources;
mod script;
mod toolset;
mod utils;

pub use associations::{
    FileAssociationScriptGenerator, MacroVariant, REGISTER_MACRO, UNREGISTER_MACRO,
};
pub use build::{CompilerInvocation, compiler_args};
pub use defines::{
    CommandSet, CommandValue, DefineCommandBuilder, DefineSet, INSTALLER_GUID_NAMESPACE,
    derive_guid,
};
pub use installer::{BuildOutcome, BuildState, HostPlatform, InstallerBuilder, InstallerReport};
pub use resources::ResourceResolver;
pub use script::{
    BaseScript, FILE_ASSOCIATION_INCLUDE, INSTALLER_INCLUDE, INSTALLER_SCRIPT, ScriptAssembler,
};
pub use toolset::NsisToolset;
pub use utils::{
    archive_file_name, artifact_display_name, installer_file_name, product_version, wine_path,
};
