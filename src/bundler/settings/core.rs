//! Core Settings struct and implementations.

use super::{
    AppInfo, BundleSettings, Compression, FileAssociation, NsisSettings, ResourceOverride,
    WindowsSettings,
};
use crate::bundler::Result;
use std::path::{Path, PathBuf};

/// Main settings for bundler operations.
///
/// Central configuration for the installer target, constructed via
/// [`SettingsBuilder`](super::SettingsBuilder). All directories are absolute.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_nsis::bundler::{AppInfo, SettingsBuilder};
///
/// # fn example() -> kodegen_bundler_nsis::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .project_dir("/work/myapp")
///     .app_info(AppInfo {
///         name: "myapp".into(),
///         product_name: "MyApp".into(),
///         version: "1.0.0".into(),
///         ..Default::default()
///     })
///     .build()?;
/// assert!(settings.build_resources_dir().ends_with("build"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Settings {
    /// Application metadata.
    app_info: AppInfo,

    /// Bundle configuration.
    bundle_settings: BundleSettings,

    /// Project root; relative resource overrides resolve against it.
    project_dir: PathBuf,

    /// Directory holding conventional installer assets.
    build_resources_dir: PathBuf,

    /// Output directory for archives and installers.
    project_out_directory: PathBuf,

    /// Directory with the base `installer.nsi` and its includes.
    nsis_templates_dir: PathBuf,

    /// Compute defines and commands only.
    dry_run: bool,
}

impl Settings {
    /// Returns the application metadata.
    pub fn app_info(&self) -> &AppInfo {
        &self.app_info
    }

    /// Returns the product name.
    pub fn product_name(&self) -> &str {
        &self.app_info.product_name
    }

    /// Returns the version string.
    pub fn version_string(&self) -> &str {
        &self.app_info.version
    }

    /// Returns the project root directory.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Returns the build resources directory.
    pub fn build_resources_dir(&self) -> &Path {
        &self.build_resources_dir
    }

    /// Returns the output directory.
    pub fn project_out_directory(&self) -> &Path {
        &self.project_out_directory
    }

    /// Returns the NSIS template directory (also makensis' working directory).
    pub fn nsis_templates_dir(&self) -> &Path {
        &self.nsis_templates_dir
    }

    /// Returns the bundle settings.
    pub fn bundle_settings(&self) -> &BundleSettings {
        &self.bundle_settings
    }

    /// Returns the Windows settings.
    pub fn windows_settings(&self) -> &WindowsSettings {
        &self.bundle_settings.windows
    }

    /// Returns the NSIS installer options.
    pub fn nsis_settings(&self) -> &NsisSettings {
        &self.bundle_settings.windows.nsis
    }

    /// Returns the configured compression mode.
    pub fn compression(&self) -> Compression {
        self.bundle_settings.compression
    }

    /// Global file associations followed by the Windows-specific ones.
    ///
    /// Fails with a configuration error on the first invalid descriptor.
    pub fn file_associations(&self) -> Result<Vec<FileAssociation>> {
        self.bundle_settings
            .file_associations
            .iter()
            .chain(self.bundle_settings.windows.file_associations.iter())
            .map(|association| association.validate().map(|()| association.clone()))
            .collect()
    }

    /// Application icon override.
    pub fn icon_override(&self) -> ResourceOverride {
        match &self.bundle_settings.icon {
            Some(path) => ResourceOverride::Path(path.clone()),
            None => ResourceOverride::Unspecified,
        }
    }

    /// Whether only the effective defines and commands should be computed.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Creates a new Settings instance (used by SettingsBuilder).
    pub(super) fn new(
        app_info: AppInfo,
        bundle_settings: BundleSettings,
        project_dir: PathBuf,
        build_resources_dir: PathBuf,
        project_out_directory: PathBuf,
        nsis_templates_dir: PathBuf,
        dry_run: bool,
    ) -> Self {
        Self {
            app_info,
            bundle_settings,
            project_dir,
            build_resources_dir,
            project_out_directory,
            nsis_templates_dir,
            dry_run,
        }
    }
}
