//! Builder for constructing Settings.

use super::{AppInfo, BundleSettings, Settings};
use crate::bundler::error::{Context, Error, ErrorExt, Result};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// Builder for constructing [`Settings`].
///
/// Relative directories resolve against the project directory, which itself
/// resolves against the current working directory.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_nsis::bundler::{AppInfo, SettingsBuilder};
///
/// # fn example() -> kodegen_bundler_nsis::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .project_dir(".")
///     .project_out_directory("dist")
///     .app_info(AppInfo {
///         name: "myapp".into(),
///         product_name: "MyApp".into(),
///         version: "1.0.0".into(),
///         ..Default::default()
///     })
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    project_dir: Option<PathBuf>,
    build_resources_dir: Option<PathBuf>,
    project_out_directory: Option<PathBuf>,
    nsis_templates_dir: Option<PathBuf>,
    app_info: Option<AppInfo>,
    bundle_settings: BundleSettings,
    dry_run: bool,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the project root.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn project_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.project_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the build resources directory.
    ///
    /// Default: `<project_dir>/build`
    pub fn build_resources_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.build_resources_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the output directory.
    ///
    /// Default: `<project_dir>/dist`
    pub fn project_out_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.project_out_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the NSIS template directory.
    ///
    /// Default: the `templates/nsis` directory shipped with this crate
    pub fn nsis_templates_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.nsis_templates_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets application metadata.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn app_info(mut self, info: AppInfo) -> Self {
        self.app_info = Some(info);
        self
    }

    /// Sets bundle configuration.
    ///
    /// Default: Empty [`BundleSettings`]
    pub fn bundle_settings(mut self, settings: BundleSettings) -> Self {
        self.bundle_settings = settings;
        self
    }

    /// Only compute defines and commands, never run makensis.
    ///
    /// Default: false
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `project_dir` or `app_info` is missing, or if the
    /// application metadata is unusable (empty name or malformed version).
    pub fn build(self) -> Result<Settings> {
        let project_dir = self
            .project_dir
            .context("project_dir is required")?
            .absolutize()
            .fs_context("resolving project directory", ".")?
            .into_owned();

        let app_info = self.app_info.context("app_info is required")?;
        if app_info.name.is_empty() {
            return Err(Error::Config("application name must not be empty".into()));
        }
        app_info.semver()?;

        let resolve = |path: Option<PathBuf>, default: &str| -> Result<PathBuf> {
            let path = path.unwrap_or_else(|| PathBuf::from(default));
            Ok(path
                .absolutize_from(&project_dir)
                .fs_context("resolving directory", &path)?
                .into_owned())
        };

        let build_resources_dir = resolve(self.build_resources_dir, "build")?;
        let project_out_directory = resolve(self.project_out_directory, "dist")?;
        let nsis_templates_dir = match self.nsis_templates_dir {
            Some(dir) => resolve(Some(dir), "")?,
            None => Path::new(env!("CARGO_MANIFEST_DIR")).join("templates").join("nsis"),
        };

        Ok(Settings::new(
            app_info,
            self.bundle_settings,
            project_dir,
            build_resources_dir,
            project_out_directory,
            nsis_templates_dir,
            self.dry_run,
        ))
    }
}
