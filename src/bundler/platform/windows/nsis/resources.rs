//! Installer asset resolution.
//!
//! Decides which file, if any, supplies an optional installer asset such as
//! the header bitmap, a custom script or a per-extension icon.

use crate::bundler::{
    collaborators::ResourceLister,
    error::Result,
    settings::{ResourceOverride, Settings},
};
use path_absolutize::Absolutize;
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

/// Resolves installer assets against the project and its build resources.
///
/// The build resources directory is listed once up front; resolution itself
/// never touches the file system and never fails.
#[derive(Clone, Debug)]
pub struct ResourceResolver {
    project_dir: PathBuf,
    build_resources_dir: PathBuf,
    available: HashSet<String>,
}

impl ResourceResolver {
    /// Creates a resolver from an already listed set of build resource files.
    pub fn new(
        project_dir: impl Into<PathBuf>,
        build_resources_dir: impl Into<PathBuf>,
        available: HashSet<String>,
    ) -> Self {
        Self {
            project_dir: project_dir.into(),
            build_resources_dir: build_resources_dir.into(),
            available,
        }
    }

    /// Lists the build resources directory and creates a resolver.
    pub async fn scan(settings: &Settings, lister: &dyn ResourceLister) -> Result<Self> {
        let available = lister.list_build_resource_files().await?;
        log::debug!(
            "{} file(s) in build resources {}",
            available.len(),
            settings.build_resources_dir().display()
        );
        Ok(Self::new(
            settings.project_dir(),
            settings.build_resources_dir(),
            available,
        ))
    }

    /// Returns the build resources directory.
    pub fn build_resources_dir(&self) -> &Path {
        &self.build_resources_dir
    }

    /// Resolves one asset.
    ///
    /// - An explicit path resolves against the project directory and is
    ///   returned whether or not it exists.
    /// - [`ResourceOverride::Disabled`] resolves to `None`.
    /// - Otherwise `conventional_name` is looked up in the build resources
    ///   listing.
    pub fn resolve(&self, custom: &ResourceOverride, conventional_name: &str) -> Option<PathBuf> {
        match custom {
            ResourceOverride::Path(path) => Some(self.resolve_project_path(path)),
            ResourceOverride::Disabled => None,
            ResourceOverride::Unspecified => self
                .available
                .contains(conventional_name)
                .then(|| self.build_resources_dir.join(conventional_name)),
        }
    }

    fn resolve_project_path(&self, path: &Path) -> PathBuf {
        match path.absolutize_from(&self.project_dir) {
            Ok(resolved) => resolved.into_owned(),
            Err(_) => self.project_dir.join(path),
        }
    }
}
