//! Main bundler orchestration and coordination.
//!
//! This module provides the [`Bundler`] orchestrator and the production
//! implementations of the collaborators the installer builder relies on.

use crate::{
    bail,
    bundler::{
        Result, Settings,
        archive::SevenZipArchiver,
        collaborators::{ArtifactSink, Collaborators, ProcessRunner, ResourceLister, TempFiles},
        error::ErrorExt,
        platform::windows::{
            nsis::{BuildOutcome, CommandSet, DefineSet, InstallerBuilder, NsisToolset},
            sign::{AuthenticodeSigner, should_sign},
        },
        process::TokioProcessRunner,
        settings::Arch,
        utils::fs::list_file_names,
    },
};
use async_trait::async_trait;
use serde::Serialize;
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use super::{checksum::calculate_sha256, tool_detection::missing_tools};

/// A registered installer with its metadata.
#[derive(Clone, Debug, Serialize)]
pub struct BundledArtifact {
    /// Installer location.
    pub path: PathBuf,
    /// Normalized name for publishing (`<name>-Setup-<version>.exe`).
    pub display_name: String,
    /// Size in bytes.
    pub size: u64,
    /// Hex-encoded SHA-256 of the file.
    pub checksum: String,
}

/// Result of [`Bundler::bundle`].
#[derive(Clone, Debug)]
pub enum BundleOutcome {
    /// Installers were created.
    Artifacts(Vec<BundledArtifact>),
    /// Dry run: the makensis inputs that would have been used.
    DryRun {
        /// Effective defines.
        defines: DefineSet,
        /// Effective commands.
        commands: CommandSet,
    },
}

impl BundleOutcome {
    /// Created artifacts; empty for a dry run.
    pub fn artifacts(&self) -> &[BundledArtifact] {
        match self {
            BundleOutcome::Artifacts(artifacts) => artifacts,
            BundleOutcome::DryRun { .. } => &[],
        }
    }
}

/// Lists the build resources directory on disk.
#[derive(Clone, Debug)]
pub struct FsResourceLister {
    dir: PathBuf,
}

impl FsResourceLister {
    /// Lists `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ResourceLister for FsResourceLister {
    async fn list_build_resource_files(&self) -> Result<HashSet<String>> {
        list_file_names(&self.dir).await
    }
}

/// Collects registered artifacts in registration order.
#[derive(Debug, Default)]
pub struct ArtifactCollector {
    artifacts: Mutex<Vec<(PathBuf, String)>>,
}

impl ArtifactCollector {
    /// Removes and returns everything registered so far.
    pub fn take(&self) -> Vec<(PathBuf, String)> {
        let mut artifacts = self
            .artifacts
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *artifacts)
    }
}

impl ArtifactSink for ArtifactCollector {
    fn artifact_created(&self, path: &Path, display_name: &str) {
        log::debug!("Artifact created: {} ({display_name})", path.display());
        self.artifacts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((path.to_path_buf(), display_name.to_string()));
    }
}

/// Temp files inside a directory removed when this value is dropped.
#[derive(Debug)]
pub struct TempDirFiles {
    dir: tempfile::TempDir,
}

impl TempDirFiles {
    /// Creates a fresh temporary directory.
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("kodegen-nsis-")
            .tempdir()
            .fs_context("creating temp directory", std::env::temp_dir())?;
        Ok(Self { dir })
    }

    /// The backing directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[async_trait]
impl TempFiles for TempDirFiles {
    async fn temp_file(&self, name: &str) -> Result<PathBuf> {
        let unique = uuid::Uuid::new_v4().simple().to_string();
        Ok(self.dir.path().join(format!("{}-{name}", &unique[..8])))
    }
}

/// Main bundler orchestrator.
///
/// Builds one NSIS installer containing every requested architecture and
/// returns it with size and checksum.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_nsis::bundler::{Arch, Bundler, Settings};
///
/// # async fn example(settings: Settings) -> kodegen_bundler_nsis::bundler::Result<()> {
/// let bundler = Bundler::new(settings)?;
/// let outcome = bundler
///     .bundle(&[
///         (Arch::X64, "dist/win-unpacked".into()),
///         (Arch::X86, "dist/win-ia32-unpacked".into()),
///     ])
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct Bundler {
    settings: Arc<Settings>,
    toolset: NsisToolset,
    processes: Arc<dyn ProcessRunner>,
    temp_files: Arc<TempDirFiles>,
}

impl std::fmt::Debug for Bundler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bundler")
            .field("settings", &self.settings)
            .field("toolset", &self.toolset)
            .field("temp_dir", &self.temp_files.path())
            .finish()
    }
}

impl Bundler {
    /// Creates a bundler, locating makensis.
    pub fn new(settings: Settings) -> Result<Self> {
        let toolset = NsisToolset::locate()?;
        Self::with_toolset(settings, toolset)
    }

    /// Creates a bundler using an explicit NSIS toolset.
    pub fn with_toolset(settings: Settings, toolset: NsisToolset) -> Result<Self> {
        Ok(Self {
            settings: Arc::new(settings),
            toolset,
            processes: Arc::new(TokioProcessRunner),
            temp_files: Arc::new(TempDirFiles::new()?),
        })
    }

    /// Returns a reference to the bundler settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Builds the installer from prepared application directories.
    ///
    /// # Arguments
    ///
    /// * `apps` - Unpacked application directory per architecture
    pub async fn bundle(&self, apps: &[(Arch, PathBuf)]) -> Result<BundleOutcome> {
        if apps.is_empty() {
            bail!("No application directories given; nothing to package");
        }

        let missing = missing_tools();
        if !missing.is_empty() {
            log::warn!("Missing tools: {}", missing.join(", "));
        }

        let windows = self.settings.windows_settings();
        if !should_sign(windows) {
            log::info!("Code signing not configured, binaries will be unsigned");
        }

        let artifacts = Arc::new(ArtifactCollector::default());
        let collaborators = Collaborators {
            archiver: Arc::new(SevenZipArchiver::locate(Arc::clone(&self.processes))?),
            signer: Arc::new(AuthenticodeSigner::new(
                windows.clone(),
                Arc::clone(&self.processes),
            )),
            resources: Arc::new(FsResourceLister::new(self.settings.build_resources_dir())),
            artifacts: artifacts.clone(),
            temp_files: self.temp_files.clone(),
            processes: Arc::clone(&self.processes),
        };

        let mut builder = InstallerBuilder::new(
            Arc::clone(&self.settings),
            collaborators,
            self.toolset.clone(),
        );
        for (arch, dir) in apps {
            builder.build(*arch, dir);
        }

        match builder.finish_build().await? {
            BuildOutcome::DryRun { defines, commands } => {
                Ok(BundleOutcome::DryRun { defines, commands })
            }
            BuildOutcome::Installer(report) => {
                for error in &report.cleanup_errors {
                    log::warn!("Cleanup: {error}");
                }
                let mut bundled = Vec::new();
                for (path, display_name) in artifacts.take() {
                    bundled.push(describe(path, display_name).await?);
                }
                Ok(BundleOutcome::Artifacts(bundled))
            }
        }
    }
}

async fn describe(path: PathBuf, display_name: String) -> Result<BundledArtifact> {
    let size = tokio::fs::metadata(&path)
        .await
        .fs_context("reading artifact metadata", &path)?
        .len();
    let checksum = calculate_sha256(&path).await?;
    Ok(BundledArtifact {
        path,
        display_name,
        size,
        checksum,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_keeps_registration_order() {
        let collector = ArtifactCollector::default();
        collector.artifact_created(Path::new("/out/a.exe"), "a-Setup-1.0.0.exe");
        collector.artifact_created(Path::new("/out/b.exe"), "b-Setup-1.0.0.exe");

        let taken = collector.take();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].1, "a-Setup-1.0.0.exe");
        assert!(collector.take().is_empty());
    }

    #[tokio::test]
    async fn temp_files_are_unique_and_keep_name() {
        let files = TempDirFiles::new().unwrap();
        let a = files.temp_file("uninstaller.exe").await.unwrap();
        let b = files.temp_file("uninstaller.exe").await.unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with(files.path()));
        assert!(a.to_string_lossy().ends_with("-uninstaller.exe"));
    }

    #[tokio::test]
    async fn artifact_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("App Setup 1.0.0.exe");
        std::fs::write(&path, b"abc").unwrap();

        let artifact = describe(path.clone(), "app-Setup-1.0.0.exe".into())
            .await
            .unwrap();
        assert_eq!(artifact.size, 3);
        assert_eq!(artifact.checksum.len(), 64);
        assert_eq!(artifact.path, path);
    }
}
