//! Installer build sequence.
//!
//! [`InstallerBuilder`] collects one archive per architecture, then runs
//! makensis twice: first to produce a self-extracting uninstaller, then to
//! produce the installer that embeds it. Both binaries are signed and the
//! installer is registered as the build artifact.

use super::{
    associations::{FileAssociationScriptGenerator, MacroVariant},
    build::CompilerInvocation,
    defines::{CommandSet, DefineCommandBuilder, DefineSet},
    resources::ResourceResolver,
    script::{BaseScript, INSTALLER_INCLUDE, ScriptAssembler},
    toolset::NsisToolset,
    utils,
};
use crate::bundler::{
    collaborators::{ArchiveFormat, ArchiveRequest, Collaborators, ProcessRequest},
    error::{Error, ErrorExt, Result},
    settings::{Arch, Settings},
    utils::fs::remove_file_if_exists,
};
use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::task::JoinHandle;

/// Temp file name requested for the uninstaller.
const UNINSTALLER_FILE_NAME: &str = "uninstaller.exe";

/// Conventional application icon in the build resources directory.
const APP_ICON: &str = "icon.ico";

/// Where the installer build currently is.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BuildState {
    /// Archiving application directories.
    CollectingArchives,
    /// Compiling and self-extracting the uninstaller.
    BuildingUninstaller,
    /// Signing the extracted uninstaller.
    SigningUninstaller,
    /// Compiling the installer.
    BuildingInstaller,
    /// Signing the installer.
    SigningInstaller,
    /// Installer registered.
    Done,
    /// A step failed; nothing was registered.
    Failed,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BuildState::CollectingArchives => "collecting archives",
            BuildState::BuildingUninstaller => "building uninstaller",
            BuildState::SigningUninstaller => "signing uninstaller",
            BuildState::BuildingInstaller => "building installer",
            BuildState::SigningInstaller => "signing installer",
            BuildState::Done => "done",
            BuildState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Host operating system family, as far as running Windows binaries goes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HostPlatform {
    /// Windows binaries run natively.
    Windows,
    /// Windows binaries run through Wine.
    Other,
}

impl HostPlatform {
    /// The platform this process runs on.
    pub fn current() -> Self {
        if cfg!(windows) {
            HostPlatform::Windows
        } else {
            HostPlatform::Other
        }
    }

    /// Uninstaller output path as seen by the self-extracting binary.
    pub fn uninstaller_out_file(self, path: &Path) -> String {
        match self {
            HostPlatform::Windows => path.display().to_string(),
            HostPlatform::Other => utils::wine_path(path),
        }
    }

    /// Request that runs `installer` so it writes out its uninstaller.
    pub fn self_extract_request(self, installer: &Path) -> ProcessRequest {
        match self {
            HostPlatform::Windows => ProcessRequest::new(installer),
            HostPlatform::Other => {
                ProcessRequest::new("wine").args([installer.display().to_string()])
            }
        }
    }
}

/// A finished installer.
#[derive(Clone, Debug)]
pub struct InstallerReport {
    /// Signed installer executable.
    pub installer_path: PathBuf,
    /// Name the artifact was registered under.
    pub display_name: String,
    /// Signed uninstaller, absent when a custom script was used.
    pub uninstaller_path: Option<PathBuf>,
    /// Intermediate archives that could not be deleted.
    pub cleanup_errors: Vec<String>,
}

/// Result of [`InstallerBuilder::finish_build`].
#[derive(Clone, Debug)]
pub enum BuildOutcome {
    /// The installer was built, signed and registered.
    Installer(InstallerReport),
    /// Only the effective defines and commands were computed.
    DryRun {
        /// Defines that would be passed to makensis.
        defines: DefineSet,
        /// Commands that would be passed to makensis.
        commands: CommandSet,
    },
}

struct PendingArchive {
    arch: Arch,
    task: JoinHandle<Result<PathBuf>>,
}

/// Drives one installer build.
///
/// Call [`build`](Self::build) once per architecture, then
/// [`finish_build`](Self::finish_build).
///
/// # Examples
///
/// ```no_run
/// # use kodegen_bundler_nsis::bundler::{
/// #     collaborators::Collaborators,
/// #     platform::windows::nsis::{InstallerBuilder, NsisToolset},
/// #     settings::{Arch, Settings},
/// # };
/// # use std::sync::Arc;
/// # async fn run(settings: Arc<Settings>, collaborators: Collaborators) -> kodegen_bundler_nsis::bundler::Result<()> {
/// let mut builder = InstallerBuilder::new(settings, collaborators, NsisToolset::locate()?);
/// builder.build(Arch::X64, "dist/win-unpacked");
/// let outcome = builder.finish_build().await?;
/// # Ok(())
/// # }
/// ```
pub struct InstallerBuilder {
    settings: Arc<Settings>,
    collaborators: Collaborators,
    toolset: NsisToolset,
    host: HostPlatform,
    archives: Vec<PendingArchive>,
    state: BuildState,
}

impl InstallerBuilder {
    /// Creates a builder for the current host.
    pub fn new(settings: Arc<Settings>, collaborators: Collaborators, toolset: NsisToolset) -> Self {
        Self {
            settings,
            collaborators,
            toolset,
            host: HostPlatform::current(),
            archives: Vec::new(),
            state: BuildState::CollectingArchives,
        }
    }

    /// Overrides host detection.
    pub fn with_host(mut self, host: HostPlatform) -> Self {
        self.host = host;
        self
    }

    /// Current state.
    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Architectures with a pending or finished archive, in request order.
    pub fn architectures(&self) -> Vec<Arch> {
        self.archives.iter().map(|a| a.arch).collect()
    }

    /// Starts archiving `app_out_dir` for `arch` in the background.
    ///
    /// Returns immediately. Requesting an architecture again replaces its
    /// archive; the new archive is only written after the earlier one
    /// finished, since both target the same file.
    pub fn build(&mut self, arch: Arch, app_out_dir: impl Into<PathBuf>) {
        let app = self.settings.app_info();
        let output = self
            .settings
            .project_out_directory()
            .join(utils::archive_file_name(app, arch));
        let request = ArchiveRequest {
            compression: self.settings.compression(),
            format: ArchiveFormat::SevenZip,
            output,
            source_dir: app_out_dir.into(),
            without_dir: true,
        };

        let existing = self.archives.iter().position(|a| a.arch == arch);
        let previous = existing.map(|index| self.archives.remove(index).task);

        log::info!("Creating NSIS {arch} package");
        let archiver = Arc::clone(&self.collaborators.archiver);
        let task = tokio::spawn(async move {
            if let Some(previous) = previous {
                match previous.await {
                    Ok(Err(err)) => log::debug!("Replaced {arch} archive had failed: {err}"),
                    Err(err) => log::debug!("Replaced {arch} archive task failed: {err}"),
                    Ok(Ok(_)) => {}
                }
            }
            if let Some(parent) = request.output.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .fs_context("creating output directory", parent)?;
            }
            archiver.compress(request).await
        });

        self.archives.push(PendingArchive { arch, task });
    }

    /// Runs the remaining sequence and returns the finished installer.
    ///
    /// Any failure moves the builder to [`BuildState::Failed`] and is
    /// returned with the step it happened in. Files produced so far stay on
    /// disk and nothing is registered.
    pub async fn finish_build(&mut self) -> Result<BuildOutcome> {
        log::info!("Building NSIS installer");
        match self.run().await {
            Ok(outcome) => {
                self.state = BuildState::Done;
                Ok(outcome)
            }
            Err(err) => {
                let err = if err.is_configuration() {
                    err
                } else {
                    err.in_step(self.state)
                };
                self.state = BuildState::Failed;
                Err(err)
            }
        }
    }

    async fn run(&mut self) -> Result<BuildOutcome> {
        let settings = Arc::clone(&self.settings);
        let associations = settings.file_associations()?;

        self.state = BuildState::CollectingArchives;
        let archives = self.join_archives().await?;

        let app = settings.app_info();
        let resolver = ResourceResolver::scan(&settings, self.collaborators.resources.as_ref()).await?;
        let icon = resolver
            .resolve(&settings.icon_override(), APP_ICON)
            .ok_or(Error::IconPathError)?;

        let installer_path = settings
            .project_out_directory()
            .join(utils::installer_file_name(app));

        let (mut defines, commands) =
            DefineCommandBuilder::new(&settings, &resolver).build(&icon, &installer_path, &archives)?;

        log::debug!("NSIS defines: {:?}", defines.to_args());
        log::debug!("NSIS commands: {:?}", commands.to_args());

        if settings.dry_run() {
            self.remove_archives(&archives).await;
            return Ok(BuildOutcome::DryRun { defines, commands });
        }

        let base = BaseScript::load(&settings, &resolver).await?;
        let include = resolver.resolve(&settings.nsis_settings().include, INSTALLER_INCLUDE);
        let assembler = ScriptAssembler::new(include.as_deref(), resolver.build_resources_dir());
        let generator = FileAssociationScriptGenerator::new(&resolver, settings.product_name());
        let compiler = CompilerInvocation::new(&self.toolset, settings.nsis_templates_dir());
        let runner = Arc::clone(&self.collaborators.processes);

        let uninstaller_path = if base.is_custom() {
            log::warn!("Custom NSIS script is used, uninstaller is not signed");
            None
        } else {
            self.state = BuildState::BuildingUninstaller;
            let uninstaller_path = self
                .collaborators
                .temp_files
                .temp_file(UNINSTALLER_FILE_NAME)
                .await?;
            defines.flag("BUILD_UNINSTALLER");
            defines.set(
                "UNINSTALLER_OUT_FILE",
                self.host.uninstaller_out_file(&uninstaller_path),
            );

            log::info!("Executing makensis (uninstaller)");
            let macros = generator.generate(MacroVariant::Unregister, &associations);
            let script = assembler.assemble(&base.text, macros.as_deref());
            compiler.run(runner.as_ref(), &defines, &commands, script).await?;

            let request = self.host.self_extract_request(&installer_path);
            let command = request.display_name();
            runner.run(request).await?.into_result(&command)?;

            self.state = BuildState::SigningUninstaller;
            self.collaborators.signer.sign(&uninstaller_path).await?;

            defines.remove("BUILD_UNINSTALLER");
            defines.set("UNINSTALLER_OUT_FILE", uninstaller_path.display().to_string());
            Some(uninstaller_path)
        };

        self.state = BuildState::BuildingInstaller;
        log::info!("Executing makensis (installer)");
        let macros = generator.generate(MacroVariant::Register, &associations);
        let script = assembler.assemble(&base.text, macros.as_deref());
        compiler.run(runner.as_ref(), &defines, &commands, script).await?;

        self.state = BuildState::SigningInstaller;
        self.collaborators.signer.sign(&installer_path).await?;

        let display_name = utils::artifact_display_name(app);
        self.collaborators
            .artifacts
            .artifact_created(&installer_path, &display_name);
        log::info!("✓ Created NSIS installer: {}", installer_path.display());

        let cleanup_errors = self.remove_archives(&archives).await;

        Ok(BuildOutcome::Installer(InstallerReport {
            installer_path,
            display_name,
            uninstaller_path,
            cleanup_errors,
        }))
    }

    /// Awaits every archive task, preserving request order.
    async fn join_archives(&mut self) -> Result<Vec<(Arch, PathBuf)>> {
        let pending = std::mem::take(&mut self.archives);
        let mut archives = Vec::with_capacity(pending.len());
        for PendingArchive { arch, task } in pending {
            let path = task
                .await
                .map_err(|e| Error::GenericError(format!("{arch} archive task failed: {e}")))??;
            archives.push((arch, path));
        }
        Ok(archives)
    }

    /// Deletes intermediate archives, collecting failures instead of failing.
    async fn remove_archives(&self, archives: &[(Arch, PathBuf)]) -> Vec<String> {
        let mut errors = Vec::new();
        for (_, path) in archives {
            if let Err(e) = remove_file_if_exists(path).await {
                log::warn!("Failed to remove intermediate archive: {e}");
                errors.push(e.to_string());
            }
        }
        errors
    }
}
