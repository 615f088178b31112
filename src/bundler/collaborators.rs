//! Interfaces to the external systems the installer target drives.
//!
//! The installer builder never touches 7-Zip, makensis, Wine or a signing
//! tool directly. It issues requests through these traits so the sequence
//! can be exercised without any of those tools installed. Production
//! implementations live in [`archive`](crate::bundler::archive),
//! [`process`](crate::bundler::process),
//! [`sign`](crate::bundler::platform::windows::sign) and
//! [`builder`](crate::bundler::builder).

use crate::bundler::{error::Result, settings::Compression};
use async_trait::async_trait;
use std::{
    collections::HashSet,
    ffi::OsString,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Archive container format.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArchiveFormat {
    /// 7-Zip archive (`.7z`), unpacked by the installer's Nsis7z plugin.
    SevenZip,
}

impl ArchiveFormat {
    /// Format name as understood by `7z -t`.
    pub fn as_str(self) -> &'static str {
        match self {
            ArchiveFormat::SevenZip => "7z",
        }
    }
}

/// Request to compress an application directory.
#[derive(Clone, Debug)]
pub struct ArchiveRequest {
    /// Compression mode.
    pub compression: Compression,
    /// Container format.
    pub format: ArchiveFormat,
    /// Archive to create (replaced when it exists).
    pub output: PathBuf,
    /// Directory to archive.
    pub source_dir: PathBuf,
    /// Store the directory's contents at the archive root instead of the
    /// directory itself.
    pub without_dir: bool,
}

/// Compresses a prepared application directory.
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Creates the archive and returns its path.
    async fn compress(&self, request: ArchiveRequest) -> Result<PathBuf>;
}

/// Signs a binary in place.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Signs `path`; an error aborts the build.
    async fn sign(&self, path: &Path) -> Result<()>;
}

/// Lists the files present in the build resources directory.
#[async_trait]
pub trait ResourceLister: Send + Sync {
    /// File names (not paths) directly inside the build resources directory.
    async fn list_build_resource_files(&self) -> Result<HashSet<String>>;
}

/// Receives finished build artifacts.
pub trait ArtifactSink: Send + Sync {
    /// Notifies that `path` is a build output shown to users as `display_name`.
    fn artifact_created(&self, path: &Path, display_name: &str);
}

/// Allocates paths for temporary files.
#[async_trait]
pub trait TempFiles: Send + Sync {
    /// Returns a fresh path whose file name ends with `name`.
    async fn temp_file(&self, name: &str) -> Result<PathBuf>;
}

/// A child process to run to completion.
#[derive(Clone, Debug, Default)]
pub struct ProcessRequest {
    /// Executable to run.
    pub program: PathBuf,
    /// Arguments, passed verbatim.
    pub args: Vec<String>,
    /// Extra environment variables.
    pub env: Vec<(String, OsString)>,
    /// Working directory.
    pub cwd: Option<PathBuf>,
    /// Text written to stdin before it is closed.
    pub stdin: Option<String>,
}

impl ProcessRequest {
    /// Creates a request for `program` with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Default::default()
        }
    }

    /// Appends arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Adds an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Sets the working directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Sets the stdin payload.
    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// File name of the program, for messages.
    pub fn display_name(&self) -> String {
        self.program
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }
}

/// Captured result of a finished child process.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProcessOutput {
    /// Exit code; `None` when terminated by a signal.
    pub code: Option<i32>,
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
}

impl ProcessOutput {
    /// Output of a process that exited with code 0.
    pub fn success() -> Self {
        Self {
            code: Some(0),
            ..Default::default()
        }
    }

    /// True when the exit code is 0.
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Converts a non-zero exit into [`Error::ProcessFailed`](crate::bundler::Error::ProcessFailed).
    pub fn into_result(self, command: &str) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let output = if self.stderr.trim().is_empty() {
            self.stdout
        } else {
            self.stderr
        };
        Err(crate::bundler::Error::ProcessFailed {
            command: command.to_string(),
            code: self.code,
            output,
        })
    }
}

/// Runs child processes.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs the process to completion.
    ///
    /// Spawn failures are errors; non-zero exits are reported in the output.
    async fn run(&self, request: ProcessRequest) -> Result<ProcessOutput>;
}

/// Every collaborator the installer builder needs.
#[derive(Clone)]
pub struct Collaborators {
    /// Archive creation.
    pub archiver: Arc<dyn Archiver>,
    /// Code signing.
    pub signer: Arc<dyn Signer>,
    /// Build resources listing.
    pub resources: Arc<dyn ResourceLister>,
    /// Artifact registration.
    pub artifacts: Arc<dyn ArtifactSink>,
    /// Temporary file allocation.
    pub temp_files: Arc<dyn TempFiles>,
    /// Child process execution.
    pub processes: Arc<dyn ProcessRunner>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
