//! 7-Zip archive creation.
//!
//! The installer unpacks application files with the Nsis7z plugin, so each
//! architecture's application directory is packed with `7za` (or `7z`).

use crate::bundler::{
    collaborators::{ArchiveRequest, Archiver, ProcessRequest, ProcessRunner},
    error::{Error, Result},
    utils::fs::remove_file_if_exists,
};
use async_trait::async_trait;
use std::{path::PathBuf, sync::Arc};

/// Executable names tried, in order.
const SEVEN_ZIP_CANDIDATES: [&str; 2] = ["7za", "7z"];

/// [`Archiver`] backed by the 7-Zip command line tool.
pub struct SevenZipArchiver {
    executable: PathBuf,
    runner: Arc<dyn ProcessRunner>,
}

impl SevenZipArchiver {
    /// Uses an explicit 7-Zip executable.
    pub fn new(executable: impl Into<PathBuf>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            executable: executable.into(),
            runner,
        }
    }

    /// Finds `7za` or `7z` on `PATH`.
    pub fn locate(runner: Arc<dyn ProcessRunner>) -> Result<Self> {
        SEVEN_ZIP_CANDIDATES
            .iter()
            .find_map(|name| which::which(name).ok())
            .map(|executable| Self::new(executable, runner))
            .ok_or_else(|| {
                Error::GenericError(
                    "7-Zip not found. Please install p7zip (7za) or 7-Zip (7z)".into(),
                )
            })
    }

    /// Arguments for one archive request.
    ///
    /// With `without_dir` the tool runs inside the source directory and adds
    /// `.`, so the archive root holds the directory contents.
    pub fn arguments(request: &ArchiveRequest) -> Vec<String> {
        let source = if request.without_dir {
            ".".to_string()
        } else {
            request.source_dir.display().to_string()
        };
        vec![
            "a".to_string(),
            "-bd".to_string(),
            format!("-t{}", request.format.as_str()),
            format!("-mx={}", request.compression.seven_zip_level()),
            request.output.display().to_string(),
            source,
        ]
    }
}

#[async_trait]
impl Archiver for SevenZipArchiver {
    async fn compress(&self, request: ArchiveRequest) -> Result<PathBuf> {
        // 7z appends to existing archives.
        remove_file_if_exists(&request.output).await?;

        let mut process =
            ProcessRequest::new(&self.executable).args(Self::arguments(&request));
        if request.without_dir {
            process = process.current_dir(&request.source_dir);
        }

        let command = process.display_name();
        self.runner.run(process).await?.into_result(&command)?;
        log::debug!("Created archive {}", request.output.display());
        Ok(request.output)
    }
}
