//! Recording collaborators for driving the installer builder without any
//! external tools.

#![allow(dead_code)]

use async_trait::async_trait;
use kodegen_bundler_nsis::bundler::{
    AppInfo, BundleSettings, Error, Result, Settings, SettingsBuilder,
    collaborators::{
        ArchiveRequest, Archiver, ArtifactSink, Collaborators, ProcessOutput, ProcessRequest,
        ProcessRunner, ResourceLister, Signer, TempFiles,
    },
    platform::windows::nsis::NsisToolset,
};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tempfile::TempDir;

pub const MAKENSIS: &str = "/opt/nsis/linux/makensis";

/// Writes a placeholder archive and records the request.
///
/// `fail` makes every request fail and `fail_source` only requests for that
/// app directory; `as_directory` leaves a non-empty directory at the output
/// path so it cannot be removed as a file.
#[derive(Default)]
pub struct FakeArchiver {
    pub requests: Mutex<Vec<ArchiveRequest>>,
    pub fail: bool,
    pub fail_source: Option<PathBuf>,
    pub as_directory: bool,
}

#[async_trait]
impl Archiver for FakeArchiver {
    async fn compress(&self, request: ArchiveRequest) -> Result<PathBuf> {
        if self.fail || self.fail_source.as_ref() == Some(&request.source_dir) {
            return Err(Error::GenericError("7za exited with code 2".into()));
        }
        if self.as_directory {
            tokio::fs::create_dir_all(&request.output).await?;
            tokio::fs::write(request.output.join("payload"), b"7z").await?;
        } else {
            tokio::fs::write(&request.output, b"7z").await?;
        }
        let output = request.output.clone();
        self.requests.lock().unwrap().push(request);
        Ok(output)
    }
}

#[derive(Default)]
pub struct RecordingSigner {
    pub signed: Mutex<Vec<PathBuf>>,
    pub fail: bool,
}

#[async_trait]
impl Signer for RecordingSigner {
    async fn sign(&self, path: &Path) -> Result<()> {
        self.signed.lock().unwrap().push(path.to_path_buf());
        if self.fail {
            return Err(Error::Sign {
                path: path.to_path_buf(),
                reason: "no certificate".into(),
            });
        }
        Ok(())
    }
}

pub struct StaticResources(pub HashSet<String>);

#[async_trait]
impl ResourceLister for StaticResources {
    async fn list_build_resource_files(&self) -> Result<HashSet<String>> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub artifacts: Mutex<Vec<(PathBuf, String)>>,
}

impl ArtifactSink for RecordingSink {
    fn artifact_created(&self, path: &Path, display_name: &str) {
        self.artifacts
            .lock()
            .unwrap()
            .push((path.to_path_buf(), display_name.to_string()));
    }
}

pub struct DirTempFiles(pub PathBuf);

#[async_trait]
impl TempFiles for DirTempFiles {
    async fn temp_file(&self, name: &str) -> Result<PathBuf> {
        Ok(self.0.join(format!("t-{name}")))
    }
}

type Responder = Box<dyn Fn(&ProcessRequest, usize) -> ProcessOutput + Send + Sync>;

/// Records every process request; answers with `respond(request, index)`.
pub struct RecordingRunner {
    pub requests: Mutex<Vec<ProcessRequest>>,
    respond: Responder,
}

impl RecordingRunner {
    pub fn succeeding() -> Self {
        Self::with(|_, _| ProcessOutput::success())
    }

    pub fn with(
        respond: impl Fn(&ProcessRequest, usize) -> ProcessOutput + Send + Sync + 'static,
    ) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            respond: Box::new(respond),
        }
    }

    pub fn requests(&self) -> Vec<ProcessRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn compiler_requests(&self) -> Vec<ProcessRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.program == Path::new(MAKENSIS))
            .collect()
    }
}

#[async_trait]
impl ProcessRunner for RecordingRunner {
    async fn run(&self, request: ProcessRequest) -> Result<ProcessOutput> {
        let mut requests = self.requests.lock().unwrap();
        let output = (self.respond)(&request, requests.len());
        requests.push(request);
        Ok(output)
    }
}

/// A project on disk plus the fakes wired into [`Collaborators`].
pub struct Harness {
    pub dir: TempDir,
    pub archiver: Arc<FakeArchiver>,
    pub signer: Arc<RecordingSigner>,
    pub sink: Arc<RecordingSink>,
    pub runner: Arc<RecordingRunner>,
    pub resources: HashSet<String>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_parts(RecordingRunner::succeeding(), RecordingSigner::default())
    }

    pub fn with_parts(runner: RecordingRunner, signer: RecordingSigner) -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("build")).unwrap();
        std::fs::create_dir_all(dir.path().join("tmp")).unwrap();
        Self {
            dir,
            archiver: Arc::new(FakeArchiver::default()),
            signer: Arc::new(signer),
            sink: Arc::new(RecordingSink::default()),
            runner: Arc::new(runner),
            resources: ["icon.ico".to_string()].into_iter().collect(),
        }
    }

    pub fn project(&self) -> &Path {
        self.dir.path()
    }

    pub fn out_dir(&self) -> PathBuf {
        self.project().join("dist")
    }

    pub fn add_resource(&mut self, name: &str, contents: &str) {
        std::fs::write(self.project().join("build").join(name), contents).unwrap();
        self.resources.insert(name.to_string());
    }

    pub fn settings(&self, bundle: BundleSettings) -> Arc<Settings> {
        self.settings_with(bundle, false)
    }

    pub fn settings_with(&self, bundle: BundleSettings, dry_run: bool) -> Arc<Settings> {
        Arc::new(
            SettingsBuilder::new()
                .project_dir(self.project())
                .app_info(AppInfo {
                    id: "com.example.demo".into(),
                    name: "demo".into(),
                    product_name: "Demo App".into(),
                    version: "1.0.0".into(),
                    description: "Demo application".into(),
                    company_name: "Example Inc.".into(),
                    ..Default::default()
                })
                .bundle_settings(bundle)
                .dry_run(dry_run)
                .build()
                .unwrap(),
        )
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators {
            archiver: self.archiver.clone(),
            signer: self.signer.clone(),
            resources: Arc::new(StaticResources(self.resources.clone())),
            artifacts: self.sink.clone(),
            temp_files: Arc::new(DirTempFiles(self.project().join("tmp"))),
            processes: self.runner.clone(),
        }
    }

    pub fn toolset() -> NsisToolset {
        NsisToolset {
            makensis: PathBuf::from(MAKENSIS),
            nsis_dir: PathBuf::from("/opt/nsis"),
        }
    }

    pub fn app_dir(&self, name: &str) -> PathBuf {
        let dir = self.project().join(name);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}

/// Value of `-D<name>=...` in an argument list.
pub fn define<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    let prefix = format!("-D{name}=");
    args.iter().find_map(|a| a.strip_prefix(prefix.as_str()))
}

/// Whether `-D<name>` appears with or without a value.
pub fn has_define(args: &[String], name: &str) -> bool {
    let flag = format!("-D{name}");
    args.iter()
        .any(|a| *a == flag || a.starts_with(&format!("{flag}=")))
}
