//! Authenticode signing of Windows binaries.
//!
//! Signs with `osslsigncode` when a certificate is configured, or runs a
//! user supplied `sign_command`. Unconfigured signing is a no-op so unsigned
//! development builds work out of the box.

use crate::bundler::{
    collaborators::{ProcessRequest, ProcessRunner, Signer},
    error::{Error, ErrorExt, Result},
    settings::WindowsSettings,
};
use async_trait::async_trait;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

/// Placeholder replaced with the binary path in `sign_command`.
const PATH_PLACEHOLDER: &str = "%1";

/// Check if signing is configured.
pub fn should_sign(settings: &WindowsSettings) -> bool {
    settings.sign_command.is_some() || settings.cert_path.is_some()
}

/// [`Signer`] backed by osslsigncode or a custom command.
pub struct AuthenticodeSigner {
    settings: WindowsSettings,
    runner: Arc<dyn ProcessRunner>,
}

impl AuthenticodeSigner {
    /// Creates a signer running its tools through `runner`.
    pub fn new(settings: WindowsSettings, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { settings, runner }
    }

    async fn run(&self, request: ProcessRequest, path: &Path) -> Result<()> {
        let output = self.runner.run(request).await?;
        if output.is_success() {
            return Ok(());
        }
        let reason = if output.stderr.trim().is_empty() {
            output.stdout
        } else {
            output.stderr
        };
        Err(Error::Sign {
            path: path.to_path_buf(),
            reason: reason.trim().to_string(),
        })
    }
}

#[async_trait]
impl Signer for AuthenticodeSigner {
    async fn sign(&self, path: &Path) -> Result<()> {
        if let Some(command) = &self.settings.sign_command {
            log::info!("Signing {} with custom command", path.display());
            let request = custom_command_request(command, path)?;
            return self.run(request, path).await;
        }

        let Some(cert) = &self.settings.cert_path else {
            log::debug!("Signing not configured, leaving {} unsigned", path.display());
            return Ok(());
        };

        log::info!("Signing {}", path.display());
        let signed = signed_output_path(path);
        let request = osslsigncode_request(&self.settings, cert, path, &signed);
        self.run(request, path).await?;

        tokio::fs::rename(&signed, path)
            .await
            .fs_context("replacing binary with signed copy", path)?;
        Ok(())
    }
}

/// Splits `sign_command` into a request, substituting `%1` with `path`.
fn custom_command_request(command: &str, path: &Path) -> Result<ProcessRequest> {
    let path = path.display().to_string();
    let mut parts = command
        .split_whitespace()
        .map(|part| part.replace(PATH_PLACEHOLDER, &path));
    let program = parts
        .next()
        .ok_or_else(|| Error::Config("sign_command is empty".into()))?;
    Ok(ProcessRequest::new(program).args(parts))
}

fn osslsigncode_request(
    settings: &WindowsSettings,
    cert: &Path,
    input: &Path,
    output: &Path,
) -> ProcessRequest {
    let is_pkcs12 = cert
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pfx") || ext.eq_ignore_ascii_case("p12"));

    let mut args = vec!["sign".to_string()];
    if is_pkcs12 {
        args.extend(["-pkcs12".to_string(), cert.display().to_string()]);
    } else {
        args.extend(["-certs".to_string(), cert.display().to_string()]);
        if let Some(key) = &settings.key_path {
            args.extend(["-key".to_string(), key.display().to_string()]);
        }
    }
    if let Some(password) = &settings.password {
        args.extend(["-pass".to_string(), password.clone()]);
    }
    if let Some(url) = &settings.timestamp_url {
        args.extend(["-t".to_string(), url.clone()]);
    }
    args.extend([
        "-in".to_string(),
        input.display().to_string(),
        "-out".to_string(),
        output.display().to_string(),
    ]);

    ProcessRequest::new("osslsigncode").args(args)
}

fn signed_output_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".signed");
    PathBuf::from(name)
}
