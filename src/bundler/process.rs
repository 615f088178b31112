//! Child process execution on tokio.

use crate::bundler::{
    collaborators::{ProcessOutput, ProcessRequest, ProcessRunner},
    error::{Error, Result},
};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::{io::AsyncWriteExt, process::Command};

/// [`ProcessRunner`] spawning real child processes.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, request: ProcessRequest) -> Result<ProcessOutput> {
        let command_name = request.display_name();
        log::debug!(
            "Running {} {}",
            request.program.display(),
            request.args.join(" ")
        );

        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args)
            .envs(request.env.iter().map(|(k, v)| (k, v)))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(if request.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });
        if let Some(cwd) = &request.cwd {
            cmd.current_dir(cwd);
        }

        let spawn_error = |error: std::io::Error| Error::CommandFailed {
            command: command_name.clone(),
            error,
        };

        let mut child = cmd.spawn().map_err(spawn_error)?;

        // Feed stdin concurrently so a chatty child cannot deadlock on a full pipe.
        let writer = match (child.stdin.take(), request.stdin) {
            (Some(mut stdin), Some(input)) => Some(tokio::spawn(async move {
                let result = stdin.write_all(input.as_bytes()).await;
                drop(stdin);
                result
            })),
            _ => None,
        };

        let output = child.wait_with_output().await.map_err(spawn_error)?;

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                // The child may exit without reading all of its input.
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => return Err(spawn_error(e)),
                Err(e) => {
                    return Err(Error::GenericError(format!(
                        "stdin writer for {command_name} panicked: {e}"
                    )));
                }
            }
        }

        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
