//! makensis execution.
//!
//! Compiles a script into an installer executable. The script is streamed on
//! stdin so it never has to be written to disk.

use super::{
    defines::{CommandSet, DefineSet},
    toolset::NsisToolset,
};
use crate::bundler::{
    collaborators::{ProcessRequest, ProcessRunner},
    error::Result,
};
use std::path::Path;

/// Build the makensis argument list.
///
/// `-WX` makes warnings fatal, then one flag per define and per command
/// entry, then `-` to read the script from stdin.
pub fn compiler_args(defines: &DefineSet, commands: &CommandSet) -> Vec<String> {
    let mut args = vec!["-WX".to_string()];
    args.extend(defines.to_args());
    args.extend(commands.to_args());
    args.push("-".to_string());
    args
}

/// One makensis run.
pub struct CompilerInvocation<'a> {
    toolset: &'a NsisToolset,
    templates_dir: &'a Path,
}

impl<'a> CompilerInvocation<'a> {
    /// Creates an invocation that runs in `templates_dir`.
    pub fn new(toolset: &'a NsisToolset, templates_dir: &'a Path) -> Self {
        Self {
            toolset,
            templates_dir,
        }
    }

    /// The process request for compiling `script`.
    pub fn request(&self, defines: &DefineSet, commands: &CommandSet, script: String) -> ProcessRequest {
        ProcessRequest::new(&self.toolset.makensis)
            .args(compiler_args(defines, commands))
            .env("NSISDIR", self.toolset.nsis_dir.as_os_str())
            .current_dir(self.templates_dir)
            .stdin(script)
    }

    /// Runs makensis; any non-zero exit is an error.
    pub async fn run(
        &self,
        runner: &dyn ProcessRunner,
        defines: &DefineSet,
        commands: &CommandSet,
        script: String,
    ) -> Result<()> {
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("NSIS script:\n\n{script}\n---\nEnd of NSIS script.");
        }

        let request = self.request(defines, commands, script);
        let command = request.display_name();
        let output = runner.run(request).await?.into_result(&command)?;

        for line in output.stdout.lines().filter(|l| l.contains("warning")) {
            log::warn!("makensis: {line}");
        }
        Ok(())
    }
}
