//! Error types for bundler operations.
//!
//! Every failure carries enough context to tell the user which file, command
//! or build step produced it. [`ErrorExt`] and [`Context`] attach that context
//! at the call site, and [`bail!`](crate::bail) returns early with a formatted
//! [`Error::GenericError`].

use crate::bundler::platform::windows::nsis::BuildState;
use std::{
    fmt::Display,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Result type alias for bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the bundler core.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Free-form error message.
    #[error("{0}")]
    GenericError(String),

    /// Error with a human readable context prefix.
    #[error("{0}: {1}")]
    Context(String, #[source] Box<dyn std::error::Error + Send + Sync>),

    /// Raw I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// I/O error on a specific path.
    #[error("{context} ({}): {error}", .path.display())]
    Fs {
        /// What was being attempted.
        context: &'static str,
        /// Path the operation touched.
        path: PathBuf,
        /// Underlying error.
        #[source]
        error: std::io::Error,
    },

    /// An external command could not be spawned.
    #[error("failed to run `{command}`: {error}")]
    CommandFailed {
        /// Program name.
        command: String,
        /// Spawn error.
        #[source]
        error: std::io::Error,
    },

    /// An external command ran and exited unsuccessfully.
    #[error("`{command}` exited with code {}{}", .code.map_or_else(|| "<signal>".to_string(), |c| c.to_string()), format_output(.output))]
    ProcessFailed {
        /// Program name.
        command: String,
        /// Exit code, `None` when terminated by a signal.
        code: Option<i32>,
        /// Captured stderr (or stdout when stderr was empty).
        output: String,
    },

    /// Unsupported architecture.
    #[error("architecture error: {0}")]
    ArchError(String),

    /// No Windows icon could be located.
    #[error("no Windows icon (.ico) configured and none found in the build resources directory")]
    IconPathError,

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The application version is not a valid semantic version.
    #[error("invalid version `{version}`: {source}")]
    InvalidVersion {
        /// Version string as configured.
        version: String,
        /// Parse error.
        #[source]
        source: semver::Error,
    },

    /// Signing a binary failed.
    #[error("failed to sign {}: {reason}", .path.display())]
    Sign {
        /// Binary being signed.
        path: PathBuf,
        /// Reason reported by the signing tool.
        reason: String,
    },

    /// A failure attributed to a specific installer build step.
    #[error("{step} failed: {source}")]
    Step {
        /// State the installer builder was in.
        step: BuildState,
        /// Underlying error.
        #[source]
        source: Box<Error>,
    },
}

fn format_output(output: &str) -> String {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(":\n{trimmed}")
    }
}

impl Error {
    /// Wraps this error with the build step it happened in.
    ///
    /// Already attributed errors keep their original step.
    pub fn in_step(self, step: BuildState) -> Self {
        match self {
            Error::Step { .. } => self,
            other => Error::Step {
                step,
                source: Box::new(other),
            },
        }
    }

    /// Build step this error is attributed to, if any.
    pub fn step(&self) -> Option<BuildState> {
        match self {
            Error::Step { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// True for errors detected before any external process was started.
    pub fn is_configuration(&self) -> bool {
        match self {
            Error::Config(_) | Error::InvalidVersion { .. } | Error::IconPathError => true,
            Error::Step { source, .. } => source.is_configuration(),
            _ => false,
        }
    }
}

/// Attach a path and a description to I/O errors.
pub trait ErrorExt<T> {
    /// Converts an I/O error into [`Error::Fs`].
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

/// Attach a message to any error or to a missing value.
pub trait Context<T> {
    /// Wraps the error (or `None`) with `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Lazily computed variant of [`Context::context`].
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> Context<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Returns early with a formatted [`Error::GenericError`].
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::Error::GenericError(format!($msg)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
