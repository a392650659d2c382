//! Error types for wkpdf library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::cancel::CancelReason;

/// Result type alias for wkpdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while building or running a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The rendering executable could not be located.
    #[error("{0} not found")]
    ExecutableNotFound(String),

    /// The same global flag was produced more than once.
    #[error("duplicate argument: {0}")]
    DuplicateArgument(String),

    /// A page could not produce its content.
    #[error("content read failure: {0}")]
    ContentRead(#[from] ContentError),

    /// The rendering executable could not be started.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        /// Program that was being started
        program: String,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// The rendering executable exited unsuccessfully.
    #[error("{}", describe_failure(.code, .stderr))]
    Process {
        /// Exit code, if the process exited normally
        code: Option<i32>,
        /// Captured standard error, absent when the caller redirected it
        stderr: Option<String>,
    },

    /// The run was cancelled by the caller.
    #[error("{0}")]
    Cancelled(CancelReason),

    /// Malformed or structurally invalid interchange data.
    #[error("interchange format error: {0}")]
    Interchange(String),

    /// A generation request failed validation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Interchange(err.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::Interchange(format!("invalid base64 page data: {}", err))
    }
}

fn describe_failure(code: &Option<i32>, stderr: &Option<String>) -> String {
    let exit = match code {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    };
    match stderr.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => format!("{}\n{}", text, exit),
        _ => exit,
    }
}

/// Failure to read or transform a page's source.
///
/// Cloneable so a page can hand the same failure back on every access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to load {}: {reason}", path.display())]
pub struct ContentError {
    /// Source artifact that failed
    pub path: PathBuf,
    /// Human-readable cause
    pub reason: String,
}

impl ContentError {
    /// Create a new content error.
    pub fn new(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
