use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, warn};

/// Domain-specific errors for the feedback bridge and dialog
#[derive(Error, Debug)]
pub enum FeedbackError {
    /// The dialog process could not be started at all
    #[error("Failed to launch feedback UI '{program}': {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The dialog process ran but exited unsuccessfully.
    /// `code` is `None` when the process was terminated by a signal.
    #[error("Failed to launch feedback UI: {}", exit_code_label(*.code))]
    Launch { code: Option<i32> },

    /// The dialog exited cleanly but its result file is missing or unreadable
    #[error("Failed to read feedback result from '{path}': {source}")]
    ResultRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The result file exists but does not hold a valid result record
    #[error("Failed to parse feedback result from '{path}': {source}")]
    ResultParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The dialog could not write its result record
    #[error("Failed to write feedback result to '{path}': {source}")]
    ResultWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to allocate temporary result file: {0}")]
    TempFile(#[source] std::io::Error),

    #[error("Feedback request was cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),
}

fn exit_code_label(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

impl FeedbackError {
    /// True for errors that mean the dialog never produced a usable exit
    /// (spawn failure or non-zero status).
    pub fn is_launch_failure(&self) -> bool {
        matches!(self, Self::Spawn { .. } | Self::Launch { .. })
    }

    /// True for errors that mean the dialog exited cleanly but broke the
    /// result-file contract.
    pub fn is_result_failure(&self) -> bool {
        matches!(self, Self::ResultRead { .. } | Self::ResultParse { .. })
    }

    /// The dialog's exit code, when the failure carries one
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Launch { code } => *code,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FeedbackError>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the caller doesn't need to know.
///
/// # Examples
///
/// ```ignore
/// use interactive_feedback::error::ResultExt;
///
/// // Best-effort cleanup: log and continue
/// std::fs::remove_file(&path).warn_on_err();
/// ```
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}
