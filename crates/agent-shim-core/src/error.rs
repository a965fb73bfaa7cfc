//! Error taxonomy for the translate → invoke pipeline.
//!
//! Adapters map these to their own representations (HTTP status codes,
//! CLI exit codes). None of them is retried.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Why a process that did start is considered failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Exited with a non-zero code.
    ExitCode(i32),
    /// Terminated by a signal before reporting an exit code.
    Signal,
    /// Killed after exceeding the configured deadline.
    TimedOut(Duration),
}

impl FailureReason {
    /// Stable machine-readable discriminant.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ExitCode(_) | Self::Signal => "exit_status",
            Self::TimedOut(_) => "timed_out",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExitCode(code) => write!(f, "exit code {code}"),
            Self::Signal => f.write_str("terminated by signal"),
            Self::TimedOut(after) => write!(f, "timed out after {:.1}s", after.as_secs_f64()),
        }
    }
}

/// Errors produced while serving one completion.
#[derive(Debug, Error)]
pub enum ShimError {
    /// The template (or another setting) cannot produce a command.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The backend program could not be started.
    #[error("Failed to start command: {message}{}", stderr_suffix(.stderr))]
    Invocation { message: String, stderr: String },

    /// The backend program ran and failed.
    #[error("Command failed ({reason}){}", stderr_suffix(.stderr))]
    CommandFailed {
        reason: FailureReason,
        stderr: String,
    },

    /// The temp file for `{system_file}` could not be written.
    #[error("Failed to prepare system prompt file: {0}")]
    TempFile(#[source] std::io::Error),
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

impl ShimError {
    /// OpenAI-style error `type` for this failure class.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration_error",
            Self::Invocation { .. } => "invocation_error",
            Self::CommandFailed { .. } => "command_failed",
            Self::TempFile(_) => "internal_error",
        }
    }

    /// Optional finer-grained code.
    #[must_use]
    pub const fn code(&self) -> Option<&'static str> {
        match self {
            Self::CommandFailed { reason, .. } => Some(reason.code()),
            _ => None,
        }
    }

    /// Captured standard error, when the failure has one.
    #[must_use]
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Invocation { stderr, .. } | Self::CommandFailed { stderr, .. } => {
                Some(stderr.as_str())
            }
            _ => None,
        }
    }
}
