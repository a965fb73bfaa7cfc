//! Types describing one invocation of the backend command.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tempfile::TempPath;

/// How a resolved command line is turned into a process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecMode {
    /// Interpret the command line with the platform shell (`sh -c`, `cmd /C`).
    #[default]
    Shell,
    /// Split the command line into argv with POSIX word rules; no shell involved.
    Direct,
}

impl ExecMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shell => "shell",
            Self::Direct => "direct",
        }
    }
}

impl fmt::Display for ExecMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "shell" => Ok(Self::Shell),
            "direct" => Ok(Self::Direct),
            other => Err(format!("unknown exec mode '{other}' (expected shell or direct)")),
        }
    }
}

/// A command line ready to execute.
///
/// Owns the temp file backing `{system_file}`, if any. The file is removed
/// when this value is dropped, which happens after the invocation finished
/// no matter how it ended.
#[derive(Debug)]
pub struct ResolvedCommand {
    command_line: String,
    system_file: Option<TempPath>,
}

impl ResolvedCommand {
    pub fn new(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
            system_file: None,
        }
    }

    #[must_use]
    pub fn with_system_file(mut self, path: TempPath) -> Self {
        self.system_file = Some(path);
        self
    }

    /// The command line after substitution.
    #[must_use]
    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    /// Path of the system prompt file, while it exists.
    #[must_use]
    pub fn system_file_path(&self) -> Option<&Path> {
        self.system_file.as_deref()
    }
}

/// Raw outcome of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    /// Exit code, `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl InvocationResult {
    /// Build a result from captured bytes. Invalid UTF-8 is replaced, not rejected.
    #[must_use]
    pub fn from_bytes(
        exit_code: Option<i32>,
        stdout: &[u8],
        stderr: &[u8],
        elapsed: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout: String::from_utf8_lossy(stdout).into_owned(),
            stderr: String::from_utf8_lossy(stderr).into_owned(),
            elapsed,
        }
    }

    /// Exit code 0 is success regardless of what was written to stderr.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }
}
