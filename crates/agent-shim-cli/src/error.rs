//! CLI-specific error types and mappings.
//!
//! Maps [`ShimError`] and [`SettingsError`] to exit codes and user-facing
//! messages.

use agent_shim_core::{SettingsError, ShimError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (bind failure, temp file, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// The backend could not be started.
    #[error("Process error: {0}")]
    Process(String),

    /// The backend ran and failed.
    #[error("{0}")]
    Backend(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error (backend failure, server stopped with an error)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Backend(_) => 1,
            Self::Process(_) => 71, // EX_OSERR
            Self::Io(_) => 74,      // EX_IOERR
            Self::Config(_) => 78,  // EX_CONFIG
        }
    }
}

/// Exit code for an error that reached `main`.
///
/// Errors that are not a [`CliError`] anywhere in their chain exit with 1.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<CliError>())
        .map_or(1, CliError::exit_code)
}

impl From<ShimError> for CliError {
    fn from(err: ShimError) -> Self {
        match err {
            ShimError::Configuration(_) => Self::Config(err.to_string()),
            ShimError::Invocation { .. } => Self::Process(err.to_string()),
            ShimError::CommandFailed { .. } => Self::Backend(err.to_string()),
            ShimError::TempFile(_) => Self::Io(err.to_string()),
        }
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_shim_core::FailureReason;

    #[test]
    fn test_shim_errors_map_to_exit_codes() {
        let config: CliError = ShimError::Configuration("no placeholder".to_string()).into();
        assert_eq!(config.exit_code(), 78);

        let invocation: CliError = ShimError::Invocation {
            message: "`nope`: not found".to_string(),
            stderr: String::new(),
        }
        .into();
        assert_eq!(invocation.exit_code(), 71);

        let failed: CliError = ShimError::CommandFailed {
            reason: FailureReason::ExitCode(3),
            stderr: "boom".to_string(),
        }
        .into();
        assert_eq!(failed.exit_code(), 1);
        assert!(failed.to_string().contains("boom"));
    }

    #[test]
    fn test_exit_code_for_anyhow_errors() {
        let config = anyhow::Error::new(CliError::Config("bad template".to_string()))
            .context("while starting the server");
        assert_eq!(exit_code_for(&config), 78);

        let other = anyhow::anyhow!("HTTP server stopped");
        assert_eq!(exit_code_for(&other), 1);
    }

    #[test]
    fn test_settings_error_is_config() {
        let err: CliError = SettingsError::EmptyModelName.into();
        assert_eq!(err.exit_code(), 78);
        assert!(err.to_string().contains("Model name"));
    }
}
