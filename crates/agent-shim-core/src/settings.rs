//! Settings domain types and validation.
//!
//! Settings are built once at startup by the composition root and passed
//! explicitly to the services. Nothing reloads them.

use std::time::Duration;

use crate::domain::{CommandTemplate, ExecMode};
use crate::error::ShimError;
use crate::translate::{QuoteMode, SystemPromptPolicy, TranslateOptions};

/// Default bind host of the HTTP server.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port of the OpenAI-compatible server.
pub const DEFAULT_PORT: u16 = 8001;

/// Default model id advertised by `/v1/models`.
pub const DEFAULT_MODEL_NAME: &str = "cli-agent";

/// Default command template.
pub const DEFAULT_COMMAND_TEMPLATE: &str = "qwen {prompt}";

/// Process-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimSettings {
    /// Host the HTTP server binds to.
    pub host: String,
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Model id reported by `/v1/models`.
    pub model_name: String,
    /// Command line template for the backend.
    pub template: CommandTemplate,
    /// Deadline for one backend run. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub system_policy: SystemPromptPolicy,
    pub quote_mode: QuoteMode,
    pub exec_mode: ExecMode,
    /// Prepend the system prompt to `{prompt}` when the template has no system placeholder.
    pub fold_system_into_prompt: bool,
    /// Log resolved command lines at `info`.
    pub log_commands: bool,
}

impl Default for ShimSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            model_name: DEFAULT_MODEL_NAME.to_string(),
            template: CommandTemplate::new(DEFAULT_COMMAND_TEMPLATE),
            timeout: None,
            system_policy: SystemPromptPolicy::default(),
            quote_mode: QuoteMode::default(),
            exec_mode: ExecMode::default(),
            fold_system_into_prompt: false,
            log_commands: false,
        }
    }
}

impl ShimSettings {
    /// Settings with a specific template and defaults elsewhere.
    pub fn with_template(template: impl Into<CommandTemplate>) -> Self {
        Self {
            template: template.into(),
            ..Self::default()
        }
    }

    /// `host:port` string for binding.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Options for the translation step.
    #[must_use]
    pub const fn translate_options(&self) -> TranslateOptions {
        TranslateOptions {
            system_policy: self.system_policy,
            quote_mode: self.quote_mode,
            fold_system_into_prompt: self.fold_system_into_prompt,
        }
    }
}

/// Settings validation error.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error(transparent)]
    Template(#[from] ShimError),

    #[error("Model name cannot be empty")]
    EmptyModelName,

    #[error("Host cannot be empty")]
    EmptyHost,

    #[error("Timeout must be greater than zero")]
    ZeroTimeout,
}

/// Validate settings values.
pub fn validate_settings(settings: &ShimSettings) -> Result<(), SettingsError> {
    settings.template.validate()?;

    if settings.model_name.trim().is_empty() {
        return Err(SettingsError::EmptyModelName);
    }

    if settings.host.trim().is_empty() {
        return Err(SettingsError::EmptyHost);
    }

    if settings.timeout.is_some_and(|t| t.is_zero()) {
        return Err(SettingsError::ZeroTimeout);
    }

    Ok(())
}
