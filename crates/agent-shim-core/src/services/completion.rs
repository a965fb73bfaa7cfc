//! Completion service - translate, invoke and classify one request.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::domain::{ChatMessage, CommandTemplate, InvocationResult};
use crate::error::{FailureReason, ShimError};
use crate::ports::CommandRunner;
use crate::settings::ShimSettings;
use crate::translate::{PromptParts, TranslateOptions, translate};

/// Successful completion produced by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutput {
    /// Trimmed standard output of the backend.
    pub content: String,
    /// The prompt text that was sent, for usage accounting.
    pub prompt: String,
    pub elapsed: Duration,
}

/// Service turning chat messages into backend output.
///
/// Holds only immutable configuration, so one instance is shared by every
/// request.
pub struct CompletionService {
    template: CommandTemplate,
    options: TranslateOptions,
    log_commands: bool,
    runner: Arc<dyn CommandRunner>,
}

impl CompletionService {
    /// Create a new completion service.
    pub fn new(
        template: CommandTemplate,
        options: TranslateOptions,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            template,
            options,
            log_commands: false,
            runner,
        }
    }

    /// Build the service from startup settings.
    pub fn from_settings(settings: &ShimSettings, runner: Arc<dyn CommandRunner>) -> Self {
        Self::new(settings.template.clone(), settings.translate_options(), runner)
            .with_command_logging(settings.log_commands)
    }

    /// Log every resolved command line at `info` instead of `debug`.
    #[must_use]
    pub const fn with_command_logging(mut self, enabled: bool) -> Self {
        self.log_commands = enabled;
        self
    }

    /// Run the backend for a conversation.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<CompletionOutput, ShimError> {
        let resolved = translate(&self.template, messages, self.options)?;

        if self.log_commands {
            info!(command = %resolved.command_line(), "Executing backend command");
        } else {
            debug!(command = %resolved.command_line(), "Executing backend command");
        }

        // `resolved` (and its temp file) lives until the runner is done with it.
        let result = self.runner.run(&resolved).await;
        drop(resolved);

        let result = result.inspect_err(|e| error!("Backend invocation failed: {e}"))?;
        let prompt = PromptParts::select(messages, self.options.system_policy).prompt;
        classify(result, prompt)
    }
}

/// Exit code 0 is success; everything else becomes `CommandFailed`.
fn classify(result: InvocationResult, prompt: String) -> Result<CompletionOutput, ShimError> {
    let reason = match result.exit_code {
        Some(0) => {
            debug!(
                elapsed = ?result.elapsed,
                stdout_len = result.stdout.len(),
                "Backend command succeeded"
            );
            return Ok(CompletionOutput {
                content: result.stdout.trim().to_string(),
                prompt,
                elapsed: result.elapsed,
            });
        }
        Some(code) => FailureReason::ExitCode(code),
        None => FailureReason::Signal,
    };

    error!(
        reason = %reason,
        stderr = %result.stderr.trim(),
        "Backend command failed"
    );
    Err(ShimError::CommandFailed {
        reason,
        stderr: result.stderr,
    })
}
