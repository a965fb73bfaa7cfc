//! Main CLI parser and top-level argument handling.
//!
//! Every setting is a global flag backed by an environment variable, so the
//! same configuration applies to `serve`, `exec` and `check`.

use std::time::Duration;

use clap::{Args, Parser};

use agent_shim_core::{
    CommandTemplate, DEFAULT_COMMAND_TEMPLATE, DEFAULT_HOST, DEFAULT_MODEL_NAME, DEFAULT_PORT,
    ExecMode, QuoteMode, ShimSettings, SystemPromptPolicy,
};

use crate::commands::Commands;

/// Command-line interface of the OpenAI-compatible command shim.
#[derive(Debug, Parser)]
#[command(name = "agent-shim")]
#[command(about = "Expose a command-line agent as an OpenAI-compatible chat API")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Flags and environment variables that make up [`ShimSettings`].
#[derive(Debug, Clone, Args)]
pub struct SettingsArgs {
    /// Host to bind the HTTP server to
    #[arg(long, env = "AGENT_SHIM_HOST", default_value = DEFAULT_HOST, global = true)]
    pub host: String,

    /// Port to bind the HTTP server to
    #[arg(long, env = "AGENT_SHIM_PORT", default_value_t = DEFAULT_PORT, global = true)]
    pub port: u16,

    /// Backend command line with {prompt}, {system} and/or {system_file}
    #[arg(
        long,
        env = "COMMAND_TEMPLATE",
        default_value = DEFAULT_COMMAND_TEMPLATE,
        global = true
    )]
    pub template: String,

    /// Model id reported by /v1/models
    #[arg(long = "model-name", env = "AGENT_SHIM_MODEL", default_value = DEFAULT_MODEL_NAME, global = true)]
    pub model_name: String,

    /// Kill the backend after this many seconds (fractions allowed)
    #[arg(
        long = "timeout-secs",
        env = "AGENT_SHIM_TIMEOUT_SECS",
        value_parser = parse_timeout_secs,
        global = true
    )]
    pub timeout: Option<Duration>,

    /// Which system message to use: first, last or concat
    #[arg(
        long = "system-policy",
        env = "AGENT_SHIM_SYSTEM_POLICY",
        default_value_t = SystemPromptPolicy::default(),
        global = true
    )]
    pub system_policy: SystemPromptPolicy,

    /// How values are substituted: raw or shell (POSIX quoted)
    #[arg(long, env = "AGENT_SHIM_QUOTE", default_value_t = QuoteMode::default(), global = true)]
    pub quote: QuoteMode,

    /// How the command line is run: shell or direct (argv, no shell)
    #[arg(long, env = "AGENT_SHIM_EXEC", default_value_t = ExecMode::default(), global = true)]
    pub exec: ExecMode,

    /// Prepend the system prompt to {prompt} when the template has no system placeholder
    #[arg(long = "fold-system", env = "AGENT_SHIM_FOLD_SYSTEM", global = true)]
    pub fold_system: bool,

    /// Log every resolved command line at info level
    #[arg(long = "log-commands", env = "AGENT_SHIM_LOG_COMMANDS", global = true)]
    pub log_commands: bool,
}

impl SettingsArgs {
    /// Build the immutable settings value.
    pub fn to_settings(&self) -> ShimSettings {
        ShimSettings {
            host: self.host.clone(),
            port: self.port,
            model_name: self.model_name.clone(),
            template: CommandTemplate::new(self.template.clone()),
            timeout: self.timeout,
            system_policy: self.system_policy,
            quote_mode: self.quote,
            exec_mode: self.exec,
            fold_system_into_prompt: self.fold_system,
            log_commands: self.log_commands,
        }
    }
}

fn parse_timeout_secs(value: &str) -> Result<Duration, String> {
    let secs: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("'{value}' is not a number of seconds: {e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid timeout '{value}': {e}"))
}
