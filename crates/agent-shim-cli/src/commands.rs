//! Subcommands of the `agent-shim` binary.

use clap::Subcommand;

/// Available commands.
///
/// Running the binary without a subcommand is the same as `serve`.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the OpenAI-compatible HTTP server until Ctrl+C
    Serve,

    /// Run the backend once and print the completion
    Exec {
        /// User prompt substituted into {prompt}
        prompt: String,
        /// System prompt substituted into {system} and {system_file}
        #[arg(short, long)]
        system: Option<String>,
    },

    /// Validate the configuration and show which placeholders the template uses
    Check,
}
