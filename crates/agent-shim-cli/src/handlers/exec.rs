//! Exec command handler.
//!
//! Runs the same translate → invoke pipeline as the HTTP server for a single
//! prompt, which is handy for trying out a template.

use agent_shim_core::{ChatMessage, ShimSettings, validate_settings};

use crate::error::CliError;
use crate::handlers::build_service;

/// Run the backend once and return its trimmed output.
pub async fn run_once(
    settings: &ShimSettings,
    prompt: &str,
    system: Option<&str>,
) -> Result<String, CliError> {
    validate_settings(settings)?;

    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system {
        messages.push(ChatMessage::system(system));
    }
    messages.push(ChatMessage::user(prompt));

    let output = build_service(settings).complete(&messages).await?;
    Ok(output.content)
}

/// Execute the exec command, printing the completion to stdout.
pub async fn execute(
    settings: &ShimSettings,
    prompt: &str,
    system: Option<&str>,
) -> Result<(), CliError> {
    let content = run_once(settings, prompt, system).await?;
    println!("{content}");
    Ok(())
}
