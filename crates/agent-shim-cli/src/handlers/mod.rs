//! Command handlers.
//!
//! Handlers are thin: they wire the runtime into the core service, call it,
//! and format output for the terminal.

pub mod check;
pub mod exec;
pub mod serve;

use std::sync::Arc;

use agent_shim_core::{CompletionService, ShimSettings};
use agent_shim_runtime::ProcessCommandRunner;

/// Compose the completion service with the process runner.
pub fn build_service(settings: &ShimSettings) -> Arc<CompletionService> {
    let runner = Arc::new(ProcessCommandRunner::from_settings(settings));
    Arc::new(CompletionService::from_settings(settings, runner))
}
