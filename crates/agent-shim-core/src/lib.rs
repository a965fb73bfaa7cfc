//! Core of agent-shim: domain types, request translation, the
//! [`CommandRunner`](ports::CommandRunner) port and the completion service.
//!
//! This crate has no HTTP or process-spawning code. Adapters live in
//! `agent-shim-runtime` (processes) and `agent-shim-proxy` (HTTP).
#![deny(unsafe_code)]

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod settings;
pub mod translate;

// Re-export commonly used types for convenience
pub use domain::{
    ChatMessage, CommandTemplate, ExecMode, InvocationResult, MessageRole, Placeholder,
    ResolvedCommand,
};
pub use error::{FailureReason, ShimError};
pub use ports::CommandRunner;
pub use services::{CompletionOutput, CompletionService};
pub use settings::{
    DEFAULT_COMMAND_TEMPLATE, DEFAULT_HOST, DEFAULT_MODEL_NAME, DEFAULT_PORT, SettingsError,
    ShimSettings, validate_settings,
};
pub use translate::{PromptParts, QuoteMode, SystemPromptPolicy, TranslateOptions, translate};
