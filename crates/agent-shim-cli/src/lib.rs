//! Command-line adapter for agent-shim.
//!
//! `main.rs` is the composition root; this library holds the argument
//! definitions, error mapping and command handlers so they can be tested.
#![deny(unsafe_code)]

pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

// Re-export primary types for convenient access
pub use commands::Commands;
pub use error::CliError;
pub use parser::{Cli, SettingsArgs};
