//! Process runtime for agent-shim.
//!
//! Implements the [`CommandRunner`](agent_shim_core::CommandRunner) port by
//! spawning the resolved command (through the shell or as an argv), capturing
//! its output, and enforcing the optional deadline.
#![deny(unsafe_code)]

pub mod command;
mod runner;
mod shutdown;

// Re-export the main CommandRunner implementation
pub use runner::ProcessCommandRunner;
