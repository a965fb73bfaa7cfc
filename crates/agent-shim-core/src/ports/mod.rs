//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! The only external system the shim talks to is the backend program.

pub mod command_runner;

pub use command_runner::CommandRunner;
