//! Core domain types.
//!
//! These types represent the pure domain model, independent of the HTTP
//! adapter and of how processes are spawned.
//!
//! # Structure
//!
//! - `chat` - Conversation messages and roles
//! - `template` - The configured command template and its placeholders
//! - `invocation` - Resolved commands and process outcomes

pub mod chat;
pub mod invocation;
pub mod template;

pub use chat::{ChatMessage, MessageRole};
pub use invocation::{ExecMode, InvocationResult, ResolvedCommand};
pub use template::{CommandTemplate, Placeholder};
