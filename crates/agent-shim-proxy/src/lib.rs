//! OpenAI-compatible HTTP facade for agent-shim.
//!
//! Exposes `/v1/chat/completions` and `/v1/models` on top of a
//! [`CompletionService`](agent_shim_core::CompletionService). Process
//! spawning lives in `agent-shim-runtime`; this crate only maps HTTP to the
//! service and back.
#![deny(unsafe_code)]

pub mod models;
pub mod server;

pub use server::{ProxyState, create_router, serve};
