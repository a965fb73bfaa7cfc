//! Command runner trait definition.
//!
//! This port defines how a resolved command is executed. Implementations own
//! every process detail (shell selection, pipes, deadlines).

use async_trait::async_trait;

use crate::domain::{InvocationResult, ResolvedCommand};
use crate::error::ShimError;

/// Executes a resolved command to completion.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command and wait for it to exit.
    ///
    /// Returns the raw outcome for any process that started and exited on
    /// its own, including non-zero exits. Fails with
    /// [`ShimError::Invocation`] when the process cannot be started and with
    /// [`ShimError::CommandFailed`] when it had to be killed.
    async fn run(&self, command: &ResolvedCommand) -> Result<InvocationResult, ShimError>;
}
