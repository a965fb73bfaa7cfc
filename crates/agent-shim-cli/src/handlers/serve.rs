//! Serve command handler.
//!
//! Binds the listener, builds the router state and runs the server until
//! Ctrl+C.

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use agent_shim_core::{ShimSettings, validate_settings};
use agent_shim_proxy::ProxyState;

use crate::error::CliError;
use crate::handlers::build_service;

/// Execute the serve command.
pub async fn execute(settings: &ShimSettings) -> Result<()> {
    validate_settings(settings).map_err(CliError::from)?;

    let address = settings.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| CliError::Io(format!("failed to bind {address}: {e}")))?;

    info!(
        template = %settings.template,
        model = %settings.model_name,
        exec_mode = %settings.exec_mode,
        timeout = ?settings.timeout,
        "Starting agent-shim"
    );

    let state = ProxyState::new(build_service(settings), settings.model_name.as_str());

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => warn!("Failed to listen for Ctrl+C: {e}"),
        }
        shutdown.cancel();
    });

    agent_shim_proxy::serve(listener, state, cancel)
        .await
        .context("HTTP server stopped with an error")
}
