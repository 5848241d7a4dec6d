//! Serving the gateway.

use apidoc_config::Config;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::error::GatewayResult;
use crate::routes::build_router;
use crate::state::AppState;

/// Build the router from configuration. Fails fast on misconfigured routes,
/// an unusable secret or an invalid client origin.
///
/// # Errors
///
/// Returns a [`crate::GatewayError`] describing the first problem found.
pub fn app_from_config(config: &Config) -> GatewayResult<Router> {
    let state = AppState::from_config(config)?;
    build_router(state, &config.client.origin)
}

/// Bind to the configured address and serve until Ctrl-C.
///
/// # Errors
///
/// Returns a [`crate::GatewayError`] if the app cannot be built, the address
/// cannot be bound or the server fails.
pub async fn serve(config: &Config) -> GatewayResult<()> {
    let app = app_from_config(config)?;
    let listener = TcpListener::bind(config.server.bind_address()).await?;
    serve_on(listener, app).await
}

/// Serve `app` on an already bound listener until Ctrl-C.
///
/// # Errors
///
/// Returns [`crate::GatewayError::Io`] if the server fails.
pub async fn serve_on(listener: TcpListener, app: Router) -> GatewayResult<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "Gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!(error = %e, "Failed to listen for shutdown signal"),
    }
}
