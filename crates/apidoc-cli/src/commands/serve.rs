//! Serve command: run the gateway in the foreground.

use std::path::Path;

use apidoc_gateway::config_bridge;
use apidoc_telemetry::setup_logging;
use tracing::info;

use super::load_config;
use crate::theme::Theme;

/// Load configuration, set up logging and serve until Ctrl-C.
pub(crate) async fn run(config_path: Option<&Path>, verbose: bool) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let mut log_config = config_bridge::log_config(&config.logging)?;
    if verbose {
        "debug".clone_into(&mut log_config.level);
    }
    if let Err(e) = setup_logging(&log_config) {
        eprintln!("{}", Theme::error(&format!("Failed to initialize logging: {e}")));
    }

    let app = apidoc_gateway::app_from_config(&config)?;
    let listener = tokio::net::TcpListener::bind(config.server.bind_address()).await?;
    println!(
        "{}",
        Theme::success(&format!("Serving on http://{}", listener.local_addr()?))
    );
    info!(store = %config.store.url, origin = %config.client.origin, "Gateway configured");

    apidoc_gateway::serve_on(listener, app).await?;
    Ok(())
}
