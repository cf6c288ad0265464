//! Indicatrix API Server
//!
//! HTTP API server with health check, metrics, indicator series and
//! recalculation endpoints. This service is stateless and can be
//! horizontally scaled; the recalculation worker runs as a separate
//! process.

use dotenvy::dotenv;
use indicatrix::config;
use indicatrix::core::http::start_server;
use indicatrix::logging;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    // Initialize logging based on environment
    logging::init_logging();

    let port = config::get_port();
    let env = config::get_environment();
    info!("Starting Indicatrix API Server");
    info!(environment = %env, "Environment");
    info!(port = port, "HTTP Server: http://0.0.0.0:{}", port);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(port).await {
            error!(error = %e, "HTTP server error");
        }
    });

    // Graceful shutdown
    info!("API server started, waiting for shutdown signal...");
    info!("Note: recalculation worker runs as separate process. Use 'cargo run --bin worker' to start it.");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server...");
            info!("API server stopped");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
