//! # KPortal Server
//!
//! Entry point for the portal backend. Initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Database connection pool and migrations
//! - Redis client
//! - HTTP/WebSocket server

use anyhow::Result;
use tracing::info;

use kportal_server::config::Settings;
use kportal_server::presentation::http::handlers::health;
use kportal_server::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    kportal_server::telemetry::init_tracing();
    health::init_server_start();

    info!("Starting KPortal Server...");

    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = %settings.server.port,
        environment = %settings.environment,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;

    info!("Server ready to accept connections");
    application.run_until_stopped().await?;

    Ok(())
}
