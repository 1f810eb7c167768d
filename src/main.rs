//! HTTP server for the Paychex recap engine.

use std::env;

use paychex_recap::api::{AppState, create_router};
use paychex_recap::config::ConfigLoader;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_DIR: &str = "./config/paychex";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_dir = env::var("RECAP_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let config = ConfigLoader::load(&config_dir)?;
    let bind_address = config.server().bind_address.clone();

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(
        config_dir = %config_dir,
        bind_address = %bind_address,
        "Recap server listening"
    );

    axum::serve(listener, create_router(AppState::new(config))).await?;
    Ok(())
}
