mod app;
mod config;
mod db;
mod error;
mod gateway;
mod query;
mod site;

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::db::Store;
use crate::gateway::GeminiGateway;
use crate::query::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ask_ai_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = config::Config::from_env()?;
    tracing::info!(
        "Starting AI query server with model {} at {}",
        query::MODEL,
        config.gemini_api_base
    );

    if config.gemini_api_key.is_none() {
        tracing::error!("GEMINI_API_KEY not found; questions will fail until it is set");
    }

    // Make sure the database file's directory exists before the first connection
    let db_path = config
        .database_url
        .strip_prefix("sqlite:")
        .unwrap_or(&config.database_url);
    if let Some(parent) = std::path::Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let store = Store::new(&config.database_url)?;
    store.ensure_schema().await?;
    tracing::info!("Database initialized at {}", config.database_url);

    let gateway = GeminiGateway::new(
        gateway::create_client(),
        config.gemini_api_base.clone(),
        config.gemini_api_key.clone(),
    );

    let state = Arc::new(AppState {
        store,
        gateway: Arc::new(gateway),
    });

    let app = app::router(state);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
