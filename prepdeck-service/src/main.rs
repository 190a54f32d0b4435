use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

mod api;
mod chunker;
mod config;
mod db;
mod error;
mod gemini;
mod generation;
mod service;

use crate::config::StaticConfig;
use crate::db::Database;
use crate::service::PrepdeckService;

// Re-export config crate types to avoid namespace collision
use ::config::{Config as ConfigBuilder, Environment, File};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    info!(
        "Starting Prepdeck service v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration from an optional file plus environment overrides
    let mut static_config: StaticConfig = ConfigBuilder::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(
            Environment::with_prefix("PREPDECK")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    // The Gemini key is conventionally passed as a bare env var
    if static_config.gemini.api_key.is_empty()
        && let Ok(key) = std::env::var("GEMINI_API_KEY")
    {
        static_config.gemini.api_key = key;
    }

    info!(
        host = %static_config.server.host,
        port = static_config.server.port,
        gemini_configured = static_config.gemini.is_configured(),
        "Configuration loaded"
    );

    // Ensure data directory exists
    std::fs::create_dir_all(&static_config.storage.data_dir)?;

    // Initialize database
    let db_path = static_config.storage.data_dir.join("prepdeck.db");
    let db = Arc::new(Database::open(&db_path)?);
    info!(path = %db_path.display(), "Database initialized");

    // Initialize the service
    let static_config = Arc::new(static_config);
    let service = Arc::new(PrepdeckService::new(db, static_config.clone()));

    // Build the router
    let app = api::router(service);

    // Start the server
    let addr = format!(
        "{}:{}",
        static_config.server.host, static_config.server.port
    );
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let format = fmt::format()
        .with_target(true)
        .with_thread_ids(true)
        .compact();

    // Use RUST_LOG if set, otherwise default to info level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("prepdeck_service=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().event_format(format))
        .with(filter)
        .init();
}
