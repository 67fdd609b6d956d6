use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shayai_api::api;
use shayai_api::config::Config;
use shayai_api::db::Storage;
use shayai_api::handlers::AppState;

/// Main entry point for the application.
///
/// This function initializes logging, loads configuration, starts the single
/// storage connection attempt in the background, and serves HTTP. The server
/// binds before storage is ready; data endpoints answer 503 until it is.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Ok if the server runs successfully, or an error if initialization fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shayai_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Connect to storage exactly once; failures leave the service in degraded mode
    let storage = Arc::new(Storage::new());
    {
        let storage = Arc::clone(&storage);
        let config = config.clone();
        tokio::spawn(async move {
            let status = storage.connect(&config).await;
            tracing::info!("Storage status: {}", status);
        });
    }

    let app_state = Arc::new(AppState { storage });
    let app = api::router(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on port {}", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
