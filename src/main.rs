//! kova-preview - Lead funnel preview generation service
//!
//! Accepts business intake submissions, generates AI website preview
//! concepts in the background, and serves the preview records the funnel
//! pages poll.

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use kova_preview::config::Config;
use kova_preview::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting kova-preview (lead funnel preview service)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Load configuration before anything else; a process without its API
    // keys must never accept a submission.
    let config = Config::from_env()?;

    // Ensure the blob storage root exists
    std::fs::create_dir_all(&config.storage_root)?;

    // Initialize database connection pool
    let db_pool = kova_preview::db::init_database_pool(&config.database_path).await?;
    info!("Database connection established");

    let bind_addr = config.bind_addr;
    let state = AppState::new(db_pool, config)?;

    // Build router
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
