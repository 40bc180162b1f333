//! kova-preview library interface
//!
//! Lead-capture funnel backend for the Kova Solutions marketing site: stores
//! submitted business leads, generates AI website preview concepts in the
//! background, and serves the records browser clients poll for completion.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod poller;
pub mod services;

pub use crate::error::{ApiError, ApiResult, Error, PipelineError, Result};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::services::PreviewPipeline;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Process configuration
    pub config: Arc<Config>,
    /// Preview generation pipeline
    pub pipeline: Arc<PreviewPipeline>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Build state with a pipeline derived from configuration
    pub fn new(db: SqlitePool, config: Config) -> Result<Self> {
        let pipeline = PreviewPipeline::from_config(db.clone(), &config)?;
        Ok(Self {
            db,
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            startup_time: Utc::now(),
        })
    }

    /// Build state around an externally constructed pipeline (tests)
    pub fn with_pipeline(db: SqlitePool, config: Config, pipeline: PreviewPipeline) -> Self {
        Self {
            db,
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let storage_root = state.config.storage_root.clone();

    Router::new()
        .merge(api::lead_routes())
        .merge(api::preview_routes())
        .merge(api::health_routes())
        .nest_service("/storage", ServeDir::new(storage_root))
        .with_state(state)
}
