//! Database access for kova-preview
//!
//! Two tables: `business_leads` (keyed by id) and `generated_previews`
//! (keyed by id, foreign-keyed to lead id; many previews per lead, newest
//! wins for display).

pub mod leads;
pub mod previews;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create tables if they don't exist
///
/// Public so tests can run against in-memory pools.
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS business_leads (
            id TEXT PRIMARY KEY,
            business_name TEXT NOT NULL,
            city TEXT NOT NULL,
            state TEXT NOT NULL,
            industries TEXT NOT NULL,
            core_services TEXT,
            business_description TEXT,
            notes TEXT,
            logo_url TEXT,
            status TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS generated_previews (
            id TEXT PRIMARY KEY,
            lead_id TEXT NOT NULL REFERENCES business_leads(id),
            status TEXT NOT NULL,
            brand_positioning TEXT,
            copy_direction TEXT,
            hero_headline TEXT,
            hero_subheadline TEXT,
            page_structure TEXT,
            feature_sections TEXT,
            hero_image_url TEXT,
            ai_notes TEXT,
            market_research TEXT,
            design_research TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (business_leads, generated_previews)");

    Ok(())
}
