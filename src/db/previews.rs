//! Preview row operations
//!
//! The finalize path writes every content field and the `ready` status in a
//! single UPDATE, so a polling reader only ever sees an empty record or a
//! complete one.

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Preview, PreviewConcept, PreviewStatus};

/// Insert a fresh preview row in `generating` state
pub async fn create_preview(pool: &SqlitePool, lead_id: Uuid) -> Result<Preview> {
    let preview = Preview::new(lead_id);

    sqlx::query(
        r#"
        INSERT INTO generated_previews (id, lead_id, status, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(preview.id.to_string())
    .bind(preview.lead_id.to_string())
    .bind(preview.status.as_str())
    .bind(preview.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(preview)
}

/// Mark a preview `failed`, leaving content fields empty
pub async fn mark_failed(pool: &SqlitePool, preview_id: Uuid) -> Result<()> {
    sqlx::query("UPDATE generated_previews SET status = ? WHERE id = ?")
        .bind(PreviewStatus::Failed.as_str())
        .bind(preview_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Write all generated content and flip status to `ready` in one UPDATE
///
/// `hero_image_url` may be empty when the image stage degraded.
pub async fn finalize_preview(
    pool: &SqlitePool,
    preview_id: Uuid,
    concept: &PreviewConcept,
    hero_image_url: &str,
    market_research: &str,
    design_research: &str,
) -> Result<()> {
    // Prepare all data before touching the database
    let page_structure = serde_json::to_string(&concept.page_structure)
        .map_err(|e| Error::Internal(format!("Failed to serialize page_structure: {}", e)))?;
    let feature_sections = serde_json::to_string(&concept.feature_sections)
        .map_err(|e| Error::Internal(format!("Failed to serialize feature_sections: {}", e)))?;

    sqlx::query(
        r#"
        UPDATE generated_previews SET
            brand_positioning = ?,
            copy_direction = ?,
            hero_headline = ?,
            hero_subheadline = ?,
            page_structure = ?,
            feature_sections = ?,
            hero_image_url = ?,
            ai_notes = ?,
            market_research = ?,
            design_research = ?,
            status = ?
        WHERE id = ?
        "#,
    )
    .bind(&concept.brand_positioning)
    .bind(&concept.copy_direction)
    .bind(&concept.hero_headline)
    .bind(&concept.hero_subheadline)
    .bind(&page_structure)
    .bind(&feature_sections)
    .bind(hero_image_url)
    .bind(&concept.ai_notes)
    .bind(market_research)
    .bind(design_research)
    .bind(PreviewStatus::Ready.as_str())
    .bind(preview_id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a preview by id
pub async fn get_preview(pool: &SqlitePool, preview_id: Uuid) -> Result<Option<Preview>> {
    let row = sqlx::query(&select_sql("WHERE id = ?"))
        .bind(preview_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.map(preview_from_row).transpose()
}

/// Load the newest preview for a lead (authoritative row for display)
pub async fn latest_for_lead(pool: &SqlitePool, lead_id: Uuid) -> Result<Option<Preview>> {
    let row = sqlx::query(&select_sql(
        "WHERE lead_id = ? ORDER BY created_at DESC, rowid DESC LIMIT 1",
    ))
    .bind(lead_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(preview_from_row).transpose()
}

fn select_sql(tail: &str) -> String {
    format!(
        r#"
        SELECT id, lead_id, status, brand_positioning, copy_direction,
               hero_headline, hero_subheadline, page_structure, feature_sections,
               hero_image_url, ai_notes, market_research, design_research, created_at
        FROM generated_previews
        {}
        "#,
        tail
    )
}

fn preview_from_row(row: sqlx::sqlite::SqliteRow) -> Result<Preview> {
    let id: String = row.get("id");
    let id = Uuid::parse_str(&id)
        .map_err(|e| Error::Internal(format!("Failed to parse preview id: {}", e)))?;

    let lead_id: String = row.get("lead_id");
    let lead_id = Uuid::parse_str(&lead_id)
        .map_err(|e| Error::Internal(format!("Failed to parse lead id: {}", e)))?;

    let status: String = row.get("status");
    let status = PreviewStatus::parse(&status)
        .ok_or_else(|| Error::Internal(format!("Unknown preview status: {}", status)))?;

    let page_structure: Option<String> = row.get("page_structure");
    let page_structure = page_structure
        .map(|s| {
            serde_json::from_str(&s)
                .map_err(|e| Error::Internal(format!("Failed to deserialize page_structure: {}", e)))
        })
        .transpose()?;

    let feature_sections: Option<String> = row.get("feature_sections");
    let feature_sections = feature_sections
        .map(|s| {
            serde_json::from_str(&s).map_err(|e| {
                Error::Internal(format!("Failed to deserialize feature_sections: {}", e))
            })
        })
        .transpose()?;

    let created_at: String = row.get("created_at");
    let created_at = chrono::DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| Error::Internal(format!("Failed to parse created_at: {}", e)))?
        .with_timezone(&chrono::Utc);

    Ok(Preview {
        id,
        lead_id,
        status,
        brand_positioning: row.get("brand_positioning"),
        copy_direction: row.get("copy_direction"),
        hero_headline: row.get("hero_headline"),
        hero_subheadline: row.get("hero_subheadline"),
        page_structure,
        feature_sections,
        hero_image_url: row.get("hero_image_url"),
        ai_notes: row.get("ai_notes"),
        market_research: row.get("market_research"),
        design_research: row.get("design_research"),
        created_at,
    })
}
