//! Lead row operations

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Lead, LeadStatus};

/// Insert a new lead row
pub async fn insert_lead(pool: &SqlitePool, lead: &Lead) -> Result<()> {
    let industries = serde_json::to_string(&lead.industries)
        .map_err(|e| Error::Internal(format!("Failed to serialize industries: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO business_leads (
            id, business_name, city, state, industries,
            core_services, business_description, notes, logo_url,
            status, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(lead.id.to_string())
    .bind(&lead.business_name)
    .bind(&lead.city)
    .bind(&lead.state)
    .bind(&industries)
    .bind(&lead.core_services)
    .bind(&lead.business_description)
    .bind(&lead.notes)
    .bind(&lead.logo_url)
    .bind(lead.status.as_str())
    .bind(lead.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a lead by id
pub async fn get_lead(pool: &SqlitePool, lead_id: Uuid) -> Result<Option<Lead>> {
    let row = sqlx::query(
        r#"
        SELECT id, business_name, city, state, industries,
               core_services, business_description, notes, logo_url,
               status, created_at
        FROM business_leads
        WHERE id = ?
        "#,
    )
    .bind(lead_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(lead_from_row).transpose()
}

/// Update a lead's lifecycle status
///
/// Returns false when no row matched the id.
pub async fn update_lead_status(
    pool: &SqlitePool,
    lead_id: Uuid,
    status: LeadStatus,
) -> Result<bool> {
    let result = sqlx::query("UPDATE business_leads SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(lead_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Count lead rows (diagnostics and tests)
pub async fn count_leads(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM business_leads")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

fn lead_from_row(row: sqlx::sqlite::SqliteRow) -> Result<Lead> {
    let id: String = row.get("id");
    let id = Uuid::parse_str(&id)
        .map_err(|e| Error::Internal(format!("Failed to parse lead id: {}", e)))?;

    let industries: String = row.get("industries");
    let industries: Vec<String> = serde_json::from_str(&industries)
        .map_err(|e| Error::Internal(format!("Failed to deserialize industries: {}", e)))?;

    let status: String = row.get("status");
    let status = LeadStatus::parse(&status)
        .ok_or_else(|| Error::Internal(format!("Unknown lead status: {}", status)))?;

    let created_at: String = row.get("created_at");
    let created_at = chrono::DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| Error::Internal(format!("Failed to parse created_at: {}", e)))?
        .with_timezone(&chrono::Utc);

    Ok(Lead {
        id,
        business_name: row.get("business_name"),
        city: row.get("city"),
        state: row.get("state"),
        industries,
        core_services: row.get("core_services"),
        business_description: row.get("business_description"),
        notes: row.get("notes"),
        logo_url: row.get("logo_url"),
        status,
        created_at,
    })
}
