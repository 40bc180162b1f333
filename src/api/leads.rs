//! Lead API handlers
//!
//! POST /api/leads, GET /api/leads/{id}, PATCH /api/leads/{id}/status

use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{Lead, LeadStatus};
use crate::AppState;

/// POST /api/leads request
#[derive(Debug, Deserialize)]
pub struct SubmitLeadRequest {
    pub business_name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub core_services: Option<String>,
    #[serde(default)]
    pub business_description: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// POST /api/leads response
#[derive(Debug, Serialize)]
pub struct SubmitLeadResponse {
    pub success: bool,
    pub lead_id: Uuid,
}

/// PATCH /api/leads/{id}/status request
#[derive(Debug, Deserialize)]
pub struct UpdateLeadStatusRequest {
    pub status: LeadStatus,
}

/// PATCH /api/leads/{id}/status response
#[derive(Debug, Serialize)]
pub struct UpdateLeadStatusResponse {
    pub success: bool,
    pub status: LeadStatus,
}

/// POST /api/leads
///
/// Validates and persists a new lead, then fires the generation pipeline as
/// a detached task. The response never waits on generation; pipeline errors
/// are logged, not surfaced here.
pub async fn submit_lead(
    State(state): State<AppState>,
    Json(request): Json<SubmitLeadRequest>,
) -> ApiResult<Json<SubmitLeadResponse>> {
    if request.business_name.trim().is_empty() {
        return Err(ApiError::BadRequest("Business name is required".to_string()));
    }
    if request.industries.is_empty() {
        return Err(ApiError::BadRequest("At least one industry is required".to_string()));
    }

    let lead = Lead::new(
        &request.business_name,
        request.city,
        request.state,
        request.industries,
        request.core_services,
        request.business_description,
        request.notes,
        request.logo_url,
    );

    crate::db::leads::insert_lead(&state.db, &lead).await?;

    tracing::info!(
        lead_id = %lead.id,
        business = %lead.business_name,
        "Lead submitted"
    );

    // Fire-and-forget: exactly one run per successful submission. The task
    // owns its own error handling and writes only to durable storage.
    let pipeline = state.pipeline.clone();
    let lead_id = lead.id;
    tokio::spawn(async move {
        if let Err(e) = pipeline.generate(lead_id).await {
            tracing::error!(lead_id = %lead_id, error = %e, "Background preview generation failed");
        }
    });

    Ok(Json(SubmitLeadResponse { success: true, lead_id: lead.id }))
}

/// GET /api/leads/{id}
pub async fn get_lead(
    State(state): State<AppState>,
    Path(lead_id): Path<Uuid>,
) -> ApiResult<Json<Lead>> {
    let lead = crate::db::leads::get_lead(&state.db, lead_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Lead not found: {}", lead_id)))?;

    Ok(Json(lead))
}

/// PATCH /api/leads/{id}/status
///
/// Operator-driven lifecycle moves (consult booked, installed, retainer).
pub async fn update_lead_status(
    State(state): State<AppState>,
    Path(lead_id): Path<Uuid>,
    Json(request): Json<UpdateLeadStatusRequest>,
) -> ApiResult<Json<UpdateLeadStatusResponse>> {
    let updated =
        crate::db::leads::update_lead_status(&state.db, lead_id, request.status).await?;

    if !updated {
        return Err(ApiError::NotFound(format!("Lead not found: {}", lead_id)));
    }

    tracing::info!(lead_id = %lead_id, status = request.status.as_str(), "Lead status updated");

    Ok(Json(UpdateLeadStatusResponse { success: true, status: request.status }))
}

/// Build lead routes
pub fn lead_routes() -> Router<AppState> {
    Router::new()
        .route("/api/leads", post(submit_lead))
        .route("/api/leads/:lead_id", get(get_lead))
        .route("/api/leads/:lead_id/status", patch(update_lead_status))
}
