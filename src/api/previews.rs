//! Preview API handlers
//!
//! POST /api/previews/generate (synchronous trigger, also the operator
//! "regenerate" entry point) and GET /api/leads/{id}/preview (the read side
//! browser clients poll).

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::Preview;
use crate::AppState;

/// POST /api/previews/generate request
#[derive(Debug, Deserialize)]
pub struct GeneratePreviewRequest {
    pub lead_id: Uuid,
}

/// POST /api/previews/generate response
#[derive(Debug, Serialize)]
pub struct GeneratePreviewResponse {
    pub success: bool,
    pub preview_id: Uuid,
}

/// POST /api/previews/generate
///
/// Runs the pipeline to completion for the given lead. Each invocation
/// produces a fresh preview row; the newest row wins for display. Upstream
/// failures map to 429 (rate limited), 402 (quota exhausted), or 500; a run
/// already in flight for the same lead maps to 409.
pub async fn generate_preview(
    State(state): State<AppState>,
    Json(request): Json<GeneratePreviewRequest>,
) -> ApiResult<Json<GeneratePreviewResponse>> {
    let preview_id = state.pipeline.generate(request.lead_id).await.map_err(ApiError::from)?;

    Ok(Json(GeneratePreviewResponse { success: true, preview_id }))
}

/// GET /api/leads/{id}/preview
///
/// Newest preview row for the lead; 404 while none exists yet.
pub async fn get_latest_preview(
    State(state): State<AppState>,
    Path(lead_id): Path<Uuid>,
) -> ApiResult<Json<Preview>> {
    let preview = crate::db::previews::latest_for_lead(&state.db, lead_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No preview for lead: {}", lead_id)))?;

    Ok(Json(preview))
}

/// Build preview routes
pub fn preview_routes() -> Router<AppState> {
    Router::new()
        .route("/api/previews/generate", post(generate_preview))
        .route("/api/leads/:lead_id/preview", get(get_latest_preview))
}
