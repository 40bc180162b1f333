//! Preview generation pipeline
//!
//! Runs the three stages in strict sequence for one lead:
//! research (best-effort) → concept synthesis (required) → image (best-effort),
//! then finalizes the preview row in a single update. One detached run per
//! submission; runs for distinct leads proceed concurrently, runs for the
//! same lead are serialized by rejecting the second trigger.

use std::collections::HashSet;

use sqlx::SqlitePool;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::Config;
use crate::db;
use crate::error::{PipelineError, Result};
use crate::models::{Lead, LeadStatus, PreviewConcept};
use crate::services::concept_client::{ConceptClient, ConceptError};
use crate::services::image_client::{self, ImageClient};
use crate::services::research_client::{ResearchClient, RESEARCH_PLACEHOLDER};
use crate::services::storage::BlobStorage;

impl From<ConceptError> for PipelineError {
    fn from(e: ConceptError) -> Self {
        match e {
            ConceptError::RateLimited => PipelineError::RateLimited,
            ConceptError::QuotaExhausted => PipelineError::QuotaExhausted,
            ConceptError::Parse(msg) => PipelineError::Parse(msg),
            ConceptError::Network(msg) => PipelineError::Upstream(msg),
            ConceptError::Api(status, msg) => {
                PipelineError::Upstream(format!("status {}: {}", status, msg))
            }
        }
    }
}

/// Pipeline orchestrator
pub struct PreviewPipeline {
    db: SqlitePool,
    research: ResearchClient,
    concept: ConceptClient,
    image: ImageClient,
    storage: BlobStorage,
    /// Lead ids with a run currently in flight
    active_runs: Mutex<HashSet<Uuid>>,
}

impl PreviewPipeline {
    pub fn new(
        db: SqlitePool,
        research: ResearchClient,
        concept: ConceptClient,
        image: ImageClient,
        storage: BlobStorage,
    ) -> Self {
        Self { db, research, concept, image, storage, active_runs: Mutex::new(HashSet::new()) }
    }

    /// Build the pipeline and its clients from process configuration
    pub fn from_config(db: SqlitePool, config: &Config) -> Result<Self> {
        let research =
            ResearchClient::new(config.research_base_url.clone(), config.research_api_key.clone())
                .map_err(|e| {
                    crate::error::Error::Config(format!("Research client init failed: {}", e))
                })?;
        let concept =
            ConceptClient::new(config.gateway_base_url.clone(), config.gateway_api_key.clone())
                .map_err(|e| {
                    crate::error::Error::Config(format!("Concept client init failed: {}", e))
                })?;
        let image =
            ImageClient::new(config.gateway_base_url.clone(), config.gateway_api_key.clone())
                .map_err(|e| {
                    crate::error::Error::Config(format!("Image client init failed: {}", e))
                })?;
        let storage =
            BlobStorage::new(config.storage_root.clone(), config.public_base_url.clone());

        Ok(Self::new(db, research, concept, image, storage))
    }

    /// Run one generation attempt for a lead
    ///
    /// Returns the new preview's id on terminal success. On terminal failure
    /// the preview row (if one was created) is marked `failed` before the
    /// error is returned. A second call for a lead whose run is still in
    /// flight is rejected with `AlreadyRunning`.
    pub async fn generate(&self, lead_id: Uuid) -> std::result::Result<Uuid, PipelineError> {
        {
            let mut active = self.active_runs.lock().await;
            if !active.insert(lead_id) {
                return Err(PipelineError::AlreadyRunning(lead_id));
            }
        }

        let result = self.run(lead_id).await;

        self.active_runs.lock().await.remove(&lead_id);

        result
    }

    async fn run(&self, lead_id: Uuid) -> std::result::Result<Uuid, PipelineError> {
        let lead = db::leads::get_lead(&self.db, lead_id)
            .await?
            .ok_or(PipelineError::LeadNotFound(lead_id))?;

        // The existence of this row is what the client poller waits for.
        let preview = db::previews::create_preview(&self.db, lead.id).await?;

        tracing::info!(
            lead_id = %lead.id,
            preview_id = %preview.id,
            business = %lead.business_name,
            "Starting preview generation"
        );

        match self.run_stages(&lead, preview.id).await {
            Ok(()) => {
                tracing::info!(lead_id = %lead.id, preview_id = %preview.id, "Preview ready");
                Ok(preview.id)
            }
            Err(e) => {
                tracing::error!(
                    lead_id = %lead.id,
                    preview_id = %preview.id,
                    error = %e,
                    "Preview generation failed"
                );
                if let Err(mark_err) = db::previews::mark_failed(&self.db, preview.id).await {
                    tracing::error!(
                        preview_id = %preview.id,
                        error = %mark_err,
                        "Failed to mark preview as failed"
                    );
                }
                Err(e)
            }
        }
    }

    async fn run_stages(
        &self,
        lead: &Lead,
        preview_id: Uuid,
    ) -> std::result::Result<(), PipelineError> {
        let context = lead.business_context();

        // Stage 1: research, advisory only. Each call degrades to the
        // placeholder independently; neither gates the rest of the run.
        let market_research =
            match self.research.market_research(&context, &lead.city, &lead.state).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(lead_id = %lead.id, error = %e, "Market research unavailable");
                    RESEARCH_PLACEHOLDER.to_string()
                }
            };

        let design_research = match self.research.design_research(&context).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(lead_id = %lead.id, error = %e, "Design research unavailable");
                RESEARCH_PLACEHOLDER.to_string()
            }
        };

        // Stage 2: concept synthesis, the single required dependency.
        let concept = self.concept.generate(&context, &market_research, &design_research).await?;

        // Stage 3: hero image, best-effort. An empty URL is an accepted
        // degraded outcome.
        let hero_image_url = self.render_hero_image(lead, &concept, preview_id).await;

        // Single update: all content fields plus the `ready` status.
        db::previews::finalize_preview(
            &self.db,
            preview_id,
            &concept,
            &hero_image_url,
            &market_research,
            &design_research,
        )
        .await?;

        if let Err(e) =
            db::leads::update_lead_status(&self.db, lead.id, LeadStatus::PreviewSent).await
        {
            tracing::warn!(lead_id = %lead.id, error = %e, "Lead status bump failed");
        }

        Ok(())
    }

    async fn render_hero_image(
        &self,
        lead: &Lead,
        concept: &PreviewConcept,
        preview_id: Uuid,
    ) -> String {
        let prompt = image_client::build_image_prompt(lead, concept);

        let bytes = match self.image.generate(&prompt).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(preview_id = %preview_id, error = %e, "Hero image generation failed");
                return String::new();
            }
        };

        match self.storage.store_hero_image(preview_id, &bytes).await {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(preview_id = %preview_id, error = %e, "Hero image upload failed");
                String::new()
            }
        }
    }
}
