//! Generated preview record, status, and concept schema

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Preview generation status
///
/// `Generating` at creation; `Ready` only after the single update that writes
/// every content field; `Failed` when concept synthesis fails unrecoverably.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewStatus {
    /// Pipeline in flight, content fields empty
    Generating,
    /// Content fully populated (image reference possibly empty)
    Ready,
    /// Concept synthesis failed; content fields empty
    Failed,
}

impl PreviewStatus {
    /// Stable string form used for the `status` column
    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewStatus::Generating => "generating",
            PreviewStatus::Ready => "ready",
            PreviewStatus::Failed => "failed",
        }
    }

    /// Parse the stored string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "generating" => Some(PreviewStatus::Generating),
            "ready" => Some(PreviewStatus::Ready),
            "failed" => Some(PreviewStatus::Failed),
            _ => None,
        }
    }

    /// Terminal statuses stop client polling
    pub fn is_terminal(&self) -> bool {
        matches!(self, PreviewStatus::Ready | PreviewStatus::Failed)
    }
}

/// One entry of the proposed page structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSection {
    /// Section name
    pub section: String,
    /// What this section achieves
    pub purpose: String,
    /// Visual/content concept
    pub concept: String,
}

/// One teaser card on the preview page; locked sections upsell the paid build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSection {
    /// Section title
    pub title: String,
    /// What this section previews
    pub description: String,
    /// Whether the section is blurred out until the build is purchased
    pub locked: bool,
}

/// Structured concept produced by the synthesis stage
///
/// Field set matches the `generate_preview_concept` tool schema; every field
/// is required in the upstream response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConcept {
    /// 2-3 sentence brand positioning statement
    pub brand_positioning: String,
    /// Direction for tone, voice, messaging strategy
    pub copy_direction: String,
    /// Hero headline
    pub hero_headline: String,
    /// Hero subheadline
    pub hero_subheadline: String,
    /// Proposed page structure
    pub page_structure: Vec<PageSection>,
    /// Teaser feature sections
    pub feature_sections: Vec<FeatureSection>,
    /// Internal notes for the team (implementation/upsell angles)
    pub ai_notes: String,
}

/// One generation attempt's output artifact, tied to a lead
///
/// Content fields are `None` while `generating` or `failed`; the update that
/// flips status to `ready` writes them all at once, so readers never observe
/// a torn record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preview {
    /// Unique preview identifier
    pub id: Uuid,
    /// Owning lead
    pub lead_id: Uuid,
    /// Generation status
    pub status: PreviewStatus,
    /// Brand positioning text
    pub brand_positioning: Option<String>,
    /// Copy direction text
    pub copy_direction: Option<String>,
    /// Hero headline
    pub hero_headline: Option<String>,
    /// Hero subheadline
    pub hero_subheadline: Option<String>,
    /// Proposed page structure
    pub page_structure: Option<Vec<PageSection>>,
    /// Teaser feature sections
    pub feature_sections: Option<Vec<FeatureSection>>,
    /// Public URL of the rendered hero image; empty string when the image
    /// stage degraded
    pub hero_image_url: Option<String>,
    /// Internal AI notes
    pub ai_notes: Option<String>,
    /// Market research transcript (placeholder text when research degraded)
    pub market_research: Option<String>,
    /// Design research transcript (placeholder text when research degraded)
    pub design_research: Option<String>,
    /// Creation time; the newest row per lead is authoritative for display
    pub created_at: DateTime<Utc>,
}

impl Preview {
    /// Create a fresh record in `Generating` state with empty content
    pub fn new(lead_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            lead_id,
            status: PreviewStatus::Generating,
            brand_positioning: None,
            copy_direction: None,
            hero_headline: None,
            hero_subheadline: None,
            page_structure: None,
            feature_sections: None,
            hero_image_url: None,
            ai_notes: None,
            market_research: None,
            design_research: None,
            created_at: Utc::now(),
        }
    }
}
