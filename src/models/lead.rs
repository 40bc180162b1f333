//! Business lead record and lifecycle status

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{DEFAULT_CITY, DEFAULT_STATE};

/// Lead lifecycle status
///
/// Starts at `New`; the pipeline advances `New → PreviewSent` when a preview
/// reaches terminal success. All later transitions are operator-driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    /// Just submitted, no preview delivered yet
    New,
    /// A generated preview reached `ready`
    PreviewSent,
    /// Operator booked a consultation
    ConsultBooked,
    /// Site built and installed
    Installed,
    /// Ongoing retainer active
    RetainerActive,
}

impl LeadStatus {
    /// Stable string form used for the `status` column
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "new",
            LeadStatus::PreviewSent => "preview_sent",
            LeadStatus::ConsultBooked => "consult_booked",
            LeadStatus::Installed => "installed",
            LeadStatus::RetainerActive => "retainer_active",
        }
    }

    /// Parse the stored string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(LeadStatus::New),
            "preview_sent" => Some(LeadStatus::PreviewSent),
            "consult_booked" => Some(LeadStatus::ConsultBooked),
            "installed" => Some(LeadStatus::Installed),
            "retainer_active" => Some(LeadStatus::RetainerActive),
            _ => None,
        }
    }
}

/// A submitted business intake record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    /// Unique lead identifier
    pub id: Uuid,
    /// Business name (trimmed, non-empty)
    pub business_name: String,
    /// City, defaulted when omitted at submission
    pub city: String,
    /// State, defaulted when omitted at submission
    pub state: String,
    /// Industry tags (at least one)
    pub industries: Vec<String>,
    /// Free-text list of core services
    pub core_services: Option<String>,
    /// Free-text business description
    pub business_description: Option<String>,
    /// Free-text internal notes
    pub notes: Option<String>,
    /// Optional logo image reference
    pub logo_url: Option<String>,
    /// Lifecycle status
    pub status: LeadStatus,
    /// Submission time
    pub created_at: DateTime<Utc>,
}

impl Lead {
    /// Create a new lead from validated submission fields
    ///
    /// Callers are responsible for rejecting blank names and empty industry
    /// lists before construction; this only applies location defaults and
    /// normalizes whitespace.
    pub fn new(
        business_name: &str,
        city: Option<String>,
        state: Option<String>,
        industries: Vec<String>,
        core_services: Option<String>,
        business_description: Option<String>,
        notes: Option<String>,
        logo_url: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            business_name: business_name.trim().to_string(),
            city: city.filter(|c| !c.trim().is_empty()).unwrap_or_else(|| DEFAULT_CITY.to_string()),
            state: state
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_STATE.to_string()),
            industries,
            core_services,
            business_description,
            notes,
            logo_url,
            status: LeadStatus::New,
            created_at: Utc::now(),
        }
    }

    /// Render the lead as the business-context block fed to every AI prompt
    pub fn business_context(&self) -> String {
        format!(
            "Business: {}\nLocation: {}, {}\nIndustries: {}\nServices: {}\nDescription: {}\nNotes: {}",
            self.business_name,
            self.city,
            self.state,
            self.industries.join(", "),
            self.core_services.as_deref().unwrap_or("Not specified"),
            self.business_description.as_deref().unwrap_or("Not provided"),
            self.notes.as_deref().unwrap_or("None"),
        )
    }
}
