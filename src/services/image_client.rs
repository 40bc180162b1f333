//! Hero image synthesis client
//!
//! Asks the generative gateway's image model for a full-page mock homepage
//! render and returns the decoded PNG bytes. Every failure mode here is
//! best-effort from the pipeline's point of view; the run proceeds with an
//! empty image reference. Single attempt, no retries.

use base64::Engine;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::models::{Lead, PreviewConcept};

const IMAGE_MODEL: &str = "google/gemini-2.5-flash-image";
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Image synthesis errors
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Response contained no image payload")]
    MissingImage,

    #[error("Image decode error: {0}")]
    Decode(String),
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    images: Option<Vec<ImagePayload>>,
}

#[derive(Debug, Deserialize)]
struct ImagePayload {
    image_url: ImageUrl,
}

#[derive(Debug, Deserialize)]
struct ImageUrl {
    url: String,
}

/// Image synthesis client
pub struct ImageClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ImageClient {
    pub fn new(base_url: String, api_key: String) -> Result<Self, ImageError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ImageError::Network(e.to_string()))?;

        Ok(Self { http_client, base_url, api_key })
    }

    /// Render the mock homepage and return decoded image bytes
    pub async fn generate(&self, prompt: &str) -> Result<Vec<u8>, ImageError> {
        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(url = %url, "Requesting hero image");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": IMAGE_MODEL,
                "messages": [{ "role": "user", "content": prompt }],
                "modalities": ["image", "text"],
            }))
            .send()
            .await
            .map_err(|e| ImageError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ImageError::Api(status.as_u16(), error_text));
        }

        let body: ChatResponse =
            response.json().await.map_err(|e| ImageError::Decode(e.to_string()))?;

        let data_uri = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.images)
            .and_then(|images| images.into_iter().next())
            .map(|i| i.image_url.url)
            .ok_or(ImageError::MissingImage)?;

        decode_data_uri(&data_uri)
    }
}

/// Build the full-page mock render prompt from the synthesized concept
pub fn build_image_prompt(lead: &Lead, concept: &PreviewConcept) -> String {
    let sections = concept
        .page_structure
        .iter()
        .map(|s| s.section.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Generate a premium full-page website homepage mockup for a {} business called \
         \"{}\" in {}, {}. Hero headline: \"{}\". Subheadline: \"{}\". Brand positioning: {}. \
         Page sections from top to bottom: {}. Style: high-end corporate luxury aesthetic, \
         abstract architectural brushed steel and warm brass accents, soft cinematic studio \
         lighting, minimalist composition. 16:9 aspect ratio. Ultra high resolution.",
        lead.industries.join("/"),
        lead.business_name,
        lead.city,
        lead.state,
        concept.hero_headline,
        concept.hero_subheadline,
        concept.brand_positioning,
        sections,
    )
}

/// Decode a `data:image/...;base64,` URI into raw bytes
fn decode_data_uri(uri: &str) -> Result<Vec<u8>, ImageError> {
    let encoded = match uri.find("base64,") {
        Some(idx) => &uri[idx + "base64,".len()..],
        // Accept bare base64 without the data-URI prefix
        None => uri,
    };

    base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| ImageError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeatureSection, PageSection};

    fn sample_concept() -> PreviewConcept {
        PreviewConcept {
            brand_positioning: "Destination taqueria".to_string(),
            copy_direction: "Warm and confident".to_string(),
            hero_headline: "Tacos Worth Crossing Town For".to_string(),
            hero_subheadline: "Family recipes, modern fire".to_string(),
            page_structure: vec![
                PageSection {
                    section: "Hero".to_string(),
                    purpose: "Appetite appeal".to_string(),
                    concept: "Full-bleed photography".to_string(),
                },
                PageSection {
                    section: "Menu Highlights".to_string(),
                    purpose: "Showcase signatures".to_string(),
                    concept: "Grid of dishes".to_string(),
                },
            ],
            feature_sections: vec![FeatureSection {
                title: "Online Ordering".to_string(),
                description: "Direct orders".to_string(),
                locked: true,
            }],
            ai_notes: "n".to_string(),
        }
    }

    #[test]
    fn prompt_carries_concept_and_identity() {
        let lead = Lead::new(
            "Joe's Tacos",
            Some("Phoenix".to_string()),
            Some("AZ".to_string()),
            vec!["Restaurant / Food Service".to_string()],
            None,
            None,
            None,
            None,
        );
        let prompt = build_image_prompt(&lead, &sample_concept());
        assert!(prompt.contains("Joe's Tacos"));
        assert!(prompt.contains("Restaurant / Food Service"));
        assert!(prompt.contains("Tacos Worth Crossing Town For"));
        assert!(prompt.contains("Hero, Menu Highlights"));
    }

    #[test]
    fn decodes_data_uri() {
        let bytes = decode_data_uri("data:image/png;base64,aGVsbG8=").expect("should decode");
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn decodes_bare_base64() {
        let bytes = decode_data_uri("aGVsbG8=").expect("should decode");
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(matches!(decode_data_uri("data:image/png;base64,!!!"), Err(ImageError::Decode(_))));
    }
}
