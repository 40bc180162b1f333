//! Research service client
//!
//! Calls a Perplexity-style chat-completions endpoint twice per run: once for
//! market research, once for design research. Both calls are advisory; the
//! pipeline substitutes a placeholder when either fails. Single attempt, no
//! retries.

use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

const RESEARCH_MODEL: &str = "sonar";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Substituted for a failed or empty research response
pub const RESEARCH_PLACEHOLDER: &str = "Research unavailable - proceeding with AI generation.";

/// Research client errors
#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Empty research response")]
    Empty,
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
    content: Option<String>,
}

/// Research service client
pub struct ResearchClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ResearchClient {
    pub fn new(base_url: String, api_key: String) -> Result<Self, ResearchError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ResearchError::Network(e.to_string()))?;

        Ok(Self { http_client, base_url, api_key })
    }

    /// Market research: trends, competitor landscape, positioning angles
    pub async fn market_research(
        &self,
        business_context: &str,
        city: &str,
        state: &str,
    ) -> Result<String, ResearchError> {
        let system = "You are a business research analyst. Provide concise market insights, \
                      competitor landscape, and positioning opportunities. Keep it under 500 words.";
        let user = format!(
            "Research the following local business and its market:\n\n{}\n\nProvide:\n\
             1. Key market trends in their industry in {}, {}\n\
             2. What top competitors are doing online\n\
             3. Unique positioning opportunities\n\
             4. Key messaging angles that would resonate with their target audience",
            business_context, city, state
        );

        self.chat(system, &user).await
    }

    /// Design research: visual conventions and differentiation opportunities
    /// for the business's industry
    pub async fn design_research(&self, business_context: &str) -> Result<String, ResearchError> {
        let system = "You are a web design researcher. Provide concise analysis of current \
                      website design conventions and visual differentiation opportunities. \
                      Keep it under 600 words.";
        let user = format!(
            "Research current website design patterns for businesses like this one:\n\n{}\n\nProvide:\n\
             1. Layout and visual conventions common in this industry\n\
             2. Design cliches to avoid\n\
             3. Visual directions that would stand out locally\n\
             4. Imagery and typography notes",
            business_context
        );

        self.chat(system, &user).await
    }

    async fn chat(&self, system: &str, user: &str) -> Result<String, ResearchError> {
        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(url = %url, "Querying research service");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": RESEARCH_MODEL,
                "messages": [
                    { "role": "system", "content": system },
                    { "role": "user", "content": user },
                ],
            }))
            .send()
            .await
            .map_err(|e| ResearchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ResearchError::Api(status.as_u16(), error_text));
        }

        let body: ChatResponse =
            response.json().await.map_err(|e| ResearchError::Network(e.to_string()))?;

        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ResearchError::Empty);
        }

        Ok(text)
    }
}
