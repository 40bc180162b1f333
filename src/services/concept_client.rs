//! Concept synthesis client
//!
//! Calls the generative gateway's chat-completions endpoint with a strict
//! tool schema and turns the response into a `PreviewConcept`. This is the
//! one required stage of the pipeline: its failures are terminal for a run,
//! with rate-limit and quota exhaustion classified separately for operator
//! visibility. Single attempt, no retries.

use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use crate::models::PreviewConcept;

const CONCEPT_MODEL: &str = "google/gemini-3-flash-preview";
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Concept synthesis errors
#[derive(Debug, Error)]
pub enum ConceptError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Quota exhausted")]
    QuotaExhausted,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
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
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: ToolFunction,
}

#[derive(Debug, Deserialize)]
struct ToolFunction {
    arguments: String,
}

/// Where the concept JSON was found in the response
///
/// The gateway normally honors the forced tool choice, but some models reply
/// with the JSON inline in the message text, often wrapped in markdown
/// fences. Both variants parse to the same record.
#[derive(Debug)]
enum ConceptPayload {
    ToolCall(String),
    Text(String),
}

/// Concept synthesis client
pub struct ConceptClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ConceptClient {
    pub fn new(base_url: String, api_key: String) -> Result<Self, ConceptError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ConceptError::Network(e.to_string()))?;

        Ok(Self { http_client, base_url, api_key })
    }

    /// Synthesize a structured website concept from the business context and
    /// both research transcripts
    pub async fn generate(
        &self,
        business_context: &str,
        market_research: &str,
        design_research: &str,
    ) -> Result<PreviewConcept, ConceptError> {
        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(url = %url, "Requesting concept synthesis");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&concept_request(business_context, market_research, design_research))
            .send()
            .await
            .map_err(|e| ConceptError::Network(e.to_string()))?;

        let status = response.status();

        if status.as_u16() == 429 {
            return Err(ConceptError::RateLimited);
        }
        if status.as_u16() == 402 {
            return Err(ConceptError::QuotaExhausted);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ConceptError::Api(status.as_u16(), error_text));
        }

        let body: ChatResponse =
            response.json().await.map_err(|e| ConceptError::Parse(e.to_string()))?;

        parse_payload(extract_payload(body)?)
    }
}

fn concept_request(
    business_context: &str,
    market_research: &str,
    design_research: &str,
) -> serde_json::Value {
    let system = "You are a premium web design strategist for Kova Solutions. You create \
high-end website concept previews for local businesses. Your output should feel like a \
$10,000+ agency proposal.\n\n\
RULES:\n\
- Do NOT write full website copy. Write DIRECTION and CONCEPTS only.\n\
- Every suggestion should feel premium, custom, and impossible to replicate with a template.\n\
- Think about what makes THIS specific business unique.\n\
- Reference the market and design research provided.\n\n\
Return a JSON object (no markdown fences) with these exact keys: brand_positioning, \
copy_direction, hero_headline (max 8 words), hero_subheadline (max 20 words), \
page_structure, feature_sections, ai_notes.";

    let user = format!(
        "Create a premium website concept preview for this business:\n\n{}\n\n\
         Market Research:\n{}\n\nDesign Research:\n{}",
        business_context, market_research, design_research
    );

    json!({
        "model": CONCEPT_MODEL,
        "messages": [
            { "role": "system", "content": system },
            { "role": "user", "content": user },
        ],
        "tools": [
            {
                "type": "function",
                "function": {
                    "name": "generate_preview_concept",
                    "description": "Generate the structured website preview concept",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "brand_positioning": { "type": "string" },
                            "copy_direction": { "type": "string" },
                            "hero_headline": { "type": "string" },
                            "hero_subheadline": { "type": "string" },
                            "page_structure": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "section": { "type": "string" },
                                        "purpose": { "type": "string" },
                                        "concept": { "type": "string" },
                                    },
                                    "required": ["section", "purpose", "concept"],
                                },
                            },
                            "feature_sections": {
                                "type": "array",
                                "items": {
                                    "type": "object",
                                    "properties": {
                                        "title": { "type": "string" },
                                        "description": { "type": "string" },
                                        "locked": { "type": "boolean" },
                                    },
                                    "required": ["title", "description", "locked"],
                                },
                            },
                            "ai_notes": { "type": "string" },
                        },
                        "required": [
                            "brand_positioning",
                            "copy_direction",
                            "hero_headline",
                            "hero_subheadline",
                            "page_structure",
                            "feature_sections",
                            "ai_notes",
                        ],
                        "additionalProperties": false,
                    },
                },
            },
        ],
        "tool_choice": { "type": "function", "function": { "name": "generate_preview_concept" } },
    })
}

fn extract_payload(body: ChatResponse) -> Result<ConceptPayload, ConceptError> {
    let message = body
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| ConceptError::Parse("Response contained no choices".to_string()))?;

    if let Some(arguments) =
        message.tool_calls.and_then(|calls| calls.into_iter().next()).map(|c| c.function.arguments)
    {
        return Ok(ConceptPayload::ToolCall(arguments));
    }

    match message.content {
        Some(content) if !content.trim().is_empty() => Ok(ConceptPayload::Text(content)),
        _ => Err(ConceptError::Parse("Response had neither tool call nor content".to_string())),
    }
}

fn parse_payload(payload: ConceptPayload) -> Result<PreviewConcept, ConceptError> {
    let json_text = match payload {
        ConceptPayload::ToolCall(arguments) => arguments,
        ConceptPayload::Text(content) => strip_code_fences(&content),
    };

    serde_json::from_str(&json_text).map_err(|e| ConceptError::Parse(e.to_string()))
}

/// Remove markdown code-fence delimiters around a JSON body
fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}
