//! Shared test helpers: in-memory app state, sample records, and scripted
//! mock upstream services bound to ephemeral ports.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use base64::Engine;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tempfile::TempDir;

use kova_preview::config::Config;
use kova_preview::models::{FeatureSection, Lead, PageSection, PreviewConcept};
use kova_preview::AppState;

/// Base URL that refuses connections, for network-failure scenarios
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:1";

/// Holds tokio's paused-clock auto-advance off while database work is in
/// flight
///
/// SQLite queries run on a real background thread; under
/// `start_paused = true` tokio would otherwise advance the clock to the next
/// timer the instant the runtime parks, firing pool acquire timeouts (and
/// unrelated test timers) before the worker thread can reply. A live
/// `spawn_blocking` task inhibits auto-advance, so the runtime parks for real
/// and wakes on the worker's reply with zero virtual time elapsed. Dropping
/// the returned sender ends the hold after a short real-time grace that
/// covers sqlx's on-release connection ping.
fn hold_clock() -> std::sync::mpsc::Sender<()> {
    let (tx, rx) = std::sync::mpsc::channel::<()>();
    tokio::task::spawn_blocking(move || {
        let _ = rx.recv_timeout(std::time::Duration::from_secs(30));
        std::thread::sleep(std::time::Duration::from_millis(10));
    });
    tx
}

/// Single-connection in-memory pool so every handle sees the same database
///
/// Clock holds (see [`hold_clock`]) cover pool setup and every connection
/// checkout, keeping database calls at zero virtual duration under paused
/// tokio time; acquire-time pings are disabled so an idle checkout completes
/// on its first poll without registering a timeout timer.
pub async fn memory_pool() -> SqlitePool {
    let setup_hold = hold_clock();
    let checkout_hold: Arc<Mutex<Option<std::sync::mpsc::Sender<()>>>> =
        Arc::new(Mutex::new(None));
    let acquire_hold = checkout_hold.clone();
    let release_hold = checkout_hold.clone();
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .test_before_acquire(false)
        .before_acquire(move |_conn, _meta| {
            let hold = acquire_hold.clone();
            Box::pin(async move {
                *hold.lock().unwrap() = Some(hold_clock());
                Ok(true)
            })
        })
        .after_release(move |_conn, _meta| {
            let hold = release_hold.clone();
            Box::pin(async move {
                hold.lock().unwrap().take();
                Ok(true)
            })
        })
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    kova_preview::db::init_tables(&pool).await.expect("init tables");
    drop(setup_hold);
    pool
}

/// Test configuration pointing the pipeline at the given upstream URLs
pub fn test_config(gateway_url: &str, research_url: &str, storage: &TempDir) -> Config {
    Config {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        database_path: storage.path().join("test.db"),
        storage_root: storage.path().to_path_buf(),
        public_base_url: "http://127.0.0.1:5730".to_string(),
        research_api_key: "test-research-key".to_string(),
        gateway_api_key: "test-gateway-key".to_string(),
        research_base_url: research_url.to_string(),
        gateway_base_url: gateway_url.to_string(),
    }
}

/// App state wired to the given upstream URLs; returns the storage TempDir
/// so it outlives the test
pub async fn test_state(gateway_url: &str, research_url: &str) -> (AppState, TempDir) {
    let pool = memory_pool().await;
    let dir = TempDir::new().expect("tempdir");
    let config = test_config(gateway_url, research_url, &dir);
    let state = AppState::new(pool, config).expect("app state");
    (state, dir)
}

/// A lead matching the funnel's canonical demo submission
pub fn sample_lead() -> Lead {
    Lead::new(
        "Joe's Tacos",
        Some("Phoenix".to_string()),
        Some("AZ".to_string()),
        vec!["Restaurant / Food Service".to_string()],
        Some("Tacos, catering".to_string()),
        Some("Family taqueria serving Phoenix since 2009".to_string()),
        None,
        None,
    )
}

/// The concept every happy-path mock returns
pub fn sample_concept() -> PreviewConcept {
    PreviewConcept {
        brand_positioning: "A neighborhood taqueria elevated to destination status.".to_string(),
        copy_direction: "Warm, confident, first person plural.".to_string(),
        hero_headline: "Tacos Worth Crossing Town For".to_string(),
        hero_subheadline: "Family recipes, modern fire, served nightly in Phoenix.".to_string(),
        page_structure: vec![PageSection {
            section: "Hero".to_string(),
            purpose: "Immediate appetite appeal".to_string(),
            concept: "Full-bleed food photography".to_string(),
        }],
        feature_sections: vec![FeatureSection {
            title: "Online Ordering".to_string(),
            description: "Direct orders without app fees".to_string(),
            locked: true,
        }],
        ai_notes: "Candidate for reservation-system upsell.".to_string(),
    }
}

fn concept_json_string() -> String {
    serde_json::to_string(&sample_concept()).unwrap()
}

/// Scripted behavior of the mock gateway's concept model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConceptBehavior {
    /// Structured tool-call response
    ToolCall,
    /// JSON inline in message content, wrapped in markdown fences
    RawTextFenced,
    /// Tool-call response after a short real-time delay
    SlowToolCall,
    /// HTTP 429
    RateLimited,
    /// HTTP 402
    QuotaExhausted,
    /// HTTP 500
    ServerError,
}

/// Scripted behavior of the mock gateway's image model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageBehavior {
    /// Data-URI PNG payload
    Ok,
    /// HTTP 500
    ServerError,
    /// 200 with no image in the message
    MissingPayload,
}

#[derive(Clone)]
struct GatewayScript {
    concept: ConceptBehavior,
    image: ImageBehavior,
}

/// Spawn a mock generative gateway; returns its base URL
///
/// Image requests are recognized by their `modalities` field, everything
/// else is treated as a concept request.
pub async fn spawn_gateway(concept: ConceptBehavior, image: ImageBehavior) -> String {
    let app = Router::new()
        .route("/chat/completions", post(gateway_handler))
        .with_state(GatewayScript { concept, image });
    spawn_server(app).await
}

async fn gateway_handler(
    State(script): State<GatewayScript>,
    Json(body): Json<Value>,
) -> Response {
    if body.get("modalities").is_some() {
        return image_response(script.image);
    }
    concept_response(script.concept).await
}

async fn concept_response(behavior: ConceptBehavior) -> Response {
    match behavior {
        ConceptBehavior::ToolCall => tool_call_body().into_response(),
        ConceptBehavior::SlowToolCall => {
            tokio::time::sleep(std::time::Duration::from_millis(300)).await;
            tool_call_body().into_response()
        }
        ConceptBehavior::RawTextFenced => Json(json!({
            "choices": [{
                "message": {
                    "content": format!("```json\n{}\n```", concept_json_string()),
                }
            }]
        }))
        .into_response(),
        ConceptBehavior::RateLimited => {
            (StatusCode::TOO_MANY_REQUESTS, "Rate limited").into_response()
        }
        ConceptBehavior::QuotaExhausted => {
            (StatusCode::PAYMENT_REQUIRED, "Payment required").into_response()
        }
        ConceptBehavior::ServerError => {
            (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
        }
    }
}

fn tool_call_body() -> Json<Value> {
    Json(json!({
        "choices": [{
            "message": {
                "tool_calls": [{
                    "function": {
                        "name": "generate_preview_concept",
                        "arguments": concept_json_string(),
                    }
                }]
            }
        }]
    }))
}

fn image_response(behavior: ImageBehavior) -> Response {
    match behavior {
        ImageBehavior::Ok => {
            let encoded =
                base64::engine::general_purpose::STANDARD.encode(b"fake png bytes");
            Json(json!({
                "choices": [{
                    "message": {
                        "images": [{
                            "image_url": { "url": format!("data:image/png;base64,{}", encoded) }
                        }]
                    }
                }]
            }))
            .into_response()
        }
        ImageBehavior::MissingPayload => {
            Json(json!({ "choices": [{ "message": { "content": "no image today" } }] }))
                .into_response()
        }
        ImageBehavior::ServerError => {
            (StatusCode::INTERNAL_SERVER_ERROR, "image model down").into_response()
        }
    }
}

/// Scripted behavior of the mock research service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResearchBehavior {
    Ok,
    ServerError,
    EmptyContent,
}

/// Spawn a mock research service; returns its base URL
pub async fn spawn_research(behavior: ResearchBehavior) -> String {
    let app = Router::new()
        .route(
            "/chat/completions",
            post(move |Json(_body): Json<Value>| async move {
                match behavior {
                    ResearchBehavior::Ok => Json(json!({
                        "choices": [{
                            "message": {
                                "content": "Local market favors direct online ordering and bold photography.",
                            }
                        }]
                    }))
                    .into_response(),
                    ResearchBehavior::EmptyContent => {
                        Json(json!({ "choices": [{ "message": { "content": "" } }] }))
                            .into_response()
                    }
                    ResearchBehavior::ServerError => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "research down").into_response()
                    }
                }
            }),
        );
    spawn_server(app).await
}

async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind mock server");
    let addr = listener.local_addr().expect("mock server addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server");
    });
    format!("http://{}", addr)
}
