//! HTTP surface: a thin axum router in front of the [`Orchestrator`].
//!
//! The summarize route always answers with HTTP 200; failures travel inside
//! the JSON-RPC envelope.

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

use super::helpers;
use crate::core::config::AppConfig;
use crate::core::models::RpcResponse;
use crate::errors::ConfigError;
use crate::worker::{Orchestrator, build_orchestrator};

pub const SUMMARIZE_PATH: &str = "/a2a/summarize";

/// Router over an existing orchestrator. Tests use this with stub collaborators.
pub fn router(orchestrator: Orchestrator) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route(SUMMARIZE_PATH, post(summarize))
        .layer(TraceLayer::new_for_http())
        .with_state(orchestrator)
}

/// Router wired to the production extractor, LLM client and webhook dispatcher.
///
/// # Errors
///
/// Returns an error if any HTTP client cannot be built.
pub fn build_app(config: &AppConfig) -> Result<Router, ConfigError> {
    Ok(router(build_orchestrator(config)?))
}

async fn summarize(State(orchestrator): State<Orchestrator>, body: Bytes) -> Json<RpcResponse> {
    Json(orchestrator.handle_body(&body).await)
}

async fn root() -> Json<Value> {
    Json(helpers::greeting())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
