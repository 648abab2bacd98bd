use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::llm_client::MODEL;
use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "careeros-api"
    }))
}

/// GET /api/v1/ai/status
/// Whether AI features are live or running on fallbacks only.
pub async fn ai_status_handler(State(state): State<AppState>) -> Json<Value> {
    let configured = state.ai.is_configured();
    Json(json!({
        "configured": configured,
        "mode": if configured { "online" } else { "offline" },
        "model": MODEL,
        "timeoutSecs": state.config.ai_timeout.as_secs()
    }))
}
