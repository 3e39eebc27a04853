//! Health check endpoints

use crate::TrellisState;
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

pub fn health_routes() -> Router<TrellisState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "trellis-web"
    }))
}

async fn ready_check(State(state): State<TrellisState>) -> Json<Value> {
    let resolver = state.trellis().registry().resolver();
    Json(json!({
        "status": "ready",
        "views": resolver.snapshot().views().len(),
        "cachedChains": resolver.cached_len(),
    }))
}
