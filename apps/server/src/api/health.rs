use std::sync::Arc;

use crate::main_lib::AppState;
use axum::{routing::get, Json, Router};
use serde_json::{json, Value};

/// Liveness probe; no dependencies are touched.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}
