pub mod session;
pub mod store;

use axum::Json;
use axum_macros::debug_handler;
use serde_json::{Value, json};

/// Liveness probe.
#[debug_handler]
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
