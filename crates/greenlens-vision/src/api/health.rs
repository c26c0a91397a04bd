//! Liveness endpoints.

use axum::Json;
use serde_json::json;

pub async fn home() -> Json<serde_json::Value> {
    Json(json!({ "message": "GreenLens vision service is running" }))
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
