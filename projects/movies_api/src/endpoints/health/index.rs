use axum::{response::IntoResponse, Json};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

/// Axum handler: GET /health
pub async fn handler() -> impl IntoResponse {
    Json(json!({
        "status": "OK",
        "time": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}
