use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::json;

use crate::{errors::Result, handlers::AppState};

pub async fn liveness() -> Result<Json<serde_json::Value>> {
    Ok(Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let store_status = match state.kv.ping().await {
        Ok(()) => "healthy",
        Err(e) => {
            tracing::warn!("Key-value store ping failed: {}", e);
            "unhealthy"
        }
    };

    let (status, overall_status) = if store_status == "healthy" {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };

    (
        status,
        Json(json!({
            "status": overall_status,
            "checks": {
                "store": store_status
            },
            "timestamp": chrono::Utc::now().to_rfc3339()
        })),
    )
}
