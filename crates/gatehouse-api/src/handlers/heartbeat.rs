//! Dashboard user heartbeat handler.

use axum::Json;
use axum::extract::State;
use chrono::Utc;

use gatehouse_core::error::AppError;
use gatehouse_core::types::response::ApiResponse;

use crate::dto::request::HeartbeatRequest;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/heartbeat — record user activity and refresh the activity cards.
pub async fn record_heartbeat(
    State(state): State<AppState>,
    Json(request): Json<HeartbeatRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    if request.user_id.trim().is_empty() {
        return Err(AppError::validation("Missing user_id").into());
    }

    state
        .stats
        .record_heartbeat(&request.user_id, Utc::now())
        .await?;

    Ok(Json(ApiResponse::ok(serde_json::json!({ "status": "ok" }))))
}
