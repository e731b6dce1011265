//! Health check handlers.

use axum::Json;
use axum::extract::State;

use crate::state::AppState;

/// GET /api/health — liveness.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /api/health/detailed — liveness plus database connectivity.
pub async fn detailed_health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let database = gatehouse_database::connection::health_check(&state.db_pool)
        .await
        .unwrap_or(false);

    Json(serde_json::json!({
        "status": if database { "ok" } else { "degraded" },
        "database": database,
        "connections": state.registry.len(),
    }))
}
