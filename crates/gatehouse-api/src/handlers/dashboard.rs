//! Dashboard card handlers.

use axum::Json;
use axum::extract::State;
use chrono::Utc;

use gatehouse_core::types::response::ApiResponse;
use gatehouse_realtime::{CardKind, DashboardCard, PublishReport};

use crate::dto::request::{BroadcastRequest, LoadCardRequest};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/dashboard/cards — load a named card's current data.
pub async fn load_card(
    State(state): State<AppState>,
    Json(request): Json<LoadCardRequest>,
) -> Result<Json<ApiResponse<DashboardCard>>, ApiError> {
    let kind: CardKind = request.component.parse().map_err(ApiError::from)?;
    let card = state.stats.card(kind, Utc::now()).await?;
    Ok(Json(ApiResponse::ok(card)))
}

/// POST /api/dashboard/broadcast — publish a card to every live connection.
///
/// Reports aggregate delivery/prune counts, never per-connection errors.
pub async fn broadcast_card(
    State(state): State<AppState>,
    Json(request): Json<BroadcastRequest>,
) -> Result<Json<ApiResponse<PublishReport>>, ApiError> {
    let report = state
        .dispatcher
        .publish_named(&request.card, request.data, Utc::now())
        .await?;
    Ok(Json(ApiResponse::ok(report)))
}
