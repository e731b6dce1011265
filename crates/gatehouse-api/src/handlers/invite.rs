//! Invite registration handlers.

use axum::Json;
use axum::extract::State;
use chrono::Utc;

use gatehouse_core::types::response::ApiResponse;
use gatehouse_service::invite::{BulkRegistrationReport, RegisterInviteRequest};

use crate::dto::request::BulkInviteRequest;
use crate::dto::response::InviteView;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/invites — register a single invite.
///
/// A duplicate (email, visit date) pair answers 409.
pub async fn register_invite(
    State(state): State<AppState>,
    Json(request): Json<RegisterInviteRequest>,
) -> Result<Json<ApiResponse<InviteView>>, ApiError> {
    let invite = state.invites.register(&request, Utc::now()).await?;
    Ok(Json(ApiResponse::ok(invite.into())))
}

/// POST /api/invites/bulk — register a batch of decoded rows.
pub async fn register_bulk(
    State(state): State<AppState>,
    Json(request): Json<BulkInviteRequest>,
) -> Result<Json<ApiResponse<BulkRegistrationReport>>, ApiError> {
    let report = state
        .invites
        .register_bulk(&request.rows, Utc::now())
        .await?;
    Ok(Json(ApiResponse::ok(report)))
}
