//! Visitor pre-registration handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use gatehouse_core::types::response::ApiResponse;

use crate::dto::request::RegisterVisitorRequest;
use crate::dto::response::VisitorView;
use crate::error::ApiError;
use crate::handlers::decode_image;
use crate::state::AppState;

/// POST /api/visitors — pre-register a visitor with a portrait image.
pub async fn register_visitor(
    State(state): State<AppState>,
    Json(request): Json<RegisterVisitorRequest>,
) -> Result<Json<ApiResponse<VisitorView>>, ApiError> {
    let image = decode_image(&request.image_data)?;

    let visitor = state
        .registration
        .register(&request.name, &request.email, &image)
        .await?;

    Ok(Json(ApiResponse::ok(visitor.into())))
}

/// GET /api/visitors/{id} — visitor lookup.
pub async fn get_visitor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<VisitorView>>, ApiError> {
    let visitor = state.registration.get(id).await?;
    Ok(Json(ApiResponse::ok(visitor.into())))
}
