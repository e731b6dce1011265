//! Arrival check-in handler.

use axum::Json;
use axum::extract::State;
use chrono::Utc;

use gatehouse_core::types::response::ApiResponse;
use gatehouse_service::checkin::ArrivalOutcome;

use crate::dto::request::ArrivalRequest;
use crate::error::ApiError;
use crate::handlers::decode_image;
use crate::state::AppState;

/// POST /api/arrivals — biometric arrival check-in.
///
/// Always answers with a definitive status (`matched`, `not_invited`,
/// `not_registered`), even when best-effort side effects fail.
pub async fn process_arrival(
    State(state): State<AppState>,
    Json(request): Json<ArrivalRequest>,
) -> Result<Json<ApiResponse<ArrivalOutcome>>, ApiError> {
    let image = decode_image(&request.image_data)?;

    let Some(visitor) = state.registration.resolve_arrival(&image).await? else {
        return Ok(Json(ApiResponse::ok(ArrivalOutcome::not_registered())));
    };

    let outcome = state.checkin.process_arrival(&visitor, Utc::now()).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}
