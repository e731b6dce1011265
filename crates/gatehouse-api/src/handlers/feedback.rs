//! Feedback submission handler.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use chrono::Utc;

use gatehouse_core::error::AppError;
use gatehouse_core::types::response::ApiResponse;

use crate::dto::request::SubmitFeedbackRequest;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/feedback — submit feedback through a one-time signed link.
pub async fn submit_feedback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SubmitFeedbackRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let token = bearer_token(&headers)?;

    state
        .feedback
        .submit(&token, &request.form, Utc::now())
        .await?;

    Ok(Json(ApiResponse::ok(
        serde_json::json!({ "message": "Feedback submitted successfully" }),
    )))
}

fn bearer_token(headers: &HeaderMap) -> Result<String, AppError> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("No token provided"))?;

    value
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::unauthorized("No token provided"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header_rejected() {
        let headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_err());
    }

    #[test]
    fn test_empty_bearer_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_static("Bearer "),
        );
        assert!(bearer_token(&headers).is_err());
    }
}
