//! HTTP and WebSocket handlers.

pub mod arrival;
pub mod dashboard;
pub mod feedback;
pub mod health;
pub mod heartbeat;
pub mod invite;
pub mod visitor;
pub mod ws;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use gatehouse_core::error::AppError;

/// Decode a base64 image field, rejecting empty or malformed input.
pub(crate) fn decode_image(image_data: &str) -> Result<Vec<u8>, AppError> {
    if image_data.is_empty() {
        return Err(AppError::validation("No image provided"));
    }
    BASE64
        .decode(image_data)
        .map_err(|e| AppError::validation(format!("Invalid image encoding: {e}")))
}
