//! Request body DTOs.

use serde::Deserialize;

use gatehouse_service::feedback::FeedbackForm;
use gatehouse_service::invite::RegisterInviteRequest;

/// Arrival kiosk capture.
#[derive(Debug, Deserialize)]
pub struct ArrivalRequest {
    /// Base64-encoded camera image.
    pub image_data: String,
}

/// Visitor pre-registration.
#[derive(Debug, Deserialize)]
pub struct RegisterVisitorRequest {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Base64-encoded portrait image.
    pub image_data: String,
}

/// Bulk invite upload, already decoded into rows.
#[derive(Debug, Deserialize)]
pub struct BulkInviteRequest {
    /// Rows in upload order.
    pub rows: Vec<RegisterInviteRequest>,
}

/// Dashboard card load request.
#[derive(Debug, Deserialize)]
pub struct LoadCardRequest {
    /// Wire name of the requested card.
    pub component: String,
}

/// Dashboard broadcast request.
#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    /// Wire name of the card.
    pub card: String,
    /// Kind-specific payload.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Dashboard user heartbeat.
#[derive(Debug, Deserialize)]
pub struct HeartbeatRequest {
    /// Caller-supplied stable user key.
    pub user_id: String,
}

/// Feedback submission body (the token travels in the Authorization header).
#[derive(Debug, Deserialize)]
pub struct SubmitFeedbackRequest {
    /// The form fields.
    #[serde(flatten)]
    pub form: FeedbackForm,
}
