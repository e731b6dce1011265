//! Notification gateway configuration.

use serde::{Deserialize, Serialize};

/// Settings for outbound operator and visitor notifications.
///
/// Delivery goes through an HTTP relay service; the relay owns the actual
/// SMS/email transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Base URL of the notification relay.
    pub relay_url: String,
    /// Deadline for a single relay call in seconds.
    #[serde(default = "default_relay_timeout")]
    pub relay_timeout_seconds: u64,
    /// Relay channel that reaches the facility operator.
    #[serde(default = "default_operator_channel")]
    pub operator_channel: String,
    /// From address used on invitation and feedback emails.
    pub invitation_from: String,
    /// Base URL the feedback link points at.
    pub feedback_link_base_url: String,
    /// HMAC secret for signing feedback-link tokens.
    pub feedback_token_secret: String,
    /// Feedback-link token lifetime in hours.
    #[serde(default = "default_feedback_ttl")]
    pub feedback_token_ttl_hours: u32,
}

fn default_relay_timeout() -> u64 {
    10
}

fn default_operator_channel() -> String {
    "operator".to_string()
}

fn default_feedback_ttl() -> u32 {
    24
}
