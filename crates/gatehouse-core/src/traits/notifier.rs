//! Notification gateway boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// An outbound email message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub body_html: String,
}

/// Outbound operator/visitor notification capability.
///
/// Invoked fire-and-forget: callers log failures and never let them fail
/// the primary operation.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Send a short message to the facility operator channel.
    async fn notify_operator(&self, message: &str) -> AppResult<()>;

    /// Send an email to a visitor.
    async fn send_email(&self, message: &EmailMessage) -> AppResult<()>;
}
