//! Notification gateway backed by an HTTP relay service.
//!
//! The relay owns the actual SMS/email transports; this side only posts
//! messages with a bounded deadline and never gets awaited for correctness.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use gatehouse_core::config::notifications::NotificationsConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::traits::notifier::{EmailMessage, NotificationGateway};

#[derive(Debug, Serialize)]
struct ChannelMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Gateway posting notifications to the relay service.
#[derive(Debug, Clone)]
pub struct RelayNotificationGateway {
    client: reqwest::Client,
    base_url: String,
    operator_channel: String,
    from: String,
}

impl RelayNotificationGateway {
    /// Build a gateway from configuration.
    pub fn new(config: &NotificationsConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.relay_timeout_seconds))
            .build()
            .map_err(|e| AppError::configuration(format!("Relay client build failed: {e}")))?;

        Ok(Self {
            client,
            base_url: config.relay_url.trim_end_matches('/').to_string(),
            operator_channel: config.operator_channel.clone(),
            from: config.invitation_from.clone(),
        })
    }
}

#[async_trait]
impl NotificationGateway for RelayNotificationGateway {
    async fn notify_operator(&self, message: &str) -> AppResult<()> {
        self.client
            .post(format!("{}/messages", self.base_url))
            .json(&ChannelMessage {
                channel: &self.operator_channel,
                text: message,
            })
            .send()
            .await
            .map_err(|e| AppError::external_service(format!("Operator notify failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::external_service(format!("Operator notify rejected: {e}")))?;
        Ok(())
    }

    async fn send_email(&self, message: &EmailMessage) -> AppResult<()> {
        self.client
            .post(format!("{}/emails", self.base_url))
            .json(&EmailRequest {
                from: &self.from,
                to: &message.to,
                subject: &message.subject,
                html: &message.body_html,
            })
            .send()
            .await
            .map_err(|e| AppError::external_service(format!("Email send failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::external_service(format!("Email send rejected: {e}")))?;
        Ok(())
    }
}
