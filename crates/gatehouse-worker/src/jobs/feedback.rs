//! Feedback invitation job handler.
//!
//! The arrival orchestrator enqueues one of these per won check-in; sending
//! the email here keeps the slow relay call off the arrival request path.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use gatehouse_core::traits::notifier::NotificationGateway;
use gatehouse_entity::job::Job;
use gatehouse_service::feedback::FeedbackService;

use crate::executor::{JobExecutionError, JobHandler};

#[derive(Debug, Deserialize)]
struct FeedbackInvitationPayload {
    visitor_id: Uuid,
    email: String,
    name: String,
}

/// Sends the post-visit feedback invitation email.
pub struct FeedbackInvitationHandler {
    feedback: Arc<FeedbackService>,
    notifier: Arc<dyn NotificationGateway>,
}

impl FeedbackInvitationHandler {
    /// Create a new handler.
    pub fn new(feedback: Arc<FeedbackService>, notifier: Arc<dyn NotificationGateway>) -> Self {
        Self { feedback, notifier }
    }
}

#[async_trait]
impl JobHandler for FeedbackInvitationHandler {
    fn job_type(&self) -> &str {
        "feedback_invitation"
    }

    async fn execute(&self, job: &Job) -> Result<(), JobExecutionError> {
        let payload: FeedbackInvitationPayload = serde_json::from_value(job.payload.clone())
            .map_err(|e| {
                JobExecutionError::Permanent(format!("Malformed feedback payload: {e}"))
            })?;

        let email = self
            .feedback
            .invitation_email(payload.visitor_id, &payload.name, &payload.email, Utc::now())
            .map_err(|e| JobExecutionError::Permanent(format!("Token issue failed: {e}")))?;

        // Relay hiccups are worth retrying; the token inside stays valid.
        self.notifier
            .send_email(&email)
            .await
            .map_err(|e| JobExecutionError::Transient(format!("Email send failed: {e}")))?;

        info!(visitor_id = %payload.visitor_id, "Feedback invitation sent");
        Ok(())
    }
}
