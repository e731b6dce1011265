//! Feedback submission and feedback-invitation email composition.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::traits::notifier::EmailMessage;
use gatehouse_core::types::facility_time::FacilityClock;
use gatehouse_database::repositories::feedback::FeedbackRepository;
use gatehouse_entity::feedback::CreateFeedback;
use gatehouse_realtime::{BroadcastDispatcher, CardKind, DashboardCard};

use super::tokens::FeedbackTokenSigner;

/// The feedback form as submitted by the visitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackForm {
    /// Name as entered on the form.
    pub name: String,
    /// Email as entered on the form.
    pub email: String,
    /// Stated purpose of the visit.
    pub purpose: String,
    /// Self-reported check-in time slot.
    pub checkin_time_slot: String,
    /// Whether check-in felt faster than conventional reception.
    pub faster: String,
    /// Preference for the digital flow over a paper one.
    pub digital_pref: String,
    /// Whether face recognition helped the experience.
    pub face_help: String,
    /// Overall rating, 1–5.
    pub overall_rating: i16,
    /// Free-text comment.
    pub comment_text: String,
}

/// Collects feedback behind one-time signed links and feeds the dashboard
/// comment/score cards.
pub struct FeedbackService {
    repo: Arc<FeedbackRepository>,
    signer: FeedbackTokenSigner,
    dispatcher: BroadcastDispatcher,
    clock: FacilityClock,
    link_base_url: String,
}

impl FeedbackService {
    /// Create a new feedback service.
    pub fn new(
        repo: Arc<FeedbackRepository>,
        signer: FeedbackTokenSigner,
        dispatcher: BroadcastDispatcher,
        clock: FacilityClock,
        link_base_url: String,
    ) -> Self {
        Self {
            repo,
            signer,
            dispatcher,
            clock,
            link_base_url,
        }
    }

    /// Compose the feedback invitation email for a checked-in visitor.
    ///
    /// Called by the background worker, not the arrival request path.
    pub fn invitation_email(
        &self,
        visitor_id: Uuid,
        name: &str,
        email: &str,
        now: DateTime<Utc>,
    ) -> AppResult<EmailMessage> {
        let token = self.signer.issue(visitor_id, now)?;
        let link = format!("{}?token={}", self.link_base_url, token);

        Ok(EmailMessage {
            to: email.to_string(),
            subject: "We value your feedback!".to_string(),
            body_html: format!(
                "<html><body>\
                 <h2>Visitor Feedback</h2>\
                 <p>Dear {},</p>\
                 <p>Thank you for visiting us. We hope you had a pleasant \
                 experience.</p>\
                 <p>Please use the link below to share your feedback. The \
                 link stays valid for the next <strong>{} hours</strong> and \
                 works once.</p>\
                 <p><a href=\"{}\">Leave Feedback</a></p>\
                 <p>If you did not visit us or received this email in error, \
                 please disregard this message.</p>\
                 </body></html>",
                name,
                self.signer.ttl_hours(),
                link
            ),
        })
    }

    /// Store a feedback submission arriving through a one-time link.
    ///
    /// The token's `jti` burn is the reuse check; after the durable write
    /// the comment and recomputed average-score cards go out best-effort.
    pub async fn submit(
        &self,
        token: &str,
        form: &FeedbackForm,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let claims = self.signer.verify(token)?;

        if !(1..=5).contains(&form.overall_rating) {
            return Err(AppError::validation("Overall rating must be between 1 and 5"));
        }

        if !self.repo.burn_token(claims.jti).await? {
            return Err(AppError::unauthorized("Feedback link already used"));
        }

        let stored = self
            .repo
            .create(
                &CreateFeedback {
                    visitor_id: claims.sub,
                    name: form.name.clone(),
                    email: form.email.clone(),
                    purpose: form.purpose.clone(),
                    checkin_time_slot: form.checkin_time_slot.clone(),
                    faster: form.faster.clone(),
                    digital_pref: form.digital_pref.clone(),
                    face_help: form.face_help.clone(),
                    overall_rating: form.overall_rating,
                    comment_text: form.comment_text.clone(),
                },
                self.clock.local_date(now),
            )
            .await?;

        info!(feedback_id = %stored.id, visitor_id = %claims.sub, "Feedback stored");

        let comment_card = DashboardCard::new(
            CardKind::VisitorComment,
            serde_json::json!({
                "comment": format!("\"{}\" - {}", form.comment_text, form.name),
            }),
        );
        if let Err(e) = self.dispatcher.publish(&comment_card, now).await {
            warn!(error = %e, "Comment card broadcast failed");
        }

        if let Err(e) = self.broadcast_average(now).await {
            warn!(error = %e, "Average score card broadcast failed");
        }

        Ok(())
    }

    /// Recompute the average rating and broadcast the score card.
    pub async fn broadcast_average(&self, now: DateTime<Utc>) -> AppResult<()> {
        let Some(avg) = self.repo.average_rating().await? else {
            return Ok(());
        };

        let colored_stars = avg.floor() as i64;
        let card = DashboardCard::new(
            CardKind::AvgFeedbackScore,
            serde_json::json!({
                "avg_score": (avg * 10.0).round() / 10.0,
                "colored_stars": colored_stars,
                "empty_stars": 5 - colored_stars,
            }),
        );
        self.dispatcher.publish(&card, now).await?;
        Ok(())
    }
}
