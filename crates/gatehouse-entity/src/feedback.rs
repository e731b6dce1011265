//! Visitor feedback entity model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A visitor's post-visit feedback submission.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Feedback {
    /// Unique feedback identifier.
    pub id: Uuid,
    /// The visitor who submitted it.
    pub visitor_id: Uuid,
    /// Visitor's name as entered on the form.
    pub name: String,
    /// Visitor's email as entered on the form.
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
    /// Facility-local date the feedback was submitted.
    pub created_on: NaiveDate,
}

/// Data required to store a feedback submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFeedback {
    /// The visitor the feedback token was issued for.
    pub visitor_id: Uuid,
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
