//! Feedback repository implementation.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_entity::feedback::{CreateFeedback, Feedback};

/// Repository for feedback submissions and one-shot token burning.
#[derive(Debug, Clone)]
pub struct FeedbackRepository {
    pool: PgPool,
}

impl FeedbackRepository {
    /// Create a new feedback repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a feedback submission.
    pub async fn create(&self, data: &CreateFeedback, created_on: NaiveDate) -> AppResult<Feedback> {
        sqlx::query_as::<_, Feedback>(
            "INSERT INTO feedback (visitor_id, name, email, purpose, checkin_time_slot, \
             faster, digital_pref, face_help, overall_rating, comment_text, created_on) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
        )
        .bind(data.visitor_id)
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.purpose)
        .bind(&data.checkin_time_slot)
        .bind(&data.faster)
        .bind(&data.digital_pref)
        .bind(&data.face_help)
        .bind(data.overall_rating)
        .bind(&data.comment_text)
        .bind(created_on)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to store feedback", e))
    }

    /// Burn a feedback-link token.
    ///
    /// Returns `false` when the token's `jti` was already burned; the
    /// primary-key conflict is the reuse check, so two concurrent submits
    /// with the same link cannot both pass.
    pub async fn burn_token(&self, jti: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO used_feedback_tokens (jti) VALUES ($1) ON CONFLICT (jti) DO NOTHING",
        )
        .bind(jti)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to burn token", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Average overall rating across all feedback, if any exists.
    pub async fn average_rating(&self) -> AppResult<Option<f64>> {
        sqlx::query_scalar::<_, Option<f64>>("SELECT AVG(overall_rating)::float8 FROM feedback")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to average ratings", e)
            })
    }

    /// Most recent feedback entries, newest first.
    pub async fn list_recent(&self, limit: i64) -> AppResult<Vec<Feedback>> {
        sqlx::query_as::<_, Feedback>(
            "SELECT * FROM feedback ORDER BY created_on DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list feedback", e))
    }
}
