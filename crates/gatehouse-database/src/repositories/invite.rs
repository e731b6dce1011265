//! Invite repository — the durable invite ledger.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_entity::invite::{CreateInvite, Invite};

use crate::ledger::InviteLedger;

/// Repository for invite storage and the check-in transition.
#[derive(Debug, Clone)]
pub struct InviteRepository {
    pool: PgPool,
}

impl InviteRepository {
    /// Create a new invite repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InviteLedger for InviteRepository {
    /// Store a new invite.
    ///
    /// The (email, visit_date) unique constraint does the duplicate check;
    /// `ON CONFLICT DO NOTHING` turns a violation into an empty result
    /// instead of racing a separate lookup.
    async fn insert(&self, invite: &CreateInvite) -> AppResult<Invite> {
        let inserted = sqlx::query_as::<_, Invite>(
            "INSERT INTO invites (visitor_name, email, visit_date, visit_time) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (email, visit_date) DO NOTHING \
             RETURNING *",
        )
        .bind(&invite.visitor_name)
        .bind(&invite.email)
        .bind(invite.visit_date)
        .bind(invite.visit_time)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert invite", e))?;

        inserted.ok_or_else(|| {
            AppError::duplicate_invite(format!(
                "An invite for {} on {} already exists",
                invite.email, invite.visit_date
            ))
        })
    }

    async fn find_for_date(&self, email: &str, date: NaiveDate) -> AppResult<Option<Invite>> {
        sqlx::query_as::<_, Invite>("SELECT * FROM invites WHERE email = $1 AND visit_date = $2")
            .bind(email)
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find invite for date", e)
            })
    }

    /// Conditionally transition an invite to checked-in.
    ///
    /// The `status = 'invited'` guard makes this a single atomic
    /// compare-and-swap; concurrent arrivals for the same invite resolve to
    /// exactly one winner.
    async fn mark_checked_in(&self, invite_id: Uuid, time: DateTime<Utc>) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE invites SET status = 'checked_in', checkin_time = $2 \
             WHERE id = $1 AND status = 'invited'",
        )
        .bind(invite_id)
        .bind(time)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark invite checked in", e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::already_checked_in(format!(
                "Invite {invite_id} is not pending check-in"
            )));
        }
        Ok(())
    }

    async fn count_for_date(&self, date: NaiveDate) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invites WHERE visit_date = $1")
            .bind(date)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count invites", e)
            })?;
        Ok(count)
    }

    async fn recent_checkins(&self, limit: i64) -> AppResult<Vec<Invite>> {
        sqlx::query_as::<_, Invite>(
            "SELECT * FROM invites WHERE status = 'checked_in' \
             ORDER BY checkin_time DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list recent check-ins", e)
        })
    }
}
