//! Invite ledger contract.
//!
//! The ledger is the single source of truth for "is this person expected
//! today." The check-in orchestrator depends on this trait rather than the
//! concrete repository so its state machine can be exercised against an
//! in-memory ledger.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use gatehouse_core::result::AppResult;
use gatehouse_entity::invite::{CreateInvite, Invite};

/// Durable storage and lookup of invite records.
#[async_trait]
pub trait InviteLedger: Send + Sync {
    /// Store a new invite.
    ///
    /// Fails with `DuplicateInvite` when an invite already exists for the
    /// same (email, visit date).
    async fn insert(&self, invite: &CreateInvite) -> AppResult<Invite>;

    /// Find the invite for an email on a specific visit date.
    ///
    /// The (email, visit date) uniqueness invariant guarantees zero or one
    /// result.
    async fn find_for_date(&self, email: &str, date: NaiveDate) -> AppResult<Option<Invite>>;

    /// Conditionally transition an invite to checked-in.
    ///
    /// This is the compare-and-swap primitive the orchestrator relies on:
    /// the update only applies while the invite is still `invited`, and a
    /// miss fails with `AlreadyCheckedIn`. Exactly one of any set of
    /// concurrent callers wins.
    async fn mark_checked_in(&self, invite_id: Uuid, time: DateTime<Utc>) -> AppResult<()>;

    /// Count all invites (any status) for a visit date.
    async fn count_for_date(&self, date: NaiveDate) -> AppResult<i64>;

    /// Most recent check-ins, newest first.
    async fn recent_checkins(&self, limit: i64) -> AppResult<Vec<Invite>>;
}
