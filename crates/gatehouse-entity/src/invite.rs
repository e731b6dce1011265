//! Invite entity model and status state machine.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle of an invite. At most one invite exists per
/// (email, visit date), and it transitions to `CheckedIn` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invite_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    /// Expected but not yet arrived.
    Invited,
    /// Arrived and checked in for the invited date.
    CheckedIn,
}

impl InviteStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invited => "invited",
            Self::CheckedIn => "checked_in",
        }
    }
}

impl fmt::Display for InviteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for InviteStatus {
    type Err = gatehouse_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "invited" => Ok(Self::Invited),
            "checked_in" => Ok(Self::CheckedIn),
            _ => Err(gatehouse_core::AppError::validation(format!(
                "Invalid invite status: '{s}'. Expected one of: invited, checked_in"
            ))),
        }
    }
}

/// One expected visit on one facility-local calendar date.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invite {
    /// Unique invite identifier.
    pub id: Uuid,
    /// Invited person's display name.
    pub visitor_name: String,
    /// Invited person's email address.
    pub email: String,
    /// Facility-local visit date.
    pub visit_date: NaiveDate,
    /// Scheduled visit time.
    pub visit_time: NaiveTime,
    /// Current status.
    pub status: InviteStatus,
    /// When the invite transitioned to `CheckedIn`, if it has.
    pub checkin_time: Option<DateTime<Utc>>,
    /// When the invite was created.
    pub created_at: DateTime<Utc>,
}

impl Invite {
    /// Whether this invite is still waiting for the visitor.
    pub fn is_pending(&self) -> bool {
        self.status == InviteStatus::Invited
    }
}

/// Data required to register a new invite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvite {
    /// Invited person's display name.
    pub visitor_name: String,
    /// Invited person's email address.
    pub email: String,
    /// Facility-local visit date.
    pub visit_date: NaiveDate,
    /// Scheduled visit time.
    pub visit_time: NaiveTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        assert_eq!(
            "checked_in".parse::<InviteStatus>().unwrap(),
            InviteStatus::CheckedIn
        );
        assert_eq!(InviteStatus::Invited.as_str(), "invited");
        assert!("cancelled".parse::<InviteStatus>().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&InviteStatus::CheckedIn).unwrap();
        assert_eq!(json, "\"checked_in\"");
    }
}
