//! Typed dashboard card payloads.
//!
//! The card enumeration is closed and versioned together with the dashboard
//! frontend; adding a kind means updating both sides.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use gatehouse_core::error::AppError;

/// The closed set of dashboard card kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    /// A visitor just checked in.
    VisitorCheckin,
    /// Count of invitations for the facility-local day.
    TodayInvitations,
    /// Total registered visitors.
    TotalVisitors,
    /// A new feedback comment.
    VisitorComment,
    /// Average feedback rating with star breakdown.
    AvgFeedbackScore,
    /// Users active within the live window.
    ActiveUsersNow,
    /// Distinct users seen today.
    UsersToday,
    /// Hourly distinct-user series over the last six hours.
    #[serde(rename = "users_last_6_hours")]
    UsersLast6Hours,
}

impl CardKind {
    /// All kinds, for validation messages.
    pub const ALL: [CardKind; 8] = [
        Self::VisitorCheckin,
        Self::TodayInvitations,
        Self::TotalVisitors,
        Self::VisitorComment,
        Self::AvgFeedbackScore,
        Self::ActiveUsersNow,
        Self::UsersToday,
        Self::UsersLast6Hours,
    ];

    /// Return the wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VisitorCheckin => "visitor_checkin",
            Self::TodayInvitations => "today_invitations",
            Self::TotalVisitors => "total_visitors",
            Self::VisitorComment => "visitor_comment",
            Self::AvgFeedbackScore => "avg_feedback_score",
            Self::ActiveUsersNow => "active_users_now",
            Self::UsersToday => "users_today",
            Self::UsersLast6Hours => "users_last_6_hours",
        }
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CardKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|k| k.as_str() == s)
            .copied()
            .ok_or_else(|| AppError::unknown_card_kind(format!("Unknown card kind: '{s}'")))
    }
}

/// One dashboard update: a named card plus its kind-specific payload.
///
/// Ephemeral — never persisted; delivery is best-effort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardCard {
    /// The card being updated.
    #[serde(rename = "card")]
    pub kind: CardKind,
    /// Kind-specific structured payload.
    pub data: serde_json::Value,
}

impl DashboardCard {
    /// Build a card update.
    pub fn new(kind: CardKind, data: serde_json::Value) -> Self {
        Self { kind, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_kinds_roundtrip_via_str() {
        for kind in CardKind::ALL {
            assert_eq!(kind.as_str().parse::<CardKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_is_typed_error() {
        let err = "bogus".parse::<CardKind>().unwrap_err();
        assert_eq!(err.kind, gatehouse_core::error::ErrorKind::UnknownCardKind);
    }

    #[test]
    fn test_wire_format_uses_card_field() {
        let card = DashboardCard::new(
            CardKind::VisitorCheckin,
            serde_json::json!({"visitor_name": "Amira"}),
        );
        let wire = serde_json::to_value(&card).unwrap();
        assert_eq!(wire["card"], "visitor_checkin");
        assert_eq!(wire["data"]["visitor_name"], "Amira");
    }

    #[test]
    fn test_six_hour_series_wire_name() {
        let json = serde_json::to_string(&CardKind::UsersLast6Hours).unwrap();
        assert_eq!(json, "\"users_last_6_hours\"");
    }
}
