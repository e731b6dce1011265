//! Response body DTOs.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use gatehouse_entity::invite::{Invite, InviteStatus};
use gatehouse_entity::visitor::Visitor;

/// Public view of an invite.
#[derive(Debug, Serialize)]
pub struct InviteView {
    /// Invite ID.
    pub id: Uuid,
    /// Invited person's name.
    pub name: String,
    /// Invited person's email.
    pub email: String,
    /// Visit date.
    pub visit_date: NaiveDate,
    /// Visit time.
    pub visit_time: NaiveTime,
    /// Current status.
    pub status: InviteStatus,
    /// Check-in time, when checked in.
    pub checkin_time: Option<DateTime<Utc>>,
}

impl From<Invite> for InviteView {
    fn from(invite: Invite) -> Self {
        Self {
            id: invite.id,
            name: invite.visitor_name,
            email: invite.email,
            visit_date: invite.visit_date,
            visit_time: invite.visit_time,
            status: invite.status,
            checkin_time: invite.checkin_time,
        }
    }
}

/// Public view of a visitor.
#[derive(Debug, Serialize)]
pub struct VisitorView {
    /// Visitor ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Whether the visitor completed the kiosk flow.
    pub passed_registration: bool,
    /// Registration time.
    pub registered_at: DateTime<Utc>,
}

impl From<Visitor> for VisitorView {
    fn from(visitor: Visitor) -> Self {
        Self {
            id: visitor.id,
            name: visitor.name,
            email: visitor.email,
            passed_registration: visitor.passed_registration,
            registered_at: visitor.registered_at,
        }
    }
}
