//! Visitor entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A pre-registered visitor whose face is enrolled in the biometric gallery.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Visitor {
    /// Unique visitor identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Email address; invites are keyed by it.
    pub email: String,
    /// Opaque handle into the biometric gallery.
    pub face_template_id: Option<String>,
    /// Whether the visitor completed the arrival kiosk flow at least once.
    pub passed_registration: bool,
    /// When the visitor registered.
    pub registered_at: DateTime<Utc>,
}

/// Data required to register a new visitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVisitor {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Gallery template handle from face enrollment.
    pub face_template_id: String,
}
