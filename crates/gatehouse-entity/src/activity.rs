//! Dashboard user activity heartbeat sample.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One heartbeat observation from a dashboard user.
///
/// Samples are append-only and pruned after the configured retention
/// window; the active-user cards aggregate over them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivitySample {
    /// Caller-supplied stable user key.
    pub user_key: String,
    /// When the heartbeat was observed.
    pub observed_at: DateTime<Utc>,
}

/// Count of distinct users in one facility-local hour bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyActivity {
    /// Hour label, `YYYY-MM-DD HH:00` in facility-local time.
    pub hour: String,
    /// Distinct users observed in that hour.
    pub count: i64,
}
