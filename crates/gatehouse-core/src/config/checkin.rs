//! Arrival check-in configuration.

use serde::{Deserialize, Serialize};

/// Settings for the arrival check-in pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinConfig {
    /// Facility timezone as a fixed UTC offset in hours.
    ///
    /// Invite eligibility is evaluated against the facility-local calendar
    /// date, not UTC.
    #[serde(default = "default_utc_offset")]
    pub facility_utc_offset_hours: i32,
    /// Minimum match confidence accepted from the biometric matcher.
    /// Matches below this are treated the same as no match.
    #[serde(default = "default_confidence")]
    pub match_confidence_threshold: f32,
    /// Base URL of the biometric matcher service.
    pub matcher_url: String,
    /// Deadline for a single matcher call in seconds.
    #[serde(default = "default_matcher_timeout")]
    pub matcher_timeout_seconds: u64,
}

fn default_utc_offset() -> i32 {
    3
}

fn default_confidence() -> f32 {
    90.0
}

fn default_matcher_timeout() -> u64 {
    10
}
