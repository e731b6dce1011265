//! Facility-local time arithmetic.
//!
//! Invites are date-scoped in the facility's timezone, and dashboard hour
//! labels are rendered in it. The facility timezone is modeled as a fixed
//! UTC offset from configuration.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Timelike, Utc};

/// Converts instants to facility-local dates and hour labels.
#[derive(Debug, Clone, Copy)]
pub struct FacilityClock {
    offset: FixedOffset,
}

impl FacilityClock {
    /// Build a clock from a whole-hour UTC offset.
    pub fn from_offset_hours(hours: i32) -> Self {
        let offset = FixedOffset::east_opt(hours * 3600)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"));
        Self { offset }
    }

    /// The facility-local calendar date of an instant.
    pub fn local_date(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.offset).date_naive()
    }

    /// The UTC instant at which the facility-local day containing `now`
    /// started.
    pub fn day_start_utc(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local_midnight = self
            .local_date(now)
            .and_hms_opt(0, 0, 0)
            .expect("midnight is valid");
        self.offset
            .from_local_datetime(&local_midnight)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(now)
    }

    /// Facility-local `YYYY-MM-DD HH:00` label for an instant.
    pub fn hour_label(&self, at: DateTime<Utc>) -> String {
        let local = at.with_timezone(&self.offset);
        format!("{} {:02}:00", local.date_naive(), local.hour())
    }

    /// The last `count` hour labels ending at the hour containing `now`.
    pub fn trailing_hour_labels(&self, now: DateTime<Utc>, count: u32) -> Vec<String> {
        (0..count)
            .rev()
            .map(|i| self.hour_label(now - Duration::hours(i as i64)))
            .collect()
    }

    /// Raw offset in hours, for queries that bucket in the database.
    pub fn offset_hours(&self) -> i32 {
        self.offset.local_minus_utc() / 3600
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_local_date_crosses_midnight() {
        let clock = FacilityClock::from_offset_hours(3);
        // 22:30 UTC is 01:30 the next day at UTC+3.
        let now = utc("2025-06-01T22:30:00Z");
        assert_eq!(clock.local_date(now).to_string(), "2025-06-02");
    }

    #[test]
    fn test_day_start_in_utc() {
        let clock = FacilityClock::from_offset_hours(3);
        let now = utc("2025-06-01T09:00:00Z");
        // Local midnight of 2025-06-01 at UTC+3 is 21:00 UTC the day before.
        assert_eq!(
            clock.day_start_utc(now),
            utc("2025-05-31T21:00:00Z")
        );
    }

    #[test]
    fn test_trailing_hour_labels() {
        let clock = FacilityClock::from_offset_hours(3);
        let now = utc("2025-06-01T09:15:00Z");
        let labels = clock.trailing_hour_labels(now, 3);
        assert_eq!(
            labels,
            vec![
                "2025-06-01 10:00".to_string(),
                "2025-06-01 11:00".to_string(),
                "2025-06-01 12:00".to_string(),
            ]
        );
    }
}
