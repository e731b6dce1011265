//! Dashboard card data and activity metrics.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use gatehouse_core::result::AppResult;
use gatehouse_core::types::facility_time::FacilityClock;
use gatehouse_database::ledger::InviteLedger;
use gatehouse_database::repositories::activity::ActivityRepository;
use gatehouse_database::repositories::feedback::FeedbackRepository;
use gatehouse_database::repositories::visitor::VisitorRepository;
use gatehouse_realtime::{BroadcastDispatcher, CardKind, DashboardCard};

/// Computes card payloads and records dashboard-user activity.
pub struct StatsService {
    ledger: Arc<dyn InviteLedger>,
    visitors: Arc<VisitorRepository>,
    activity: Arc<ActivityRepository>,
    feedback: Arc<FeedbackRepository>,
    dispatcher: BroadcastDispatcher,
    clock: FacilityClock,
    active_window_seconds: u64,
}

impl StatsService {
    /// Create a new stats service.
    pub fn new(
        ledger: Arc<dyn InviteLedger>,
        visitors: Arc<VisitorRepository>,
        activity: Arc<ActivityRepository>,
        feedback: Arc<FeedbackRepository>,
        dispatcher: BroadcastDispatcher,
        clock: FacilityClock,
        active_window_seconds: u64,
    ) -> Self {
        Self {
            ledger,
            visitors,
            activity,
            feedback,
            dispatcher,
            clock,
            active_window_seconds,
        }
    }

    /// Record one heartbeat and broadcast the refreshed activity cards.
    ///
    /// The heartbeat write is the durable part; the three card broadcasts
    /// are best-effort.
    pub async fn record_heartbeat(&self, user_key: &str, now: DateTime<Utc>) -> AppResult<()> {
        self.activity.record(user_key, now).await?;

        for kind in [
            CardKind::ActiveUsersNow,
            CardKind::UsersToday,
            CardKind::UsersLast6Hours,
        ] {
            match self.card(kind, now).await {
                Ok(card) => {
                    if let Err(e) = self.dispatcher.publish(&card, now).await {
                        warn!(card = %kind, error = %e, "Activity card broadcast failed");
                    }
                }
                Err(e) => warn!(card = %kind, error = %e, "Activity card computation failed"),
            }
        }

        Ok(())
    }

    /// Compute the current payload for a named card.
    pub async fn card(&self, kind: CardKind, now: DateTime<Utc>) -> AppResult<DashboardCard> {
        let data = match kind {
            CardKind::VisitorCheckin => {
                let recent = self.ledger.recent_checkins(5).await?;
                serde_json::json!(
                    recent
                        .iter()
                        .map(|invite| {
                            serde_json::json!({
                                "visitor_name": invite.visitor_name,
                                "checkin_time": invite.checkin_time,
                            })
                        })
                        .collect::<Vec<_>>()
                )
            }
            CardKind::TodayInvitations => {
                let total = self.ledger.count_for_date(self.clock.local_date(now)).await?;
                serde_json::json!({ "total": total })
            }
            CardKind::TotalVisitors => {
                let total = self.visitors.count_all().await?;
                serde_json::json!({ "total_visitors": total })
            }
            CardKind::VisitorComment => {
                let recent = self.feedback.list_recent(1).await?;
                match recent.first() {
                    Some(f) => serde_json::json!({
                        "comment": format!("\"{}\" - {}", f.comment_text, f.name),
                    }),
                    None => serde_json::json!({ "comment": serde_json::Value::Null }),
                }
            }
            CardKind::AvgFeedbackScore => {
                let avg = self.feedback.average_rating().await?.unwrap_or(0.0);
                let colored_stars = avg.floor() as i64;
                serde_json::json!({
                    "avg_score": (avg * 10.0).round() / 10.0,
                    "colored_stars": colored_stars,
                    "empty_stars": 5 - colored_stars,
                })
            }
            CardKind::ActiveUsersNow => {
                let cutoff = now - Duration::seconds(self.active_window_seconds as i64);
                let count = self.activity.distinct_users_since(cutoff).await?;
                serde_json::json!({ "count": count, "timestamp": now.timestamp() })
            }
            CardKind::UsersToday => {
                let count = self
                    .activity
                    .distinct_users_since(self.clock.day_start_utc(now))
                    .await?;
                serde_json::json!({ "count": count })
            }
            CardKind::UsersLast6Hours => {
                serde_json::json!({ "series": self.six_hour_series(now).await? })
            }
        };

        Ok(DashboardCard::new(kind, data))
    }

    /// Hourly distinct-user series over the last six hours, zero-filled so
    /// every hour label appears even when no one was active.
    async fn six_hour_series(&self, now: DateTime<Utc>) -> AppResult<Vec<serde_json::Value>> {
        let cutoff = now - Duration::hours(6);
        let buckets = self
            .activity
            .hourly_distinct_users(cutoff, self.clock.offset_hours())
            .await?;

        let by_hour: HashMap<String, i64> =
            buckets.into_iter().map(|b| (b.hour, b.count)).collect();

        Ok(self
            .clock
            .trailing_hour_labels(now, 6)
            .into_iter()
            .map(|hour| {
                let count = by_hour.get(&hour).copied().unwrap_or(0);
                serde_json::json!({ "hour": hour, "count": count })
            })
            .collect())
    }
}
