//! Activity heartbeat repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_entity::activity::HourlyActivity;

/// Repository for dashboard-user activity samples.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    /// Create a new activity repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record one heartbeat observation.
    pub async fn record(&self, user_key: &str, observed_at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("INSERT INTO activity_heartbeats (user_key, observed_at) VALUES ($1, $2)")
            .bind(user_key)
            .bind(observed_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to record heartbeat", e)
            })?;
        Ok(())
    }

    /// Distinct users observed since `cutoff`.
    pub async fn distinct_users_since(&self, cutoff: DateTime<Utc>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(DISTINCT user_key) FROM activity_heartbeats WHERE observed_at >= $1",
        )
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count active users", e)
        })?;
        Ok(count)
    }

    /// Distinct users per facility-local hour since `cutoff`.
    ///
    /// Bucketing happens in the database; `offset_hours` shifts the
    /// timestamps so the labels come out in facility-local time.
    pub async fn hourly_distinct_users(
        &self,
        cutoff: DateTime<Utc>,
        offset_hours: i32,
    ) -> AppResult<Vec<HourlyActivity>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT to_char(date_trunc('hour', observed_at + make_interval(hours => $2)), \
                            'YYYY-MM-DD HH24:00') AS hour, \
                    COUNT(DISTINCT user_key) AS count \
             FROM activity_heartbeats \
             WHERE observed_at >= $1 \
             GROUP BY 1 ORDER BY 1",
        )
        .bind(cutoff)
        .bind(offset_hours)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to bucket activity", e)
        })?;

        Ok(rows
            .into_iter()
            .map(|(hour, count)| HourlyActivity { hour, count })
            .collect())
    }

    /// Delete samples older than `cutoff`; returns rows removed.
    pub async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM activity_heartbeats WHERE observed_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to prune heartbeats", e)
            })?;
        Ok(result.rows_affected())
    }
}
