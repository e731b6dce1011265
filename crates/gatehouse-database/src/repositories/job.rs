//! Job repository implementation.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_entity::job::{CreateJob, Job};

/// Repository for the deferred-task queue table.
#[derive(Debug, Clone)]
pub struct JobRepository {
    pool: PgPool,
}

impl JobRepository {
    /// Create a new job repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Enqueue a new job.
    pub async fn create(&self, data: &CreateJob) -> AppResult<Job> {
        sqlx::query_as::<_, Job>(
            "INSERT INTO jobs (job_type, payload, max_attempts, scheduled_at) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&data.job_type)
        .bind(&data.payload)
        .bind(data.max_attempts)
        .bind(data.scheduled_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create job", e))
    }

    /// Claim the next runnable job.
    ///
    /// `FOR UPDATE SKIP LOCKED` lets multiple workers poll the same table
    /// without handing the same job to two of them.
    pub async fn claim_next(&self) -> AppResult<Option<Job>> {
        sqlx::query_as::<_, Job>(
            "UPDATE jobs SET status = 'running', attempts = attempts + 1, updated_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM jobs \
                 WHERE status = 'pending' \
                   AND (scheduled_at IS NULL OR scheduled_at <= NOW()) \
                 ORDER BY created_at \
                 LIMIT 1 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING *",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to claim job", e))
    }

    /// Mark a job as completed.
    pub async fn mark_completed(&self, job_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE jobs SET status = 'completed', updated_at = NOW() WHERE id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to complete job", e)
            })?;
        Ok(())
    }

    /// Mark a job as failed permanently.
    pub async fn mark_failed(&self, job_id: Uuid, error: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE jobs SET status = 'failed', last_error = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(job_id)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fail job", e))?;
        Ok(())
    }

    /// Return a failed attempt to the pending state for retry.
    pub async fn reschedule(&self, job_id: Uuid, error: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE jobs SET status = 'pending', last_error = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(job_id)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reschedule job", e))?;
        Ok(())
    }

    /// Delete completed/failed jobs older than the given age in hours.
    pub async fn cleanup_finished(&self, older_than_hours: i64) -> AppResult<u64> {
        let cutoff = Utc::now() - chrono::Duration::hours(older_than_hours);
        let result = sqlx::query(
            "DELETE FROM jobs WHERE status IN ('completed', 'failed') AND updated_at < $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to clean up jobs", e))?;
        Ok(result.rows_affected())
    }
}
