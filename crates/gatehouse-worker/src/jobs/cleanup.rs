//! Retention cleanup job handler.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::info;

use gatehouse_database::repositories::activity::ActivityRepository;
use gatehouse_database::repositories::job::JobRepository;
use gatehouse_entity::job::Job;

use crate::executor::{JobExecutionError, JobHandler};

/// Deletes heartbeat samples past their retention window and finished jobs
/// older than a day.
pub struct RetentionCleanupHandler {
    activity: Arc<ActivityRepository>,
    jobs: Arc<JobRepository>,
    activity_retention_hours: u32,
}

impl RetentionCleanupHandler {
    /// Create a new handler.
    pub fn new(
        activity: Arc<ActivityRepository>,
        jobs: Arc<JobRepository>,
        activity_retention_hours: u32,
    ) -> Self {
        Self {
            activity,
            jobs,
            activity_retention_hours,
        }
    }
}

#[async_trait]
impl JobHandler for RetentionCleanupHandler {
    fn job_type(&self) -> &str {
        "retention_cleanup"
    }

    async fn execute(&self, _job: &Job) -> Result<(), JobExecutionError> {
        let cutoff = Utc::now() - Duration::hours(self.activity_retention_hours as i64);
        let heartbeats = self.activity.delete_older_than(cutoff).await?;
        let finished_jobs = self.jobs.cleanup_finished(24).await?;

        if heartbeats > 0 || finished_jobs > 0 {
            info!(heartbeats, finished_jobs, "Retention cleanup complete");
        }
        Ok(())
    }
}
