//! Deferred-task queue contract.
//!
//! Primary operations return as soon as their durable write lands; anything
//! non-critical goes through this queue and runs on the background worker,
//! decoupled from the request's task lifetime.

use async_trait::async_trait;

use gatehouse_core::result::AppResult;
use gatehouse_entity::job::{CreateJob, Job};

use crate::repositories::job::JobRepository;

/// Enqueue-side of the deferred-task queue.
///
/// At-least-once semantics: the worker retries transient failures up to the
/// job's attempt budget. Callers never consume a return value.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Persist a job for the background worker.
    async fn enqueue(&self, job: &CreateJob) -> AppResult<Job>;
}

#[async_trait]
impl TaskQueue for JobRepository {
    async fn enqueue(&self, job: &CreateJob) -> AppResult<Job> {
        self.create(job).await
    }
}
