//! Worker runner — main loop that polls for jobs and executes them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing;

use gatehouse_core::config::worker::WorkerConfig;
use gatehouse_database::repositories::job::JobRepository;

use crate::executor::{JobExecutionError, JobExecutor};

/// Main worker loop: claims queued jobs and dispatches them with bounded
/// concurrency until the shutdown signal arrives.
pub struct WorkerRunner {
    repo: Arc<JobRepository>,
    executor: Arc<JobExecutor>,
    config: WorkerConfig,
}

impl WorkerRunner {
    /// Create a new worker runner.
    pub fn new(repo: Arc<JobRepository>, executor: Arc<JobExecutor>, config: WorkerConfig) -> Self {
        Self {
            repo,
            executor,
            config,
        }
    }

    /// Run until the cancel signal is received.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        tracing::info!(
            concurrency = self.config.concurrency,
            poll_interval = self.config.poll_interval_seconds,
            "Worker started"
        );

        let semaphore = Arc::new(tokio::sync::Semaphore::new(
            self.config.concurrency as usize,
        ));
        let poll_interval = Duration::from_secs(self.config.poll_interval_seconds);

        loop {
            if *cancel.borrow() {
                break;
            }

            let claimed = self.poll_and_execute(&semaphore).await;

            // Busy queues drain back-to-back; an idle queue sleeps a tick.
            if !claimed {
                tokio::select! {
                    _ = cancel.changed() => {
                        if *cancel.borrow() {
                            break;
                        }
                    }
                    _ = time::sleep(poll_interval) => {}
                }
            }
        }

        tracing::info!("Worker waiting for in-flight jobs to complete...");
        let max_permits = self.config.concurrency;
        let _ = tokio::time::timeout(
            Duration::from_secs(30),
            semaphore.acquire_many(max_permits),
        )
        .await;
        tracing::info!("Worker shut down");
    }

    /// Claim one job and execute it on its own task. Returns whether a job
    /// was claimed.
    async fn poll_and_execute(&self, semaphore: &Arc<tokio::sync::Semaphore>) -> bool {
        let permit = match semaphore.clone().try_acquire_owned() {
            Ok(p) => p,
            Err(_) => return false,
        };

        match self.repo.claim_next().await {
            Ok(Some(job)) => {
                let repo = Arc::clone(&self.repo);
                let executor = Arc::clone(&self.executor);

                tokio::spawn(async move {
                    let _permit = permit;
                    let job_id = job.id;

                    match executor.execute(&job).await {
                        Ok(()) => {
                            if let Err(e) = repo.mark_completed(job_id).await {
                                tracing::error!("Failed to mark job {} completed: {}", job_id, e);
                            }
                        }
                        Err(JobExecutionError::Transient(msg)) => {
                            tracing::warn!("Job {} failed (transient): {}", job_id, msg);
                            let result = if job.can_retry() {
                                repo.reschedule(job_id, &msg).await
                            } else {
                                repo.mark_failed(job_id, &msg).await
                            };
                            if let Err(e) = result {
                                tracing::error!("Failed to update job {}: {}", job_id, e);
                            }
                        }
                        Err(JobExecutionError::Permanent(msg)) => {
                            tracing::error!("Job {} failed permanently: {}", job_id, msg);
                            if let Err(e) = repo.mark_failed(job_id, &msg).await {
                                tracing::error!("Failed to mark job {} failed: {}", job_id, e);
                            }
                        }
                        Err(JobExecutionError::Internal(err)) => {
                            let msg = err.to_string();
                            tracing::error!("Job {} internal error: {}", job_id, msg);
                            if let Err(e) = repo.mark_failed(job_id, &msg).await {
                                tracing::error!("Failed to mark job {} failed: {}", job_id, e);
                            }
                        }
                    }
                });
                true
            }
            Ok(None) => {
                drop(permit);
                false
            }
            Err(e) => {
                drop(permit);
                tracing::error!("Failed to claim job: {}", e);
                false
            }
        }
    }
}
