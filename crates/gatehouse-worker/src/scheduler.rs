//! Periodic job enqueuer.
//!
//! Recurring maintenance (registry pruning, retention cleanup) goes through
//! the same durable queue as request-triggered work, so there is a single
//! execution path with retries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing;

use gatehouse_database::queue::TaskQueue;
use gatehouse_entity::job::CreateJob;

/// A job enqueued on a fixed interval.
#[derive(Debug, Clone)]
pub struct PeriodicTask {
    /// Job type to enqueue.
    pub job_type: String,
    /// Payload for each enqueued job.
    pub payload: serde_json::Value,
    /// Interval between enqueues.
    pub every: Duration,
}

/// Enqueues configured periodic tasks until shutdown.
pub struct PeriodicScheduler {
    queue: Arc<dyn TaskQueue>,
    tasks: Vec<PeriodicTask>,
}

impl PeriodicScheduler {
    /// Create a scheduler over the given queue.
    pub fn new(queue: Arc<dyn TaskQueue>, tasks: Vec<PeriodicTask>) -> Self {
        Self { queue, tasks }
    }

    /// Run one interval loop per task until the cancel signal arrives.
    pub async fn run(self, cancel: watch::Receiver<bool>) {
        let mut handles = Vec::new();

        for task in self.tasks {
            let queue = Arc::clone(&self.queue);
            let mut cancel = cancel.clone();

            handles.push(tokio::spawn(async move {
                let mut ticker = time::interval(task.every);
                // The immediate first tick would double up with startup work.
                ticker.tick().await;

                loop {
                    tokio::select! {
                        _ = cancel.changed() => {
                            if *cancel.borrow() {
                                break;
                            }
                        }
                        _ = ticker.tick() => {
                            let job = CreateJob {
                                job_type: task.job_type.clone(),
                                payload: task.payload.clone(),
                                max_attempts: 1,
                                scheduled_at: None,
                            };
                            if let Err(e) = queue.enqueue(&job).await {
                                tracing::warn!(
                                    job_type = %task.job_type,
                                    error = %e,
                                    "Failed to enqueue periodic task"
                                );
                            }
                        }
                    }
                }
            }));
        }

        for handle in handles {
            let _ = handle.await;
        }
    }
}
