//! # gatehouse-worker
//!
//! Background execution of deferred tasks: feedback invitations after
//! check-in, connection registry pruning, and retention cleanup. Jobs are
//! durable rows claimed from the queue table, so side effects survive
//! process restarts and retry with at-least-once semantics.

pub mod executor;
pub mod jobs;
pub mod runner;
pub mod scheduler;

pub use executor::{JobExecutionError, JobExecutor, JobHandler};
pub use runner::WorkerRunner;
pub use scheduler::PeriodicScheduler;
