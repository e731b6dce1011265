//! Connection registry pruning job handler.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use gatehouse_entity::job::Job;
use gatehouse_realtime::ConnectionRegistry;

use crate::executor::{JobExecutionError, JobHandler};

/// Sweeps expired dashboard connections out of the registry.
///
/// The dispatcher already evicts expired entries on publish; this sweep
/// covers quiet periods with no broadcasts.
pub struct RegistryPruneHandler {
    registry: Arc<ConnectionRegistry>,
}

impl RegistryPruneHandler {
    /// Create a new handler.
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl JobHandler for RegistryPruneHandler {
    fn job_type(&self) -> &str {
        "registry_prune"
    }

    async fn execute(&self, _job: &Job) -> Result<(), JobExecutionError> {
        let pruned = self.registry.prune_expired(Utc::now());
        if pruned > 0 {
            debug!(pruned, "Registry prune sweep removed connections");
        }
        Ok(())
    }
}
