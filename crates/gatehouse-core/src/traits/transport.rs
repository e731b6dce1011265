//! Dashboard delivery transport boundary.

use async_trait::async_trait;

use crate::types::id::ConnectionId;

/// Result of one delivery attempt to one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The payload reached the connection's outbound buffer.
    Delivered,
    /// The connection is gone; the registry entry should be removed.
    Gone,
    /// A transient failure; the connection stays registered.
    TransientError,
}

/// Delivers a serialized card payload to a single dashboard connection.
#[async_trait]
pub trait CardTransport: Send + Sync {
    /// Attempt delivery; never blocks on a slow consumer.
    async fn deliver(&self, connection_id: ConnectionId, payload: &str) -> DeliveryOutcome;
}
