//! WebSocket-backed card transport.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::warn;

use gatehouse_core::traits::transport::{CardTransport, DeliveryOutcome};
use gatehouse_core::types::id::ConnectionId;

use crate::registry::ConnectionRegistry;

/// Delivers card payloads into per-connection outbound buffers.
///
/// The WebSocket handler drains each buffer into the socket; a closed
/// buffer means the socket task is gone and the connection should be
/// evicted, while a full buffer is a slow consumer we keep.
#[derive(Debug, Clone)]
pub struct WsCardTransport {
    registry: Arc<ConnectionRegistry>,
}

impl WsCardTransport {
    /// Create a transport over the given registry.
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl CardTransport for WsCardTransport {
    async fn deliver(&self, connection_id: ConnectionId, payload: &str) -> DeliveryOutcome {
        let Some(handle) = self.registry.get(connection_id) else {
            return DeliveryOutcome::Gone;
        };

        match handle.sender.try_send(payload.to_string()) {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(mpsc::error::TrySendError::Closed(_)) => DeliveryOutcome::Gone,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %connection_id, "Outbound buffer full, dropping card");
                DeliveryOutcome::TransientError
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_closed_receiver_reports_gone() {
        let registry = Arc::new(ConnectionRegistry::new());
        let transport = WsCardTransport::new(registry.clone());

        let id = ConnectionId::new();
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        registry.add(id, tx, Utc::now(), Duration::seconds(600));

        assert_eq!(transport.deliver(id, "{}").await, DeliveryOutcome::Gone);
    }

    #[tokio::test]
    async fn test_unknown_connection_reports_gone() {
        let registry = Arc::new(ConnectionRegistry::new());
        let transport = WsCardTransport::new(registry);

        let outcome = transport.deliver(ConnectionId::new(), "{}").await;
        assert_eq!(outcome, DeliveryOutcome::Gone);
    }

    #[tokio::test]
    async fn test_full_buffer_is_transient() {
        let registry = Arc::new(ConnectionRegistry::new());
        let transport = WsCardTransport::new(registry.clone());

        let id = ConnectionId::new();
        let (tx, _rx) = mpsc::channel(1);
        registry.add(id, tx, Utc::now(), Duration::seconds(600));

        assert_eq!(transport.deliver(id, "{}").await, DeliveryOutcome::Delivered);
        assert_eq!(
            transport.deliver(id, "{}").await,
            DeliveryOutcome::TransientError
        );
    }
}
