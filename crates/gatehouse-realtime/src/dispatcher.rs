//! Broadcast dispatcher — fans a card out to every live connection and
//! self-heals the registry.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use gatehouse_core::result::AppResult;
use gatehouse_core::traits::transport::{CardTransport, DeliveryOutcome};

use crate::card::{CardKind, DashboardCard};
use crate::registry::ConnectionRegistry;

/// Aggregate counts reported from one publish call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PublishReport {
    /// Connections the card reached.
    pub delivered: usize,
    /// Connections evicted as gone or expired.
    pub pruned: usize,
}

/// Delivers dashboard updates to every registered connection.
///
/// Delivery is at-most-once per update, best-effort, no retry: connections
/// that join mid-broadcast are not guaranteed this update, and individual
/// failures never fail the publish as a whole.
#[derive(Clone)]
pub struct BroadcastDispatcher {
    registry: Arc<ConnectionRegistry>,
    transport: Arc<dyn CardTransport>,
}

impl BroadcastDispatcher {
    /// Create a dispatcher over the given registry and transport.
    pub fn new(registry: Arc<ConnectionRegistry>, transport: Arc<dyn CardTransport>) -> Self {
        Self {
            registry,
            transport,
        }
    }

    /// Parse a wire-named card and publish it.
    ///
    /// Fails with `UnknownCardKind` before any delivery is attempted —
    /// malformed cards indicate an upstream bug and must not be broadcast.
    pub async fn publish_named(
        &self,
        kind: &str,
        data: serde_json::Value,
        now: DateTime<Utc>,
    ) -> AppResult<PublishReport> {
        let kind: CardKind = kind.parse()?;
        self.publish(&DashboardCard::new(kind, data), now).await
    }

    /// Deliver a card to a snapshot of the currently live connections.
    ///
    /// A delivery that reports `Gone` evicts that connection immediately and
    /// continues with the rest; transient failures leave the connection
    /// registered. Expired entries are swept before the snapshot is taken.
    pub async fn publish(
        &self,
        card: &DashboardCard,
        now: DateTime<Utc>,
    ) -> AppResult<PublishReport> {
        let payload = serde_json::to_string(card)?;

        let mut report = PublishReport {
            delivered: 0,
            pruned: self.registry.prune_expired(now),
        };

        let snapshot = self.registry.list_live(now);
        for conn in &snapshot {
            match self.transport.deliver(conn.id, &payload).await {
                DeliveryOutcome::Delivered => report.delivered += 1,
                DeliveryOutcome::Gone => {
                    self.registry.remove(conn.id);
                    report.pruned += 1;
                    debug!(conn_id = %conn.id, "Evicted gone connection during broadcast");
                }
                DeliveryOutcome::TransientError => {
                    warn!(
                        conn_id = %conn.id,
                        card = %card.kind,
                        "Transient delivery failure, connection kept"
                    );
                }
            }
        }

        debug!(
            card = %card.kind,
            delivered = report.delivered,
            pruned = report.pruned,
            "Card broadcast complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use dashmap::DashMap;
    use gatehouse_core::error::ErrorKind;
    use gatehouse_core::types::id::ConnectionId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    /// Transport fake with scripted per-connection outcomes.
    #[derive(Debug, Default)]
    struct ScriptedTransport {
        outcomes: DashMap<ConnectionId, DeliveryOutcome>,
        attempts: AtomicUsize,
    }

    #[async_trait]
    impl CardTransport for ScriptedTransport {
        async fn deliver(&self, connection_id: ConnectionId, _payload: &str) -> DeliveryOutcome {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            self.outcomes
                .get(&connection_id)
                .map(|o| *o)
                .unwrap_or(DeliveryOutcome::Delivered)
        }
    }

    fn channel() -> mpsc::Sender<String> {
        mpsc::channel(8).0
    }

    fn setup(n: usize) -> (Arc<ConnectionRegistry>, Vec<ConnectionId>) {
        let registry = Arc::new(ConnectionRegistry::new());
        let now = Utc::now();
        let ids: Vec<ConnectionId> = (0..n)
            .map(|_| {
                let id = ConnectionId::new();
                registry.add(id, channel(), now, Duration::seconds(600));
                id
            })
            .collect();
        (registry, ids)
    }

    fn checkin_card() -> DashboardCard {
        DashboardCard::new(
            CardKind::VisitorCheckin,
            serde_json::json!({"visitor_name": "Amira"}),
        )
    }

    #[tokio::test]
    async fn test_unknown_card_rejected_before_delivery() {
        let (registry, _ids) = setup(3);
        let transport = Arc::new(ScriptedTransport::default());
        let dispatcher = BroadcastDispatcher::new(registry, transport.clone());

        let err = dispatcher
            .publish_named("bogus", serde_json::json!({}), Utc::now())
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::UnknownCardKind);
        assert_eq!(transport.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_gone_connection_is_evicted_and_rest_delivered() {
        let (registry, ids) = setup(3);
        let transport = Arc::new(ScriptedTransport::default());
        transport.outcomes.insert(ids[1], DeliveryOutcome::Gone);
        let dispatcher = BroadcastDispatcher::new(registry.clone(), transport);

        let report = dispatcher.publish(&checkin_card(), Utc::now()).await.unwrap();

        assert_eq!(report.delivered, 2);
        assert_eq!(report.pruned, 1);
        assert!(registry.get(ids[1]).is_none());
        assert_eq!(registry.list_live(Utc::now()).len(), 2);
    }

    #[tokio::test]
    async fn test_transient_failure_keeps_connection() {
        let (registry, ids) = setup(2);
        let transport = Arc::new(ScriptedTransport::default());
        transport
            .outcomes
            .insert(ids[0], DeliveryOutcome::TransientError);
        let dispatcher = BroadcastDispatcher::new(registry.clone(), transport);

        let report = dispatcher.publish(&checkin_card(), Utc::now()).await.unwrap();

        assert_eq!(report.delivered, 1);
        assert_eq!(report.pruned, 0);
        assert!(registry.get(ids[0]).is_some());
    }

    #[tokio::test]
    async fn test_expired_connection_not_delivered_to() {
        let registry = Arc::new(ConnectionRegistry::new());
        let now = Utc::now();
        let stale = ConnectionId::new();
        registry.add(stale, channel(), now - Duration::seconds(700), Duration::seconds(600));

        let transport = Arc::new(ScriptedTransport::default());
        let dispatcher = BroadcastDispatcher::new(registry.clone(), transport.clone());

        let report = dispatcher.publish(&checkin_card(), now).await.unwrap();

        assert_eq!(report.delivered, 0);
        assert_eq!(report.pruned, 1);
        assert_eq!(transport.attempts.load(Ordering::SeqCst), 0);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_publish_with_no_connections_is_ok() {
        let registry = Arc::new(ConnectionRegistry::new());
        let transport = Arc::new(ScriptedTransport::default());
        let dispatcher = BroadcastDispatcher::new(registry, transport);

        let report = dispatcher.publish(&checkin_card(), Utc::now()).await.unwrap();
        assert_eq!(report.delivered, 0);
        assert_eq!(report.pruned, 0);
    }
}
