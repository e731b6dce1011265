//! Connection registry — tracks live dashboard subscribers.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use gatehouse_core::types::id::ConnectionId;

/// A handle to a single live dashboard connection.
///
/// Holds the sender channel for pushing serialized cards to the client,
/// plus liveness metadata. Timestamps are epoch-millis atomics so the
/// registry can be read and refreshed without locking.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID, assigned by the transport layer on connect.
    pub id: ConnectionId,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Last heartbeat or activity, epoch millis.
    last_seen_ms: AtomicI64,
    /// Liveness deadline, epoch millis.
    expires_ms: AtomicI64,
    /// Sender for outbound serialized cards.
    pub sender: mpsc::Sender<String>,
}

impl ConnectionHandle {
    fn new(
        id: ConnectionId,
        sender: mpsc::Sender<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            id,
            connected_at: now,
            last_seen_ms: AtomicI64::new(now.timestamp_millis()),
            expires_ms: AtomicI64::new((now + ttl).timestamp_millis()),
            sender,
        }
    }

    /// Refresh the liveness deadline.
    pub fn refresh(&self, now: DateTime<Utc>, ttl: Duration) {
        self.last_seen_ms
            .store(now.timestamp_millis(), Ordering::Relaxed);
        self.expires_ms
            .store((now + ttl).timestamp_millis(), Ordering::Relaxed);
    }

    /// Whether the liveness deadline has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_ms.load(Ordering::Relaxed) <= now.timestamp_millis()
    }

    /// Last observed activity.
    pub fn last_seen_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.last_seen_ms.load(Ordering::Relaxed))
            .unwrap_or(self.connected_at)
    }

    /// Current liveness deadline.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.expires_ms.load(Ordering::Relaxed))
            .unwrap_or(self.connected_at)
    }

    /// Serializable snapshot of this connection's metadata.
    pub fn info(&self) -> ConnectionInfo {
        ConnectionInfo {
            id: self.id,
            connected_at: self.connected_at,
            last_seen_at: self.last_seen_at(),
            expires_at: self.expires_at(),
        }
    }
}

/// Snapshot of connection metadata (serializable).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Connection ID.
    pub id: ConnectionId,
    /// Connected at.
    pub connected_at: DateTime<Utc>,
    /// Last seen at.
    pub last_seen_at: DateTime<Utc>,
    /// Liveness deadline.
    pub expires_at: DateTime<Utc>,
}

/// Thread-safe registry of all live dashboard connections.
///
/// Membership changes concurrently with broadcast enumeration; readers take
/// a snapshot and evict stale entries as they observe them, so no global
/// lock is ever held.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a connection, or refresh it if the ID is already present.
    ///
    /// Re-registering replaces the sender, so a reconnect under the same ID
    /// never leaves two entries behind.
    pub fn add(
        &self,
        id: ConnectionId,
        sender: mpsc::Sender<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Arc<ConnectionHandle> {
        let handle = Arc::new(ConnectionHandle::new(id, sender, now, ttl));
        self.connections.insert(id, handle.clone());
        debug!(conn_id = %id, "Dashboard connection registered");
        handle
    }

    /// Refresh a connection's liveness deadline on heartbeat.
    ///
    /// Silent no-op when the connection is unknown (already pruned).
    pub fn touch(&self, id: ConnectionId, now: DateTime<Utc>, ttl: Duration) {
        if let Some(handle) = self.connections.get(&id) {
            handle.refresh(now, ttl);
        }
    }

    /// Remove a connection. Idempotent.
    pub fn remove(&self, id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let removed = self.connections.remove(&id).map(|(_, h)| h);
        if removed.is_some() {
            debug!(conn_id = %id, "Dashboard connection removed");
        }
        removed
    }

    /// Snapshot of all non-expired connections. Does not mutate.
    pub fn list_live(&self, now: DateTime<Utc>) -> Vec<Arc<ConnectionHandle>> {
        self.connections
            .iter()
            .filter(|entry| !entry.value().is_expired(now))
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Remove every connection whose deadline has passed; returns the count.
    pub fn prune_expired(&self, now: DateTime<Utc>) -> usize {
        let expired: Vec<ConnectionId> = self
            .connections
            .iter()
            .filter(|entry| entry.value().is_expired(now))
            .map(|entry| *entry.key())
            .collect();

        for id in &expired {
            self.connections.remove(id);
        }

        if !expired.is_empty() {
            debug!(count = expired.len(), "Pruned expired dashboard connections");
        }
        expired.len()
    }

    /// Look up a connection by ID.
    pub fn get(&self, id: ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.connections.get(&id).map(|entry| entry.value().clone())
    }

    /// Total registered connections, expired entries included.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ttl() -> Duration {
        Duration::seconds(600)
    }

    fn channel() -> mpsc::Sender<String> {
        mpsc::channel(8).0
    }

    #[tokio::test]
    async fn test_add_is_upsert() {
        let registry = ConnectionRegistry::new();
        let id = ConnectionId::new();
        let now = Utc::now();

        registry.add(id, channel(), now, ttl());
        registry.add(id, channel(), now, ttl());

        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_touch_unknown_is_noop() {
        let registry = ConnectionRegistry::new();
        registry.touch(ConnectionId::new(), Utc::now(), ttl());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_expired_excluded_from_live_and_pruned() {
        let registry = ConnectionRegistry::new();
        let now = Utc::now();

        let fresh = ConnectionId::new();
        let stale = ConnectionId::new();
        registry.add(fresh, channel(), now, ttl());
        registry.add(stale, channel(), now - Duration::seconds(700), ttl());

        let live = registry.list_live(now);
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].id, fresh);

        assert_eq!(registry.prune_expired(now), 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.get(stale).is_none());
    }

    #[tokio::test]
    async fn test_heartbeat_extends_deadline() {
        let registry = ConnectionRegistry::new();
        let id = ConnectionId::new();
        let start = Utc::now();

        registry.add(id, channel(), start, Duration::seconds(10));

        let later = start + Duration::seconds(8);
        registry.touch(id, later, Duration::seconds(10));

        // Past the original deadline but within the refreshed one.
        let past_original = start + Duration::seconds(12);
        assert_eq!(registry.list_live(past_original).len(), 1);
        assert_eq!(registry.prune_expired(past_original), 0);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let id = ConnectionId::new();
        registry.add(id, channel(), Utc::now(), ttl());

        assert!(registry.remove(id).is_some());
        assert!(registry.remove(id).is_none());
    }
}
