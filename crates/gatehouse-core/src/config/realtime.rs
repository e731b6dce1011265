//! Real-time dashboard fan-out configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) fan-out configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Connection lifetime without a heartbeat, in seconds.
    #[serde(default = "default_connection_ttl")]
    pub connection_ttl_seconds: u64,
    /// Per-connection outbound buffer size.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Window for counting a user as currently active, in seconds.
    #[serde(default = "default_active_window")]
    pub heartbeat_active_window_seconds: u64,
    /// How long activity heartbeat samples are retained, in hours.
    #[serde(default = "default_activity_retention")]
    pub activity_retention_hours: u32,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            connection_ttl_seconds: default_connection_ttl(),
            channel_buffer_size: default_channel_buffer(),
            heartbeat_active_window_seconds: default_active_window(),
            activity_retention_hours: default_activity_retention(),
        }
    }
}

fn default_connection_ttl() -> u64 {
    600
}

fn default_channel_buffer() -> usize {
    256
}

fn default_active_window() -> u64 {
    300
}

fn default_activity_retention() -> u32 {
    6
}
