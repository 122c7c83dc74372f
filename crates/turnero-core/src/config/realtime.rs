//! Real-time WebSocket engine configuration.

use serde::{Deserialize, Serialize};

/// Real-time (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Maximum WebSocket connections per authenticated operator.
    #[serde(default = "default_max_connections_per_operator")]
    pub max_connections_per_operator: usize,
    /// Outbound per-connection message buffer size.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Event bus broadcast capacity.
    #[serde(default = "default_bus_capacity")]
    pub bus_capacity: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            max_connections_per_operator: default_max_connections_per_operator(),
            channel_buffer_size: default_channel_buffer(),
            bus_capacity: default_bus_capacity(),
        }
    }
}

fn default_max_connections_per_operator() -> usize {
    5
}

fn default_channel_buffer() -> usize {
    64
}

fn default_bus_capacity() -> usize {
    256
}
