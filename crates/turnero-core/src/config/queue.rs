//! Queue policy configuration.

use serde::{Deserialize, Serialize};

/// Ticket queue policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum tickets an operator may keep in ESPERA concurrently.
    #[serde(default = "default_espera_cap")]
    pub espera_cap: u32,
    /// Maximum rows returned by the public display-calls query.
    #[serde(default = "default_display_calls_limit")]
    pub display_calls_limit: i64,
    /// Maximum rows returned by the operator queue listing.
    #[serde(default = "default_operator_queue_limit")]
    pub operator_queue_limit: i64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            espera_cap: default_espera_cap(),
            display_calls_limit: default_display_calls_limit(),
            operator_queue_limit: default_operator_queue_limit(),
        }
    }
}

fn default_espera_cap() -> u32 {
    3
}

fn default_display_calls_limit() -> i64 {
    20
}

fn default_operator_queue_limit() -> i64 {
    50
}
