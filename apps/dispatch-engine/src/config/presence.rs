//! Presence registry configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Presence TTL and sweep cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceConfig {
    /// An account is online while its last heartbeat is younger than this.
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,
    /// How often stale entries are evicted.
    #[serde(default = "default_sweep_interval_ms")]
    pub sweep_interval_ms: u64,
}

impl PresenceConfig {
    /// Heartbeat TTL.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    /// Sweep interval.
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl_ms(),
            sweep_interval_ms: default_sweep_interval_ms(),
        }
    }
}

const fn default_ttl_ms() -> u64 {
    12_000
}

const fn default_sweep_interval_ms() -> u64 {
    default_ttl_ms() / 3
}
