//! Paper execution (fill simulator) configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tuning of the simulated market a paper child executes against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperConfig {
    /// Probability a slice fills in full.
    #[serde(default = "default_liquidity")]
    pub liquidity: f64,
    /// Maximum slippage on market-style fills, in percent.
    #[serde(default = "default_max_slippage_pct")]
    pub max_slippage_pct: Decimal,
    /// Minimum placement latency.
    #[serde(default = "default_placement_latency_ms")]
    pub placement_latency_ms: u64,
    /// Random extra placement latency.
    #[serde(default = "default_placement_jitter_ms")]
    pub placement_jitter_ms: u64,
    /// Stop trigger poll interval.
    #[serde(default = "default_trigger_poll_ms")]
    pub trigger_poll_ms: u64,
    /// Give up waiting for a stop trigger after this long.
    #[serde(default = "default_trigger_timeout_ms")]
    pub trigger_timeout_ms: u64,
    /// Pause before retrying a slice the market did not absorb.
    #[serde(default = "default_liquidity_retry_ms")]
    pub liquidity_retry_ms: u64,
    /// Minimum pause between slices.
    #[serde(default = "default_slice_pacing_ms")]
    pub slice_pacing_ms: u64,
    /// Random extra pause between slices.
    #[serde(default = "default_slice_jitter_ms")]
    pub slice_jitter_ms: u64,
    /// Upper bound on slices per child.
    #[serde(default = "default_max_slices")]
    pub max_slices: u32,
    /// Quantity worked per slice before another slice is added.
    #[serde(default = "default_slice_unit_qty")]
    pub slice_unit_qty: u64,
    /// Consecutive empty liquidity draws before the child is cancelled.
    #[serde(default = "default_max_idle_retries")]
    pub max_idle_retries: u32,
}

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            liquidity: default_liquidity(),
            max_slippage_pct: default_max_slippage_pct(),
            placement_latency_ms: default_placement_latency_ms(),
            placement_jitter_ms: default_placement_jitter_ms(),
            trigger_poll_ms: default_trigger_poll_ms(),
            trigger_timeout_ms: default_trigger_timeout_ms(),
            liquidity_retry_ms: default_liquidity_retry_ms(),
            slice_pacing_ms: default_slice_pacing_ms(),
            slice_jitter_ms: default_slice_jitter_ms(),
            max_slices: default_max_slices(),
            slice_unit_qty: default_slice_unit_qty(),
            max_idle_retries: default_max_idle_retries(),
        }
    }
}

const fn default_liquidity() -> f64 {
    0.8
}

fn default_max_slippage_pct() -> Decimal {
    Decimal::new(25, 2)
}

const fn default_placement_latency_ms() -> u64 {
    80
}

const fn default_placement_jitter_ms() -> u64 {
    120
}

const fn default_trigger_poll_ms() -> u64 {
    250
}

const fn default_trigger_timeout_ms() -> u64 {
    10_000
}

const fn default_liquidity_retry_ms() -> u64 {
    60
}

const fn default_slice_pacing_ms() -> u64 {
    120
}

const fn default_slice_jitter_ms() -> u64 {
    240
}

const fn default_max_slices() -> u32 {
    5
}

const fn default_slice_unit_qty() -> u64 {
    1000
}

const fn default_max_idle_retries() -> u32 {
    50
}
