//! Random Source Port
//!
//! Injectable uniform randomness for the execution simulator. Production
//! wiring uses a seeded or entropy-backed generator; tests pin the draws.

use std::time::Duration;

/// Source of uniform draws in `[0, 1)`.
pub trait RandomSource: Send + Sync {
    /// Next uniform draw in `[0, 1)`.
    fn next_f64(&self) -> f64;

    /// `base + draw x jitter`, in milliseconds.
    fn jittered(&self, base_ms: u64, jitter_ms: u64) -> Duration {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let extra = (self.next_f64().clamp(0.0, 1.0) * jitter_ms as f64) as u64;
        Duration::from_millis(base_ms + extra.min(jitter_ms))
    }
}
