//! Adaptive producer sleep.
//!
//! One knob, shared by the single producer thread: every enqueue call that
//! finds a queue over capacity nudges the sleep up; every call that finds
//! all queues within capacity nudges it back down. The goal is a producer
//! that slows itself down exactly as much as the consumer is behind, no
//! more.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const STEP_MS: u64 = 10;
const CAP_MS: u64 = 1000;

/// Tracks the producer's current adaptive sleep duration.
pub struct AdaptiveSleep {
    current_ms: AtomicU64,
}

impl AdaptiveSleep {
    pub fn new() -> Self {
        Self {
            current_ms: AtomicU64::new(0),
        }
    }

    /// Current sleep duration, for tests and metrics.
    pub fn current(&self) -> Duration {
        Duration::from_millis(self.current_ms.load(Ordering::Relaxed))
    }

    /// Called when an enqueue attempt found a queue over capacity. Raises
    /// the sleep by `STEP_MS`, capped at `CAP_MS`; logs a warning once the
    /// cap itself is hit rather than on every subsequent call at the cap.
    pub fn back_off(&self) -> Duration {
        let previous = self.current_ms.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |ms| {
            Some((ms + STEP_MS).min(CAP_MS))
        });
        let new_ms = (previous.unwrap_or(0) + STEP_MS).min(CAP_MS);
        if new_ms >= CAP_MS {
            tracing::warn!(sleep_ms = new_ms, "producer adaptive sleep at cap, downstream consumer is falling behind");
        }
        Duration::from_millis(new_ms)
    }

    /// Called when an enqueue attempt found every queue within capacity.
    /// Lowers the sleep by `STEP_MS`, floored at zero.
    pub fn decay(&self) {
        let _ = self.current_ms.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |ms| {
            Some(ms.saturating_sub(STEP_MS))
        });
    }
}

impl Default for AdaptiveSleep {
    fn default() -> Self {
        Self::new()
    }
}
