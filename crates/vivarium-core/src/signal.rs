//! Shutdown signal checked by the scheduler once per round.

use std::sync::atomic::{AtomicBool, Ordering};

/// Sharable stop flag for the tick loop.
///
/// Wrapped in an [`Arc`] and shared between the scheduler thread and
/// whatever requests shutdown (a Ctrl-C handler, a test, a module).
/// The scheduler reads it lock-free at the top of every round.
///
/// [`Arc`]: std::sync::Arc
#[derive(Debug, Default)]
pub struct ShutdownSignal {
    /// Whether a stop has been requested.
    stop_requested: AtomicBool,
}

impl ShutdownSignal {
    /// Create a signal with no stop requested.
    pub const fn new() -> Self {
        Self {
            stop_requested: AtomicBool::new(false),
        }
    }

    /// Request that the scheduler stop before its next round.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_starts_clear_and_latches() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_stop_requested());

        signal.request_stop();
        assert!(signal.is_stop_requested());

        // Requesting again keeps it latched.
        signal.request_stop();
        assert!(signal.is_stop_requested());
    }
}
