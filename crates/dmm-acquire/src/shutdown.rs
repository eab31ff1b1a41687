//! Cooperative cancellation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Granularity of interruptible sleeps
const SLEEP_SLICE: Duration = Duration::from_millis(50);

/// Shared stop request
///
/// Clones share the same flag; once requested it stays set.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag {
    requested: Arc<AtomicBool>,
}

impl ShutdownFlag {
    /// Create an unset flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Whether a stop was requested
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Sleep for `duration`, waking early on a stop request
    ///
    /// Returns `true` if the full duration elapsed without a request.
    pub fn sleep(&self, duration: Duration) -> bool {
        let started = Instant::now();
        while !self.is_requested() {
            let elapsed = started.elapsed();
            if elapsed >= duration {
                return true;
            }
            thread::sleep(SLEEP_SLICE.min(duration - elapsed));
        }
        false
    }
}
