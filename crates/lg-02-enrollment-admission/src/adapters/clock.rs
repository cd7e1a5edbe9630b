//! Manually driven time source.

use crate::ports::outbound::TimeSource;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Time source that only moves when told to.
#[derive(Debug)]
pub struct ManualTimeSource {
    now: Mutex<Instant>,
}

impl ManualTimeSource {
    pub fn new(start: Instant) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    pub fn set(&self, at: Instant) {
        *self.now.lock() = at;
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}
