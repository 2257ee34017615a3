//! Write coalescing for flash-backed state.
//!
//! Requests only mark state as dirty and remember when that happened. The
//! owner polls [`PersistDebounce::take_due`] from its regular tick and writes
//! once no new request arrived for a full window. There is no background
//! timer.

use embassy_time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct PersistDebounce {
    window: Duration,
    pending: bool,
    last_request: Instant,
}

impl PersistDebounce {
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            pending: false,
            last_request: Instant::from_ticks(0),
        }
    }

    /// Mark state dirty, restarting the quiet window
    pub fn request(&mut self, now: Instant) {
        self.pending = true;
        self.last_request = now;
    }

    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Returns `true` exactly once per burst of requests, after the window
    pub fn take_due(&mut self, now: Instant) -> bool {
        if !self.pending || now.saturating_duration_since(self.last_request) < self.window {
            return false;
        }
        self.pending = false;
        true
    }

    /// Drop any pending request
    pub fn cancel(&mut self) {
        self.pending = false;
    }
}
