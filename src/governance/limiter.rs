//! Per-minute request rate limiting.
//!
//! A fixed 60-second tumbling window: the first admission check at least a
//! minute after the window opened starts a new window with a zero count.
//! Admission is crate-private; only the request queue consumes slots.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::clock::Clock;

/// Length of one rate window.
pub const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Default admissions per window.
pub const DEFAULT_MAX_PER_MINUTE: u32 = 10;

/// Admissions within the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    pub count: u32,
    pub window_start: DateTime<Utc>,
}

impl RateWindow {
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            count: 0,
            window_start: now,
        }
    }

    /// The window as it should be at `now`.
    pub fn rolled_over(self, now: DateTime<Utc>) -> Self {
        let elapsed = now.signed_duration_since(self.window_start);
        match elapsed.to_std() {
            Ok(elapsed) if elapsed >= RATE_WINDOW => Self::fresh(now),
            // clock went backwards: keep the window rather than granting a fresh one
            _ => self,
        }
    }

    /// Roll over, then try to take a slot. Returns the new window and
    /// whether the request was admitted.
    pub fn admit(self, now: DateTime<Utc>, max_per_minute: u32) -> (Self, bool) {
        let window = self.rolled_over(now);
        if window.count < max_per_minute {
            (
                Self {
                    count: window.count + 1,
                    ..window
                },
                true,
            )
        } else {
            (window, false)
        }
    }

    /// Time until this window closes, measured from `now`.
    pub fn time_until_reset(&self, now: DateTime<Utc>) -> Duration {
        let elapsed = now
            .signed_duration_since(self.window_start)
            .to_std()
            .unwrap_or_default();
        RATE_WINDOW.saturating_sub(elapsed)
    }
}

/// Tumbling-window rate limiter.
pub struct RateLimiter {
    max_per_minute: u32,
    clock: Arc<dyn Clock>,
    window: Mutex<RateWindow>,
}

impl RateLimiter {
    pub fn new(max_per_minute: u32, clock: Arc<dyn Clock>) -> Self {
        let window = RateWindow::fresh(clock.now());
        Self {
            max_per_minute,
            clock,
            window: Mutex::new(window),
        }
    }

    pub fn max_per_minute(&self) -> u32 {
        self.max_per_minute
    }

    /// Take a slot in the current window if one is free.
    pub(crate) fn try_admit(&self) -> bool {
        let now = self.clock.now();
        let mut window = self.window.lock().unwrap_or_else(|e| e.into_inner());
        let (next, admitted) = window.admit(now, self.max_per_minute);
        *window = next;
        admitted
    }

    /// Slots left in the current window.
    pub fn remaining(&self) -> u32 {
        let window = self.snapshot();
        self.max_per_minute.saturating_sub(window.count)
    }

    /// Time until the current window closes.
    pub fn retry_after(&self) -> Duration {
        self.snapshot().time_until_reset(self.clock.now())
    }

    /// Current window after rollover. Does not take a slot.
    pub fn snapshot(&self) -> RateWindow {
        let now = self.clock.now();
        let window = self.window.lock().unwrap_or_else(|e| e.into_inner());
        window.rolled_over(now)
    }
}
