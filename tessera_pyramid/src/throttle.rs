// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trailing-edge coalescing for the all-loaded notification.

/// Coalesces bursts of triggers into one firing at the end of a time window.
///
/// The first [`arm`](Self::arm) sets a deadline `window` ms later; further arms before
/// the deadline are absorbed. [`poll`](Self::poll) reports the deadline once it has
/// passed. Time is supplied by the host in milliseconds.
///
/// ```
/// use tessera_pyramid::AllLoadedThrottle;
///
/// let mut t = AllLoadedThrottle::new(200);
/// t.arm(1_000);
/// t.arm(1_150);
/// assert!(!t.poll(1_199));
/// assert!(t.poll(1_200));
/// assert!(!t.poll(1_400));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllLoadedThrottle {
    window: u64,
    deadline: Option<u64>,
}

impl AllLoadedThrottle {
    /// Creates an idle throttle with the given window.
    #[must_use]
    pub const fn new(window_ms: u64) -> Self {
        Self {
            window: window_ms,
            deadline: None,
        }
    }

    /// Coalescing window in ms.
    #[must_use]
    pub const fn window(&self) -> u64 {
        self.window
    }

    /// Pending deadline, if armed.
    #[must_use]
    pub const fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    /// Requests a firing. Keeps an existing deadline.
    pub fn arm(&mut self, now_ms: u64) {
        if self.deadline.is_none() {
            self.deadline = Some(now_ms.saturating_add(self.window));
        }
    }

    /// Drops any pending firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns `true` once the deadline has passed, and disarms.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
