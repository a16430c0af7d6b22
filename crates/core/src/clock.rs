// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling
//!
//! Coordination records carry wall-clock timestamps (lock expiry, token
//! creation) because they are compared by other processes, so the clock
//! exposes epoch milliseconds alongside a monotonic instant for elapsed-time
//! budgets.

use chrono::Utc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A clock that provides the current time
pub trait Clock: Clone + Send + Sync + 'static {
    /// Monotonic instant, used for local elapsed-time budgets
    fn now(&self) -> Instant;

    /// Milliseconds since the Unix epoch, used for records shared through the store
    fn epoch_ms(&self) -> u64;
}

/// Real system clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

#[derive(Debug)]
struct FakeTime {
    instant: Instant,
    epoch_ms: u64,
}

/// Fake clock for testing with controllable time
///
/// Both the monotonic instant and the epoch reading move together when
/// advanced.
#[derive(Clone, Debug)]
pub struct FakeClock {
    current: Arc<Mutex<FakeTime>>,
}

impl FakeClock {
    /// Epoch reading a fresh fake clock starts at (2024-01-01T00:00:00Z)
    pub const START_EPOCH_MS: u64 = 1_704_067_200_000;

    pub fn new() -> Self {
        Self::at_epoch_ms(Self::START_EPOCH_MS)
    }

    /// Create a fake clock reading the given epoch milliseconds
    pub fn at_epoch_ms(epoch_ms: u64) -> Self {
        Self {
            current: Arc::new(Mutex::new(FakeTime {
                instant: Instant::now(),
                epoch_ms,
            })),
        }
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        current.instant += duration;
        current.epoch_ms += u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).instant
    }

    fn epoch_ms(&self) -> u64 {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).epoch_ms
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
