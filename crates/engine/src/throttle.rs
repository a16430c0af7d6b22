// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Start-rate limiting shared between consumers
//!
//! Clones share one schedule, so consumers draining different queues split
//! a single `rate` between them. Slot `k` of a schedule falls at
//! `origin + k / rate`; a slot that has already passed restarts the schedule
//! at the current instant instead of granting a burst.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const NANOS_PER_SEC: u64 = 1_000_000_000;

#[derive(Debug)]
struct Schedule {
    origin: Instant,
    issued: u64,
}

#[derive(Clone, Debug)]
pub struct RateLimiter {
    rate: u64,
    deadline: Option<Instant>,
    schedule: Arc<Mutex<Option<Schedule>>>,
}

impl RateLimiter {
    /// Allow `rate` starts per second (0 is treated as 1)
    pub fn per_second(rate: u32) -> Self {
        Self {
            rate: u64::from(rate.max(1)),
            deadline: None,
            schedule: Arc::new(Mutex::new(None)),
        }
    }

    /// Refuse any slot at or after `deadline`
    pub fn until(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn rate(&self) -> u64 {
        self.rate
    }

    fn offset(&self, slot: u64) -> Duration {
        Duration::from_nanos(slot.saturating_mul(NANOS_PER_SEC) / self.rate)
    }

    /// Wait for the next start slot
    ///
    /// Returns false, without waiting, when that slot would fall at or after
    /// the deadline.
    pub async fn acquire(&self) -> bool {
        let slot = {
            let mut schedule = self.schedule.lock().await;
            let now = Instant::now();
            let slot = match schedule.as_ref() {
                Some(s) => s.origin + self.offset(s.issued),
                None => now,
            };
            let slot = if slot < now {
                *schedule = None;
                now
            } else {
                slot
            };
            if self.deadline.is_some_and(|deadline| slot >= deadline) {
                tracing::debug!(rate = self.rate, "no start slot left before deadline");
                return false;
            }
            let next = schedule.get_or_insert(Schedule {
                origin: slot,
                issued: 0,
            });
            next.issued += 1;
            slot
        };
        tokio::time::sleep_until(slot).await;
        true
    }
}

#[cfg(test)]
#[path = "throttle_tests.rs"]
mod tests;
