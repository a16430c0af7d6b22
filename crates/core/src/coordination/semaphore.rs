// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded counter capping concurrent executions per queue
//!
//! The maximum is supplied by each caller rather than stored, so different
//! producers can tighten or relax a queue's limit without a migration.

use super::MAX_CAS_ATTEMPTS;
use crate::error::CoordinationError;
use crate::store::{encode, Expect, Store, WriteOutcome};
use serde::{Deserialize, Serialize};

/// Stored counter value
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemaphoreRecord {
    pub key: String,
    pub count: u64,
}

/// Store-backed semaphore
#[derive(Clone, Debug)]
pub struct Semaphore<S> {
    store: S,
}

impl<S: Store> Semaphore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn record_key(key: &str) -> String {
        format!("semaphore/{}", key)
    }

    /// Current count for `key` (0 if never incremented)
    pub async fn count(&self, key: &str) -> Result<u64, CoordinationError> {
        let record = self.store.get(&Self::record_key(key)).await?;
        match record {
            Some(r) => Ok(r.decode::<SemaphoreRecord>()?.count),
            None => Ok(0),
        }
    }

    /// Take a slot if fewer than `maximum` are held; returns the new count
    pub async fn up(&self, key: &str, maximum: u64) -> Result<u64, CoordinationError> {
        let record_key = Self::record_key(key);

        for _ in 0..MAX_CAS_ATTEMPTS {
            let current = self.store.get(&record_key).await?;
            let count = match &current {
                Some(r) => r.decode::<SemaphoreRecord>()?.count,
                None => 0,
            };

            if count >= maximum {
                tracing::warn!(key, count, maximum, "semaphore at maximum");
                return Err(CoordinationError::ResourcesLocked(format!(
                    "semaphore {} is at its maximum of {}",
                    key, maximum
                )));
            }

            let next = SemaphoreRecord {
                key: key.to_string(),
                count: count + 1,
            };
            let outcome = self
                .store
                .put(&record_key, Expect::current(current.as_ref()), encode(&next)?)
                .await
                .inspect_err(|e| tracing::error!(key, error = %e, "semaphore increment failed"))?;

            match outcome {
                WriteOutcome::Applied(_) => {
                    tracing::info!(key, count = next.count, maximum, "semaphore up");
                    return Ok(next.count);
                }
                WriteOutcome::Conflict => {
                    tracing::debug!(key, "semaphore changed concurrently, retrying");
                }
            }
        }

        tracing::warn!(key, "semaphore contention exhausted retries");
        Err(CoordinationError::ResourcesLocked(format!(
            "semaphore {} is under contention",
            key
        )))
    }

    /// Release a slot; fails without changing anything when the count is 0
    pub async fn down(&self, key: &str) -> Result<u64, CoordinationError> {
        let record_key = Self::record_key(key);

        for _ in 0..MAX_CAS_ATTEMPTS {
            let current = self.store.get(&record_key).await?;
            let Some(record) = current else {
                return Err(Self::underflow(key));
            };
            let count = record.decode::<SemaphoreRecord>()?.count;
            if count == 0 {
                return Err(Self::underflow(key));
            }

            let next = SemaphoreRecord {
                key: key.to_string(),
                count: count - 1,
            };
            let outcome = self
                .store
                .put(&record_key, Expect::Version(record.version), encode(&next)?)
                .await
                .inspect_err(|e| tracing::error!(key, error = %e, "semaphore decrement failed"))?;

            if outcome.is_applied() {
                tracing::info!(key, count = next.count, "semaphore down");
                return Ok(next.count);
            }
            tracing::debug!(key, "semaphore changed concurrently, retrying");
        }

        tracing::warn!(key, "semaphore contention exhausted retries");
        Err(CoordinationError::ResourcesLocked(format!(
            "semaphore {} is under contention",
            key
        )))
    }

    fn underflow(key: &str) -> CoordinationError {
        tracing::error!(key, "semaphore decrement below zero refused");
        CoordinationError::SemaphoreUnderflow {
            key: key.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "semaphore_tests.rs"]
mod tests;
