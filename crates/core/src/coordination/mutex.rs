// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TTL-bounded named locks
//!
//! A lock record is live while `expire` is in the future. Expired records are
//! overwritten by the next acquirer, so a crashed holder never needs manual
//! cleanup once its TTL passes.

use crate::clock::Clock;
use crate::error::CoordinationError;
use crate::store::{encode, Expect, Store, StoreError, WriteOutcome};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Stored lock value
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    pub key: String,
    /// Epoch milliseconds after which the lock is free
    pub expire: u64,
    pub owner: String,
}

impl LockRecord {
    pub fn is_live(&self, now_ms: u64) -> bool {
        self.expire > now_ms
    }
}

/// Result of comparing a token against the stored owner
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OwnerCheck {
    NoLock,
    Match,
    Conflict(String),
}

/// Store-backed lock manager
#[derive(Clone, Debug)]
pub struct LockManager<S, C> {
    store: S,
    clock: C,
}

impl<S: Store, C: Clock> LockManager<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    fn record_key(key: &str) -> String {
        format!("lock/{}", key)
    }

    /// Current lock record, live or expired
    pub async fn get(&self, key: &str) -> Result<Option<LockRecord>, CoordinationError> {
        match self.store.get(&Self::record_key(key)).await? {
            Some(r) => Ok(Some(r.decode()?)),
            None => Ok(None),
        }
    }

    /// Compare `token` with the stored owner without changing anything
    pub async fn check_matching_owner(
        &self,
        key: &str,
        token: &str,
    ) -> Result<OwnerCheck, CoordinationError> {
        Ok(match self.get(key).await? {
            None => OwnerCheck::NoLock,
            Some(record) if record.owner == token => OwnerCheck::Match,
            Some(record) => OwnerCheck::Conflict(record.owner),
        })
    }

    /// Claim `key` for `timeout`; fails while another claim is still live
    pub async fn write_lock(
        &self,
        key: &str,
        timeout: Duration,
        token: &str,
    ) -> Result<LockRecord, CoordinationError> {
        let record_key = Self::record_key(key);
        let now = self.clock.epoch_ms();

        let current = self.store.get(&record_key).await?;
        if let Some(existing) = &current {
            let held: LockRecord = existing.decode()?;
            if held.is_live(now) {
                tracing::warn!(key, owner = %held.owner, expire = held.expire, "lock is held");
                return Err(CoordinationError::LockConflict {
                    key: key.to_string(),
                    owner: held.owner,
                });
            }
            tracing::info!(key, previous = %held.owner, "reclaiming expired lock");
        }

        let record = LockRecord {
            key: key.to_string(),
            expire: now.saturating_add(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)),
            owner: token.to_string(),
        };
        let outcome = self
            .store
            .put(&record_key, Expect::current(current.as_ref()), encode(&record)?)
            .await
            .inspect_err(|e| tracing::error!(key, error = %e, "lock write failed"))?;

        match outcome {
            WriteOutcome::Applied(_) => {
                tracing::info!(key, owner = token, expire = record.expire, "lock acquired");
                Ok(record)
            }
            WriteOutcome::Conflict => {
                let owner = self
                    .get(key)
                    .await
                    .ok()
                    .flatten()
                    .map(|r| r.owner)
                    .unwrap_or_default();
                tracing::warn!(key, owner = %owner, "lock taken concurrently");
                Err(CoordinationError::LockConflict {
                    key: key.to_string(),
                    owner,
                })
            }
        }
    }

    /// Release `key` if `token` owns it; releasing an absent lock is a no-op
    pub async fn unlock(&self, key: &str, token: &str) -> Result<(), CoordinationError> {
        let record_key = Self::record_key(key);

        let Some(current) = self.store.get(&record_key).await? else {
            tracing::debug!(key, "unlock of absent lock");
            return Ok(());
        };
        let held: LockRecord = current.decode()?;

        if held.owner == token {
            let outcome = self
                .store
                .delete(&record_key, Expect::Version(current.version))
                .await
                .inspect_err(|e| tracing::error!(key, error = %e, "unlock failed"))?;
            if outcome.is_applied() {
                tracing::info!(key, owner = token, "lock released");
                return Ok(());
            }
        }

        Err(self.report_conflict(key, token).await)
    }

    /// Best-effort diagnosis after a refused unlock. The record may change
    /// between the refused delete and this read, so the owner reported is
    /// advisory only.
    async fn report_conflict(&self, key: &str, token: &str) -> CoordinationError {
        let condition_failed = || {
            CoordinationError::Store(StoreError::ConditionFailed {
                key: Self::record_key(key),
            })
        };
        let err = match self.get(key).await {
            Ok(Some(record)) if record.owner != token => {
                CoordinationError::LockConflict {
                    key: key.to_string(),
                    owner: record.owner,
                }
            }
            Ok(_) => condition_failed(),
            Err(e) => {
                tracing::debug!(key, error = %e, "conflict diagnosis read failed");
                condition_failed()
            }
        };
        tracing::error!(key, token, error = %err, "unlock refused");
        err
    }

    /// Run `work` while holding `key`, releasing it whether or not the work succeeds
    pub async fn with_lock<F, T>(
        &self,
        key: &str,
        timeout: Duration,
        token: &str,
        work: F,
    ) -> Result<T, CoordinationError>
    where
        F: Future<Output = T>,
    {
        self.write_lock(key, timeout, token).await?;
        let output = work.await;
        self.unlock(key, token).await?;
        Ok(output)
    }
}

#[cfg(test)]
#[path = "mutex_tests.rs"]
mod tests;
