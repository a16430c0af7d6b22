// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-provider connection permits
//!
//! Each in-flight download against a rate-limited provider holds one token
//! under `connections/<provider>/`. Tokens are removed by the worker that
//! created them; tokens older than `stale_after` belong to crashed workers and
//! are purged by whoever counts next.

use super::MAX_CAS_ATTEMPTS;
use crate::clock::Clock;
use crate::error::CoordinationError;
use crate::store::{encode, Expect, Store, WriteOutcome};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Remote server that limits concurrent connections
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_connection_limit: Option<u32>,
}

impl Provider {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            global_connection_limit: None,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.global_connection_limit = Some(limit);
        self
    }
}

/// One in-flight permit
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionToken {
    pub provider_id: String,
    pub filename: String,
    /// Epoch milliseconds
    pub created_at: u64,
}

/// Polling and reaping parameters
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionLockConfig {
    /// Wait between attempts while the provider is saturated
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Attempts after the first before giving up
    pub max_attempts: u32,
    /// Age at which a token is treated as abandoned
    #[serde(with = "humantime_serde")]
    pub stale_after: Duration,
}

impl Default for ConnectionLockConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_attempts: 270,
            stale_after: Duration::from_secs(5 * 60),
        }
    }
}

/// Store-backed connection limiter
#[derive(Clone, Debug)]
pub struct ConnectionLock<S, C> {
    store: S,
    clock: C,
    config: ConnectionLockConfig,
}

impl<S: Store, C: Clock> ConnectionLock<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self::with_config(store, clock, ConnectionLockConfig::default())
    }

    pub fn with_config(store: S, clock: C, config: ConnectionLockConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &ConnectionLockConfig {
        &self.config
    }

    fn prefix(provider_id: &str) -> String {
        format!("connections/{}/", provider_id)
    }

    fn token_key(provider_id: &str, id: &str) -> String {
        format!("{}{}", Self::prefix(provider_id), id)
    }

    /// Count live tokens for a provider, purging abandoned ones first
    pub async fn count_lock(&self, provider_id: &str) -> Result<u32, CoordinationError> {
        let stale_ms = u64::try_from(self.config.stale_after.as_millis()).unwrap_or(u64::MAX);
        let cutoff = self.clock.epoch_ms().saturating_sub(stale_ms);

        let mut live = 0u32;
        for record in self.store.list(&Self::prefix(provider_id)).await? {
            let token: ConnectionToken = record.decode()?;
            if token.created_at < cutoff {
                let outcome = self
                    .store
                    .delete(&record.key, Expect::Version(record.version))
                    .await?;
                if outcome.is_applied() {
                    tracing::info!(
                        provider = provider_id,
                        filename = %token.filename,
                        "purged abandoned connection token"
                    );
                }
                continue;
            }
            live += 1;
        }

        tracing::debug!(provider = provider_id, live, "counted connection tokens");
        Ok(live)
    }

    /// Wait for a free connection slot and claim it for `id`
    ///
    /// Polls every `poll_interval`; gives up with `ResourcesLocked` once
    /// `max_attempts` retries have been spent.
    pub async fn proceed(&self, provider: &Provider, id: &str) -> Result<(), CoordinationError> {
        let Some(limit) = provider.global_connection_limit else {
            return Ok(());
        };

        let mut attempt = 0u32;
        loop {
            if attempt > self.config.max_attempts {
                tracing::warn!(provider = %provider.id, id, attempt, "connection wait exhausted");
                return Err(CoordinationError::ResourcesLocked(format!(
                    "no connection to provider {} became free after {} attempts",
                    provider.id, attempt
                )));
            }

            let count = self.count_lock(&provider.id).await?;
            if count < limit && self.create_token(&provider.id, id).await? {
                tracing::info!(provider = %provider.id, id, attempt, "connection granted");
                return Ok(());
            }

            tracing::debug!(provider = %provider.id, id, count, limit, attempt, "provider saturated, waiting");
            tokio::time::sleep(self.config.poll_interval).await;
            attempt += 1;
        }
    }

    /// Returns false when a token for `id` already exists
    async fn create_token(&self, provider_id: &str, id: &str) -> Result<bool, CoordinationError> {
        let token = ConnectionToken {
            provider_id: provider_id.to_string(),
            filename: id.to_string(),
            created_at: self.clock.epoch_ms(),
        };
        let outcome = self
            .store
            .put(&Self::token_key(provider_id, id), Expect::Absent, encode(&token)?)
            .await?;
        Ok(outcome.is_applied())
    }

    /// Release the token for `id`; releasing a missing token is a no-op
    pub async fn remove_lock(&self, provider_id: &str, id: &str) -> Result<(), CoordinationError> {
        let key = Self::token_key(provider_id, id);
        for _ in 0..MAX_CAS_ATTEMPTS {
            let Some(record) = self.store.get(&key).await? else {
                return Ok(());
            };
            match self.store.delete(&key, Expect::Version(record.version)).await? {
                WriteOutcome::Applied(_) => {
                    tracing::debug!(provider = provider_id, id, "connection released");
                    return Ok(());
                }
                WriteOutcome::Conflict => continue,
            }
        }
        Err(CoordinationError::ResourcesLocked(format!(
            "connection token {} is under contention",
            key
        )))
    }

    /// Run `work` holding a connection permit, releasing it on every outcome
    pub async fn with_connection<F, T>(
        &self,
        provider: &Provider,
        id: &str,
        work: F,
    ) -> Result<T, CoordinationError>
    where
        F: Future<Output = T>,
    {
        self.proceed(provider, id).await?;
        let output = work.await;
        if provider.global_connection_limit.is_some() {
            self.remove_lock(&provider.id, id).await?;
        }
        Ok(output)
    }
}

#[cfg(test)]
#[path = "connection_tests.rs"]
mod tests;
