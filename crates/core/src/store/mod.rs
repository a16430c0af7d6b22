// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compare-and-swap key-value store contract
//!
//! Every shared coordination record (semaphore counters, lock records,
//! connection tokens) lives behind this trait. Mutations carry an [`Expect`]
//! precondition on the record's current version, so concurrent workers never
//! overwrite each other blindly.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("conditional check failed for {key}")]
    ConditionFailed { key: String },
}

/// A stored value with its version
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub key: String,
    pub value: Value,
    /// Store-wide monotonic version, never reused for the same key
    pub version: u64,
}

impl Record {
    /// Decode the value into a typed record
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        Ok(serde_json::from_value(self.value.clone())?)
    }
}

/// Precondition on the current state of a key
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expect {
    /// The key must not exist
    Absent,
    /// The key must exist at exactly this version
    Version(u64),
}

impl Expect {
    /// Precondition matching a record as it was just read
    pub fn current(record: Option<&Record>) -> Self {
        match record {
            Some(r) => Expect::Version(r.version),
            None => Expect::Absent,
        }
    }

    /// Check the precondition against the version currently stored
    pub fn holds(&self, current: Option<u64>) -> bool {
        match (self, current) {
            (Expect::Absent, None) => true,
            (Expect::Version(v), Some(c)) => *v == c,
            _ => false,
        }
    }
}

/// Result of a conditional mutation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Precondition held; carries the version written (or deleted)
    Applied(u64),
    /// Precondition failed; nothing changed
    Conflict,
}

impl WriteOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, WriteOutcome::Applied(_))
    }
}

/// Key-value backend with optimistic concurrency
#[async_trait]
pub trait Store: Clone + Send + Sync + 'static {
    /// Read a key
    async fn get(&self, key: &str) -> Result<Option<Record>, StoreError>;

    /// Write `value` if `expect` holds
    async fn put(&self, key: &str, expect: Expect, value: Value)
        -> Result<WriteOutcome, StoreError>;

    /// Delete `key` if `expect` holds; deleting an absent key with
    /// [`Expect::Absent`] is applied as a no-op
    async fn delete(&self, key: &str, expect: Expect) -> Result<WriteOutcome, StoreError>;

    /// All records whose key starts with `prefix`, sorted by key
    async fn list(&self, prefix: &str) -> Result<Vec<Record>, StoreError>;
}

/// Serialize a typed record for [`Store::put`]
pub fn encode<T: Serialize>(value: &T) -> Result<Value, StoreError> {
    Ok(serde_json::to_value(value)?)
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
