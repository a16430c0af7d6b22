// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process store for tests and single-process runs

use super::{Expect, Record, Store, StoreError, WriteOutcome};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct MemoryState {
    records: BTreeMap<String, Record>,
    last_version: u64,
    unavailable: Option<String>,
}

/// Shared in-memory store; clones see the same data
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with [`StoreError::Unavailable`]
    pub fn set_unavailable(&self, reason: Option<&str>) {
        self.lock().unavailable = reason.map(str::to_string);
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn checked(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, StoreError> {
        let state = self.lock();
        match &state.unavailable {
            Some(reason) => Err(StoreError::Unavailable(reason.clone())),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Record>, StoreError> {
        Ok(self.checked()?.records.get(key).cloned())
    }

    async fn put(
        &self,
        key: &str,
        expect: Expect,
        value: Value,
    ) -> Result<WriteOutcome, StoreError> {
        let mut state = self.checked()?;
        let current = state.records.get(key).map(|r| r.version);
        if !expect.holds(current) {
            return Ok(WriteOutcome::Conflict);
        }
        state.last_version += 1;
        let version = state.last_version;
        state.records.insert(
            key.to_string(),
            Record {
                key: key.to_string(),
                value,
                version,
            },
        );
        Ok(WriteOutcome::Applied(version))
    }

    async fn delete(&self, key: &str, expect: Expect) -> Result<WriteOutcome, StoreError> {
        let mut state = self.checked()?;
        let current = state.records.get(key).map(|r| r.version);
        if !expect.holds(current) {
            return Ok(WriteOutcome::Conflict);
        }
        state.records.remove(key);
        Ok(WriteOutcome::Applied(current.unwrap_or(0)))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<Record>, StoreError> {
        let state = self.checked()?;
        Ok(state
            .records
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(_, r)| r.clone())
            .collect())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
