// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::FakeClock;
use crate::error::ErrorKind;
use crate::store::{MemoryStore, Record};
use async_trait::async_trait;
use serde_json::Value;

fn manager() -> (LockManager<MemoryStore, FakeClock>, FakeClock) {
    let clock = FakeClock::new();
    (LockManager::new(MemoryStore::new(), clock.clone()), clock)
}

const TTL: Duration = Duration::from_secs(30);

#[tokio::test]
async fn check_reports_no_lock_match_and_conflict() {
    let (locks, _) = manager();
    assert_eq!(
        locks.check_matching_owner("deploy", "a").await.unwrap(),
        OwnerCheck::NoLock
    );

    locks.write_lock("deploy", TTL, "a").await.unwrap();
    assert_eq!(
        locks.check_matching_owner("deploy", "a").await.unwrap(),
        OwnerCheck::Match
    );
    assert_eq!(
        locks.check_matching_owner("deploy", "b").await.unwrap(),
        OwnerCheck::Conflict("a".to_string())
    );
}

#[tokio::test]
async fn write_lock_stores_expiry_from_clock() {
    let (locks, clock) = manager();
    let record = locks.write_lock("deploy", TTL, "a").await.unwrap();
    assert_eq!(record.expire, clock.epoch_ms() + 30_000);
    assert_eq!(locks.get("deploy").await.unwrap(), Some(record));
}

#[tokio::test]
async fn huge_timeout_saturates_expiry() {
    let (locks, clock) = manager();
    let record = locks.write_lock("deploy", Duration::MAX, "a").await.unwrap();
    assert_eq!(record.expire, u64::MAX);
    assert!(record.is_live(clock.epoch_ms()));

    let err = locks.write_lock("deploy", TTL, "b").await.unwrap_err();
    assert_eq!(err.conflicting_owner(), Some("a"));
}

#[tokio::test]
async fn second_owner_is_refused_while_live() {
    let (locks, _) = manager();
    locks.write_lock("deploy", TTL, "a").await.unwrap();

    let err = locks.write_lock("deploy", TTL, "b").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LockConflict);
    assert_eq!(err.conflicting_owner(), Some("a"));
}

#[tokio::test]
async fn same_owner_cannot_reacquire_a_live_lock() {
    let (locks, _) = manager();
    locks.write_lock("deploy", TTL, "a").await.unwrap();
    assert!(locks.write_lock("deploy", TTL, "a").await.is_err());
}

#[tokio::test]
async fn expired_lock_is_taken_over() {
    let (locks, clock) = manager();
    locks.write_lock("deploy", TTL, "a").await.unwrap();

    clock.advance(TTL);
    let record = locks.write_lock("deploy", TTL, "b").await.unwrap();
    assert_eq!(record.owner, "b");
    assert_eq!(
        locks.check_matching_owner("deploy", "b").await.unwrap(),
        OwnerCheck::Match
    );
}

#[tokio::test]
async fn unlock_by_owner_removes_record() {
    let (locks, _) = manager();
    locks.write_lock("deploy", TTL, "a").await.unwrap();
    locks.unlock("deploy", "a").await.unwrap();

    assert!(locks.get("deploy").await.unwrap().is_none());
    locks.write_lock("deploy", TTL, "b").await.unwrap();
}

#[tokio::test]
async fn unlock_absent_lock_is_noop() {
    let (locks, _) = manager();
    locks.unlock("deploy", "a").await.unwrap();
}

#[tokio::test]
async fn unlock_by_other_owner_reports_holder() {
    let (locks, _) = manager();
    locks.write_lock("deploy", TTL, "b").await.unwrap();

    let err = locks.unlock("deploy", "a").await.unwrap_err();
    assert!(matches!(
        &err,
        CoordinationError::LockConflict { key, owner } if key == "deploy" && owner == "b"
    ));
    // The holder's record is untouched
    assert_eq!(
        locks.check_matching_owner("deploy", "b").await.unwrap(),
        OwnerCheck::Match
    );
}

#[tokio::test]
async fn with_lock_releases_after_work() {
    let (locks, _) = manager();
    let value = locks
        .with_lock("deploy", TTL, "a", async { 42 })
        .await
        .unwrap();
    assert_eq!(value, 42);
    assert!(locks.get("deploy").await.unwrap().is_none());
}

#[tokio::test]
async fn with_lock_does_not_run_work_when_held() {
    let (locks, _) = manager();
    locks.write_lock("deploy", TTL, "a").await.unwrap();

    let mut ran = false;
    let result = locks
        .with_lock("deploy", TTL, "b", async { ran = true })
        .await;
    assert!(result.is_err());
    assert!(!ran);
}

/// Store whose deletes always lose a race: the record vanishes and the
/// delete reports a conflict, leaving the diagnosis read nothing to report.
#[derive(Clone)]
struct VanishingStore {
    inner: MemoryStore,
}

#[async_trait]
impl Store for VanishingStore {
    async fn get(&self, key: &str) -> Result<Option<Record>, StoreError> {
        self.inner.get(key).await
    }

    async fn put(
        &self,
        key: &str,
        expect: Expect,
        value: Value,
    ) -> Result<WriteOutcome, StoreError> {
        self.inner.put(key, expect, value).await
    }

    async fn delete(&self, key: &str, expect: Expect) -> Result<WriteOutcome, StoreError> {
        self.inner.delete(key, expect).await?;
        Ok(WriteOutcome::Conflict)
    }

    async fn list(&self, prefix: &str) -> Result<Vec<Record>, StoreError> {
        self.inner.list(prefix).await
    }
}

#[tokio::test]
async fn inconclusive_diagnosis_returns_store_condition_error() {
    let store = VanishingStore {
        inner: MemoryStore::new(),
    };
    let locks = LockManager::new(store, FakeClock::new());
    locks.write_lock("deploy", TTL, "a").await.unwrap();

    let err = locks.unlock("deploy", "a").await.unwrap_err();
    assert!(matches!(
        err,
        CoordinationError::Store(StoreError::ConditionFailed { .. })
    ));
    assert_eq!(err.kind(), ErrorKind::Backend);
}
