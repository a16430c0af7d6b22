// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-process store in a single JSON document
//!
//! Every operation holds an exclusive advisory lock on `store.lock` for its
//! whole read-modify-write, so conditional writes from separate processes on
//! one host are serialized. The document is replaced via temp file + rename
//! and is never observed half-written.

use async_trait::async_trait;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use swath_core::store::{Expect, Record, Store, StoreError, WriteOutcome};

const DATA_FILE: &str = "store.json";
const LOCK_FILE: &str = "store.lock";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    last_version: u64,
    records: BTreeMap<String, StoredValue>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredValue {
    value: Value,
    version: u64,
}

impl Snapshot {
    fn version_of(&self, key: &str) -> Option<u64> {
        self.records.get(key).map(|r| r.version)
    }

    fn record(&self, key: &str) -> Option<Record> {
        self.records.get(key).map(|r| Record {
            key: key.to_string(),
            value: r.value.clone(),
            version: r.version,
        })
    }
}

#[derive(Debug)]
struct Paths {
    data: PathBuf,
    lock: PathBuf,
}

/// File-backed store rooted at a directory; clones share the same files
#[derive(Clone, Debug)]
pub struct FileStore {
    paths: Arc<Paths>,
}

impl FileStore {
    /// Open (creating if needed) the store under `root`
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref();
        std::fs::create_dir_all(root)?;
        Ok(Self {
            paths: Arc::new(Paths {
                data: root.join(DATA_FILE),
                lock: root.join(LOCK_FILE),
            }),
        })
    }

    pub fn data_path(&self) -> &Path {
        &self.paths.data
    }

    /// Run `apply` against the snapshot under the file lock
    ///
    /// `apply` returns the result and whether the snapshot changed.
    fn transact<T>(&self, apply: impl FnOnce(&mut Snapshot) -> (T, bool)) -> Result<T, StoreError> {
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.paths.lock)?;
        lock.lock_exclusive()?;

        let result = self.load().and_then(|mut snapshot| {
            let (out, dirty) = apply(&mut snapshot);
            if dirty {
                self.save(&snapshot)?;
            }
            Ok(out)
        });

        if let Err(e) = FileExt::unlock(&lock) {
            tracing::warn!(path = %self.paths.lock.display(), error = %e, "failed to release store lock");
        }
        result
    }

    fn load(&self) -> Result<Snapshot, StoreError> {
        match std::fs::read(&self.paths.data) {
            Ok(bytes) if bytes.is_empty() => Ok(Snapshot::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Snapshot::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let tmp = self.paths.data.with_extension("json.tmp");
        let mut file = File::create(&tmp)?;
        serde_json::to_writer(&mut file, snapshot)?;
        file.flush()?;
        file.sync_all()?;
        std::fs::rename(&tmp, &self.paths.data)?;
        Ok(())
    }

    async fn run<T, F>(&self, apply: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Snapshot) -> (T, bool) + Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.transact(apply))
            .await
            .map_err(|e| StoreError::Unavailable(format!("store task failed: {}", e)))?
    }
}

#[async_trait]
impl Store for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Record>, StoreError> {
        let key = key.to_string();
        self.run(move |snapshot| (snapshot.record(&key), false)).await
    }

    async fn put(
        &self,
        key: &str,
        expect: Expect,
        value: Value,
    ) -> Result<WriteOutcome, StoreError> {
        let key = key.to_string();
        self.run(move |snapshot| {
            if !expect.holds(snapshot.version_of(&key)) {
                return (WriteOutcome::Conflict, false);
            }
            snapshot.last_version += 1;
            let version = snapshot.last_version;
            snapshot
                .records
                .insert(key, StoredValue { value, version });
            (WriteOutcome::Applied(version), true)
        })
        .await
    }

    async fn delete(&self, key: &str, expect: Expect) -> Result<WriteOutcome, StoreError> {
        let key = key.to_string();
        self.run(move |snapshot| {
            let current = snapshot.version_of(&key);
            if !expect.holds(current) {
                return (WriteOutcome::Conflict, false);
            }
            let removed = snapshot.records.remove(&key).is_some();
            (WriteOutcome::Applied(current.unwrap_or(0)), removed)
        })
        .await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<Record>, StoreError> {
        let prefix = prefix.to_string();
        self.run(move |snapshot| {
            let records = snapshot
                .records
                .range(prefix.clone()..)
                .take_while(|(k, _)| k.starts_with(&prefix))
                .map(|(k, r)| Record {
                    key: k.clone(),
                    value: r.value.clone(),
                    version: r.version,
                })
                .collect();
            (records, false)
        })
        .await
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
