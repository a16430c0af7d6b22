// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory-backed work queue
//!
//! Layout: `<root>/queues/<queue>/<message-id>.json`, one file per message.
//! All mutations of a queue take the queue directory's lock, so several
//! dispatcher processes can share one spool.

use super::{check_batch, QueueError, QueueMessage, WorkQueue};
use crate::spool::{duration_ms, json_files, sanitize, with_dir_lock, write_json};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use swath_core::{Clock, IdGen};

#[derive(Clone, Debug, Serialize, Deserialize)]
struct SpoolEntry {
    message_id: String,
    body: String,
    /// Position in the queue; lower sequences are received first
    sequence: u64,
    sent_at: u64,
    /// Epoch ms before which the message stays hidden
    visible_after: u64,
    #[serde(default)]
    receipt_handle: Option<String>,
    #[serde(default)]
    receive_count: u32,
}

/// Work queue stored as files under a root directory
#[derive(Clone, Debug)]
pub struct SpoolQueue<C, I> {
    root: Arc<PathBuf>,
    clock: C,
    ids: I,
}

impl<C: Clock, I: IdGen> SpoolQueue<C, I> {
    pub fn new(root: impl Into<PathBuf>, clock: C, ids: I) -> Self {
        Self {
            root: Arc::new(root.into()),
            clock,
            ids,
        }
    }

    fn queue_dir(&self, queue_url: &str) -> PathBuf {
        self.root.join("queues").join(sanitize(queue_url))
    }

    /// Number of messages in the queue, visible or not
    pub fn depth(&self, queue_url: &str) -> Result<usize, QueueError> {
        Ok(json_files(&self.queue_dir(queue_url))?.len())
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, QueueError>
    where
        T: Send + 'static,
        F: FnOnce(&Self) -> Result<T, QueueError> + Send + 'static,
    {
        let this = self.clone();
        tokio::task::spawn_blocking(move || f(&this))
            .await
            .map_err(|e| QueueError::Backend(format!("spool task failed: {}", e)))?
    }

    fn receive_locked(
        &self,
        dir: &Path,
        max: usize,
        visibility: Duration,
    ) -> Result<Vec<QueueMessage>, QueueError> {
        let now = self.clock.epoch_ms();
        let mut visible = Vec::new();
        for path in json_files(dir)? {
            let entry = read_entry(&path)?;
            if entry.visible_after <= now {
                visible.push((path, entry));
            }
        }
        visible.sort_by_key(|(_, entry)| entry.sequence);

        let mut received = Vec::new();
        for (path, mut entry) in visible.into_iter().take(max) {
            let receipt = self.ids.next();
            entry.receipt_handle = Some(receipt.clone());
            entry.receive_count += 1;
            entry.visible_after = now.saturating_add(duration_ms(visibility));
            write_json(&path, &entry)?;
            received.push(QueueMessage {
                message_id: entry.message_id,
                receipt_handle: receipt,
                body: entry.body,
                receive_count: entry.receive_count,
            });
        }
        Ok(received)
    }

    fn find_by_receipt(
        dir: &Path,
        receipt_handle: &str,
    ) -> Result<(PathBuf, SpoolEntry), QueueError> {
        for path in json_files(dir)? {
            let entry = read_entry(&path)?;
            if entry.receipt_handle.as_deref() == Some(receipt_handle) {
                return Ok((path, entry));
            }
        }
        Err(QueueError::ReceiptNotFound(receipt_handle.to_string()))
    }
}

fn read_entry(path: &Path) -> Result<SpoolEntry, QueueError> {
    let bytes = std::fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl<C: Clock, I: IdGen> WorkQueue for SpoolQueue<C, I> {
    async fn receive(
        &self,
        queue_url: &str,
        max: usize,
        visibility: Duration,
    ) -> Result<Vec<QueueMessage>, QueueError> {
        check_batch(max)?;
        let dir = self.queue_dir(queue_url);
        self.blocking(move |this| with_dir_lock(&dir, || this.receive_locked(&dir, max, visibility)))
            .await
    }

    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), QueueError> {
        let dir = self.queue_dir(queue_url);
        let receipt = receipt_handle.to_string();
        self.blocking(move |_| {
            with_dir_lock(&dir, || {
                let (path, _) = Self::find_by_receipt(&dir, &receipt)?;
                std::fs::remove_file(path)?;
                Ok(())
            })
        })
        .await
    }

    async fn change_visibility(
        &self,
        queue_url: &str,
        receipt_handle: &str,
        visibility: Duration,
    ) -> Result<(), QueueError> {
        let dir = self.queue_dir(queue_url);
        let receipt = receipt_handle.to_string();
        self.blocking(move |this| {
            with_dir_lock(&dir, || {
                let (path, mut entry) = Self::find_by_receipt(&dir, &receipt)?;
                entry.visible_after = this.clock.epoch_ms().saturating_add(duration_ms(visibility));
                write_json(&path, &entry)?;
                Ok(())
            })
        })
        .await
    }

    async fn send(&self, queue_url: &str, body: &str) -> Result<String, QueueError> {
        let dir = self.queue_dir(queue_url);
        let body = body.to_string();
        self.blocking(move |this| {
            with_dir_lock(&dir, || {
                let mut sequence = 0;
                for path in json_files(&dir)? {
                    sequence = sequence.max(read_entry(&path)?.sequence);
                }
                let message_id = this.ids.next();
                let now = this.clock.epoch_ms();
                let entry = SpoolEntry {
                    message_id: message_id.clone(),
                    body,
                    sequence: sequence + 1,
                    sent_at: now,
                    visible_after: now,
                    receipt_handle: None,
                    receive_count: 0,
                };
                write_json(&dir.join(format!("{}.json", sanitize(&message_id))), &entry)?;
                Ok(message_id)
            })
        })
        .await
    }
}

#[cfg(test)]
#[path = "spool_tests.rs"]
mod tests;
