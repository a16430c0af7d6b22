// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake work queue for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{check_batch, QueueError, QueueMessage, WorkQueue};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use swath_core::{Clock, FakeClock};

/// Recorded queue call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueCall {
    Receive { queue_url: String, max: usize },
    Delete { queue_url: String, receipt_handle: String },
    ChangeVisibility {
        queue_url: String,
        receipt_handle: String,
        visibility: Duration,
    },
    Send { queue_url: String, body: String },
}

#[derive(Debug, Clone)]
struct FakeEntry {
    message_id: String,
    body: String,
    visible_after: u64,
    receipt_handle: Option<String>,
    receive_count: u32,
}

#[derive(Debug, Default)]
struct FakeQueueState {
    queues: HashMap<String, VecDeque<FakeEntry>>,
    calls: Vec<QueueCall>,
    next_id: u64,
    max_batch: Option<usize>,
    fail_receive: Option<String>,
}

/// In-memory queue with visibility timeouts driven by a [`FakeClock`]
#[derive(Clone, Default)]
pub struct FakeWorkQueue {
    state: Arc<Mutex<FakeQueueState>>,
    clock: FakeClock,
}

impl FakeWorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: FakeClock) -> Self {
        Self {
            state: Arc::default(),
            clock,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeQueueState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Return at most `n` messages per receive regardless of the request
    pub fn set_max_batch(&self, n: usize) {
        self.lock().max_batch = Some(n);
    }

    /// Fail every subsequent receive with a backend error
    pub fn fail_receive(&self, reason: Option<&str>) {
        self.lock().fail_receive = reason.map(str::to_string);
    }

    /// Enqueue without recording a call
    pub fn push(&self, queue_url: &str, body: &str) -> String {
        let mut state = self.lock();
        Self::enqueue(&mut state, queue_url, body, self.clock.epoch_ms())
    }

    fn enqueue(state: &mut FakeQueueState, queue_url: &str, body: &str, now: u64) -> String {
        state.next_id += 1;
        let message_id = format!("msg-{}", state.next_id);
        state
            .queues
            .entry(queue_url.to_string())
            .or_default()
            .push_back(FakeEntry {
                message_id: message_id.clone(),
                body: body.to_string(),
                visible_after: now,
                receipt_handle: None,
                receive_count: 0,
            });
        message_id
    }

    pub fn calls(&self) -> Vec<QueueCall> {
        self.lock().calls.clone()
    }

    /// Messages still in the queue, visible or not
    pub fn depth(&self, queue_url: &str) -> usize {
        self.lock().queues.get(queue_url).map_or(0, VecDeque::len)
    }

    /// Bodies of all messages still in the queue
    pub fn bodies(&self, queue_url: &str) -> Vec<String> {
        self.lock()
            .queues
            .get(queue_url)
            .map(|q| q.iter().map(|e| e.body.clone()).collect())
            .unwrap_or_default()
    }

    /// Epoch ms at which the message with this id becomes visible again
    pub fn visible_after(&self, queue_url: &str, message_id: &str) -> Option<u64> {
        self.lock()
            .queues
            .get(queue_url)?
            .iter()
            .find(|e| e.message_id == message_id)
            .map(|e| e.visible_after)
    }

    fn find_receipt<'a>(
        state: &'a mut FakeQueueState,
        queue_url: &str,
        receipt_handle: &str,
    ) -> Result<(usize, &'a mut VecDeque<FakeEntry>), QueueError> {
        let queue = state
            .queues
            .get_mut(queue_url)
            .ok_or_else(|| QueueError::ReceiptNotFound(receipt_handle.to_string()))?;
        let index = queue
            .iter()
            .position(|e| e.receipt_handle.as_deref() == Some(receipt_handle))
            .ok_or_else(|| QueueError::ReceiptNotFound(receipt_handle.to_string()))?;
        Ok((index, queue))
    }
}

#[async_trait]
impl WorkQueue for FakeWorkQueue {
    async fn receive(
        &self,
        queue_url: &str,
        max: usize,
        visibility: Duration,
    ) -> Result<Vec<QueueMessage>, QueueError> {
        let now = self.clock.epoch_ms();
        let mut state = self.lock();
        state.calls.push(QueueCall::Receive {
            queue_url: queue_url.to_string(),
            max,
        });
        check_batch(max)?;
        if let Some(reason) = &state.fail_receive {
            return Err(QueueError::Backend(reason.clone()));
        }

        let limit = state.max_batch.map_or(max, |cap| cap.min(max));
        let hide_until = now + u64::try_from(visibility.as_millis()).unwrap_or(u64::MAX);
        let mut received = Vec::new();
        if let Some(queue) = state.queues.get_mut(queue_url) {
            for entry in queue.iter_mut().filter(|e| e.visible_after <= now).take(limit) {
                let receipt = format!("rh-{}-{}", entry.message_id, entry.receive_count + 1);
                entry.receipt_handle = Some(receipt.clone());
                entry.receive_count += 1;
                entry.visible_after = hide_until;
                received.push(QueueMessage {
                    message_id: entry.message_id.clone(),
                    receipt_handle: receipt,
                    body: entry.body.clone(),
                    receive_count: entry.receive_count,
                });
            }
        }
        Ok(received)
    }

    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), QueueError> {
        let mut state = self.lock();
        state.calls.push(QueueCall::Delete {
            queue_url: queue_url.to_string(),
            receipt_handle: receipt_handle.to_string(),
        });
        let (index, queue) = Self::find_receipt(&mut state, queue_url, receipt_handle)?;
        queue.remove(index);
        Ok(())
    }

    async fn change_visibility(
        &self,
        queue_url: &str,
        receipt_handle: &str,
        visibility: Duration,
    ) -> Result<(), QueueError> {
        let now = self.clock.epoch_ms();
        let mut state = self.lock();
        state.calls.push(QueueCall::ChangeVisibility {
            queue_url: queue_url.to_string(),
            receipt_handle: receipt_handle.to_string(),
            visibility,
        });
        let (index, queue) = Self::find_receipt(&mut state, queue_url, receipt_handle)?;
        if let Some(entry) = queue.get_mut(index) {
            entry.visible_after = now + u64::try_from(visibility.as_millis()).unwrap_or(u64::MAX);
        }
        Ok(())
    }

    async fn send(&self, queue_url: &str, body: &str) -> Result<String, QueueError> {
        let now = self.clock.epoch_ms();
        let mut state = self.lock();
        state.calls.push(QueueCall::Send {
            queue_url: queue_url.to_string(),
            body: body.to_string(),
        });
        Ok(Self::enqueue(&mut state, queue_url, body, now))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
