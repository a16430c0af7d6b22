// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work queue adapters
//!
//! Messages become invisible for a visibility timeout when received and
//! reappear if not deleted before it lapses. Each receive hands out a fresh
//! receipt handle; only the latest one can delete or re-time the message.

mod spool;

pub use spool::SpoolQueue;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeWorkQueue, QueueCall};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Largest batch a single receive may request
pub const MAX_RECEIVE_BATCH: usize = 10;

/// Errors from queue operations
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("receive batch of {requested} exceeds the maximum of {MAX_RECEIVE_BATCH}")]
    BatchTooLarge { requested: usize },
    #[error("no in-flight message with receipt handle {0}")]
    ReceiptNotFound(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("queue backend error: {0}")]
    Backend(String),
}

/// A received message
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueMessage {
    pub message_id: String,
    pub receipt_handle: String,
    pub body: String,
    /// Times this message has been received, including this one
    pub receive_count: u32,
}

/// Adapter for a visibility-timeout work queue
#[async_trait]
pub trait WorkQueue: Clone + Send + Sync + 'static {
    /// Receive up to `max` visible messages, hiding them for `visibility`
    async fn receive(
        &self,
        queue_url: &str,
        max: usize,
        visibility: Duration,
    ) -> Result<Vec<QueueMessage>, QueueError>;

    /// Remove a received message
    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), QueueError>;

    /// Reset how long a received message stays hidden
    async fn change_visibility(
        &self,
        queue_url: &str,
        receipt_handle: &str,
        visibility: Duration,
    ) -> Result<(), QueueError>;

    /// Enqueue a message body; returns the new message id
    async fn send(&self, queue_url: &str, body: &str) -> Result<String, QueueError>;
}

/// Reject receive batches above [`MAX_RECEIVE_BATCH`]
pub fn check_batch(max: usize) -> Result<(), QueueError> {
    if max > MAX_RECEIVE_BATCH {
        return Err(QueueError::BatchTooLarge { requested: max });
    }
    Ok(())
}
