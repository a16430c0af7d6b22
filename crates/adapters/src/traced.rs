// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing wrappers for adapters
//!
//! Each call runs inside a span named after the operation and logs its
//! outcome, so dispatcher runs can be followed from the CLI's log output.

use crate::orchestrator::{Orchestrator, OrchestratorError};
use crate::queue::{check_batch, QueueError, QueueMessage, WorkQueue};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Wrapper that adds tracing to any WorkQueue
#[derive(Clone)]
pub struct TracedWorkQueue<Q> {
    inner: Q,
}

impl<Q> TracedWorkQueue<Q> {
    pub fn new(inner: Q) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Q {
        &self.inner
    }
}

#[async_trait]
impl<Q: WorkQueue> WorkQueue for TracedWorkQueue<Q> {
    async fn receive(
        &self,
        queue_url: &str,
        max: usize,
        visibility: Duration,
    ) -> Result<Vec<QueueMessage>, QueueError> {
        let span = tracing::info_span!("queue.receive", queue_url, max);
        async {
            if let Err(e) = check_batch(max) {
                tracing::error!(error = %e, "receive batch rejected");
                return Err(e);
            }
            let result = self.inner.receive(queue_url, max, visibility).await;
            match &result {
                Ok(messages) => tracing::debug!(received = messages.len(), "received"),
                Err(e) => tracing::error!(error = %e, "receive failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn delete(&self, queue_url: &str, receipt_handle: &str) -> Result<(), QueueError> {
        let span = tracing::info_span!("queue.delete", queue_url);
        async {
            let result = self.inner.delete(queue_url, receipt_handle).await;
            match &result {
                Ok(()) => tracing::info!("message deleted"),
                Err(e) => tracing::error!(error = %e, "delete failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn change_visibility(
        &self,
        queue_url: &str,
        receipt_handle: &str,
        visibility: Duration,
    ) -> Result<(), QueueError> {
        let span = tracing::info_span!(
            "queue.change_visibility",
            queue_url,
            visibility_secs = visibility.as_secs()
        );
        async {
            let result = self
                .inner
                .change_visibility(queue_url, receipt_handle, visibility)
                .await;
            match &result {
                Ok(()) => tracing::info!("visibility changed"),
                Err(e) => tracing::warn!(error = %e, "visibility change failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn send(&self, queue_url: &str, body: &str) -> Result<String, QueueError> {
        let span = tracing::info_span!("queue.send", queue_url);
        async {
            tracing::debug!(body_len = body.len(), "sending");
            let result = self.inner.send(queue_url, body).await;
            match &result {
                Ok(id) => tracing::info!(message_id = %id, "sent"),
                Err(e) => tracing::error!(error = %e, "send failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Wrapper that adds tracing to any Orchestrator
#[derive(Clone)]
pub struct TracedOrchestrator<O> {
    inner: O,
}

impl<O> TracedOrchestrator<O> {
    pub fn new(inner: O) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &O {
        &self.inner
    }
}

#[async_trait]
impl<O: Orchestrator> Orchestrator for TracedOrchestrator<O> {
    async fn start_execution(
        &self,
        state_machine: &str,
        name: &str,
        input: &str,
    ) -> Result<String, OrchestratorError> {
        let span = tracing::info_span!("orchestrator.start", state_machine, name);
        async {
            if state_machine.is_empty() || name.is_empty() {
                tracing::error!("state machine and execution name are required");
                return Err(OrchestratorError::Backend(
                    "state machine and execution name are required".to_string(),
                ));
            }

            let start = Instant::now();
            let result = self.inner.start_execution(state_machine, name, input).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match &result {
                Ok(arn) => tracing::info!(elapsed_ms, arn = %arn, "execution started"),
                Err(e) if e.is_already_exists() => {
                    tracing::warn!(elapsed_ms, "execution already exists")
                }
                Err(e) => tracing::error!(elapsed_ms, error = %e, "start failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
