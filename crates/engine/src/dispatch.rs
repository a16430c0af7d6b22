// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admission-controlled workflow starts
//!
//! A queued message only becomes an execution after it takes a slot on its
//! queue's semaphore. The slot is handed back if the start fails, and is
//! otherwise released by completion feedback when the execution ends.

use crate::consumer::Consumer;
use crate::error::{ConsumerError, DispatchError};
use futures::future::try_join_all;
use swath_adapters::{Orchestrator, QueueMessage, WorkQueue};
use swath_core::{Clock, EventSource, Semaphore, Store, WorkflowMessage, QUEUE_EVENT_SOURCE};

/// Result of admitting one message
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Started { execution_arn: String },
    /// An execution with the message's name already exists; the message is
    /// a redelivery of one that was started before
    AlreadyStarted { execution_name: String },
}

pub struct Dispatcher<S, O, C> {
    semaphore: Semaphore<S>,
    orchestrator: O,
    clock: C,
    track_source: bool,
}

impl<S: Store, O: Orchestrator, C: Clock> Dispatcher<S, O, C> {
    pub fn new(semaphore: Semaphore<S>, orchestrator: O, clock: C) -> Self {
        Self {
            semaphore,
            orchestrator,
            clock,
            track_source: false,
        }
    }

    /// Stamp `meta.eventSource` on started executions so completion
    /// feedback can delete the queue message once the run succeeds
    pub fn with_source_tracking(mut self, enabled: bool) -> Self {
        self.track_source = enabled;
        self
    }

    pub fn semaphore(&self) -> &Semaphore<S> {
        &self.semaphore
    }

    /// Start the execution described by `message` without admission control
    pub async fn dispatch(
        &self,
        queue_url: &str,
        message: &QueueMessage,
    ) -> Result<String, DispatchError> {
        let mut workflow = WorkflowMessage::from_json(&message.body)?;
        workflow.set_cumulus_meta("queueName", queue_url);
        workflow.set_cumulus_meta("workflow_start_time", self.clock.epoch_ms());
        if self.track_source {
            let source = EventSource {
                kind: QUEUE_EVENT_SOURCE.to_string(),
                message_id: Some(message.message_id.clone()),
                queue_url: Some(queue_url.to_string()),
                receipt_handle: Some(message.receipt_handle.clone()),
                delete_completed_message: true,
                workflow_name: workflow.workflow_name().map(str::to_string),
            };
            workflow.set_event_source(&source)?;
        }

        let state_machine = workflow
            .state_machine()
            .ok_or(DispatchError::MissingField("state_machine"))?;
        let execution_name = workflow
            .execution_name()
            .ok_or(DispatchError::MissingField("execution_name"))?;
        let input = workflow.to_json()?;

        Ok(self
            .orchestrator
            .start_execution(state_machine, execution_name, &input)
            .await?)
    }

    /// Take a slot on `queue_url`'s semaphore, then start the execution
    ///
    /// The slot is returned when the start fails for any reason. A start
    /// rejected because the execution already exists counts as handled so
    /// the duplicate message can be removed.
    pub async fn increment_and_dispatch(
        &self,
        queue_url: &str,
        message: &QueueMessage,
    ) -> Result<DispatchOutcome, DispatchError> {
        let workflow = WorkflowMessage::from_json(&message.body)?;
        let maximum =
            workflow
                .execution_limit(queue_url)
                .ok_or_else(|| DispatchError::MissingExecutionLimit {
                    queue: queue_url.to_string(),
                })?;

        self.semaphore.up(queue_url, maximum).await?;

        match self.dispatch(queue_url, message).await {
            Ok(execution_arn) => Ok(DispatchOutcome::Started { execution_arn }),
            Err(e) => {
                if let Err(release) = self.semaphore.down(queue_url).await {
                    tracing::error!(queue_url, error = %release, "failed to release slot after start failure");
                }
                match e {
                    DispatchError::Orchestrator(o) if o.is_already_exists() => {
                        let execution_name = workflow.execution_name().unwrap_or_default().to_string();
                        tracing::warn!(queue_url, execution_name = %execution_name, "execution already exists, dropping duplicate message");
                        Ok(DispatchOutcome::AlreadyStarted { execution_name })
                    }
                    e => Err(e),
                }
            }
        }
    }

    /// Process function for [`Consumer::consume`]
    pub async fn process(&self, queue_url: &str, message: QueueMessage) -> Result<(), DispatchError> {
        match self.increment_and_dispatch(queue_url, &message).await? {
            DispatchOutcome::Started { execution_arn } => {
                tracing::info!(queue_url, message_id = %message.message_id, execution_arn = %execution_arn, "execution started");
            }
            DispatchOutcome::AlreadyStarted { .. } => {}
        }
        Ok(())
    }

    /// Drain `consumer`'s queue through admission control
    pub async fn run<Q: WorkQueue, CC: Clock>(
        &self,
        consumer: &Consumer<Q, CC>,
    ) -> Result<u64, ConsumerError> {
        let queue_url = consumer.queue_url();
        consumer
            .consume(|message| self.process(queue_url, message))
            .await
    }

    /// Drain several queues at once; counts follow the order of `consumers`
    pub async fn run_all<Q: WorkQueue, CC: Clock>(
        &self,
        consumers: &[Consumer<Q, CC>],
    ) -> Result<Vec<u64>, ConsumerError> {
        try_join_all(consumers.iter().map(|consumer| self.run(consumer))).await
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
