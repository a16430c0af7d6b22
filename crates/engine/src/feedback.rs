// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Completion feedback
//!
//! When an execution reaches a terminal status its queue slot is released,
//! and the queue message it was started from is deleted (on success) or made
//! visible again shortly (on failure) if the message asked for that.

use crate::error::FeedbackError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use swath_adapters::WorkQueue;
use swath_core::{
    CoordinationError, FeedbackConfig, Semaphore, Store, WorkflowMessage, QUEUE_EVENT_SOURCE,
};

/// Source field of orchestrator state-change events
pub const STATE_CHANGE_SOURCE: &str = "aws.states";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Running,
    Succeeded,
    Failed,
    Aborted,
    TimedOut,
}

impl ExecutionStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ExecutionStatus::Running)
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionStatus::Running => "RUNNING",
            ExecutionStatus::Succeeded => "SUCCEEDED",
            ExecutionStatus::Failed => "FAILED",
            ExecutionStatus::Aborted => "ABORTED",
            ExecutionStatus::TimedOut => "TIMED_OUT",
        };
        f.write_str(name)
    }
}

/// A status change for one execution, with the message it ran on
#[derive(Clone, Debug, PartialEq)]
pub struct WorkflowStatusEvent {
    pub status: ExecutionStatus,
    pub message: WorkflowMessage,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEvent {
    StateChange {
        source: String,
        detail: RawDetail,
    },
    Direct {
        status: ExecutionStatus,
        message: WorkflowMessage,
    },
}

#[derive(Deserialize)]
struct RawDetail {
    status: ExecutionStatus,
    #[serde(default)]
    input: Option<String>,
    #[serde(default)]
    output: Option<String>,
}

impl WorkflowStatusEvent {
    pub fn new(status: ExecutionStatus, message: WorkflowMessage) -> Self {
        Self { status, message }
    }

    /// Parse `{status, message}` or an orchestrator state-change event
    /// `{source, detail: {status, input, output}}`
    ///
    /// State-change events carry the message as a JSON string; a succeeded
    /// execution's output is preferred over its input.
    pub fn from_json(text: &str) -> Result<Self, FeedbackError> {
        let raw: RawEvent =
            serde_json::from_str(text).map_err(|e| FeedbackError::InvalidEvent(e.to_string()))?;
        match raw {
            RawEvent::Direct { status, message } => Ok(Self { status, message }),
            RawEvent::StateChange { source, detail } => {
                if source != STATE_CHANGE_SOURCE {
                    return Err(FeedbackError::InvalidEvent(format!(
                        "unexpected event source {}",
                        source
                    )));
                }
                let body = match detail.status {
                    ExecutionStatus::Succeeded => detail.output.or(detail.input),
                    _ => detail.input,
                }
                .ok_or_else(|| FeedbackError::InvalidEvent("event has no message".to_string()))?;
                Ok(Self {
                    status: detail.status,
                    message: WorkflowMessage::from_json(&body)?,
                })
            }
        }
    }
}

/// What happened to the originating queue message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueAction {
    None,
    Deleted,
    VisibilityReset(Duration),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedbackOutcome {
    /// The execution has not finished; nothing was changed
    Skipped { status: ExecutionStatus },
    Applied {
        status: ExecutionStatus,
        slot_released: bool,
        queue_action: QueueAction,
    },
}

/// Applies terminal status events to semaphores and source queues
pub struct CompletionHandler<S, Q> {
    semaphore: Semaphore<S>,
    queue: Q,
    config: FeedbackConfig,
}

impl<S: Store, Q: WorkQueue> CompletionHandler<S, Q> {
    pub fn new(semaphore: Semaphore<S>, queue: Q, config: FeedbackConfig) -> Self {
        Self {
            semaphore,
            queue,
            config,
        }
    }

    pub async fn handle(
        &self,
        event: &WorkflowStatusEvent,
    ) -> Result<FeedbackOutcome, FeedbackError> {
        let status = event.status;
        let execution_name = event.message.execution_name().unwrap_or_default();
        if !status.is_terminal() {
            tracing::debug!(execution_name, %status, "execution not finished");
            return Ok(FeedbackOutcome::Skipped { status });
        }

        let slot_released = self.release_slot(&event.message).await?;
        let queue_action = self.update_source_queue(event).await?;
        tracing::info!(execution_name, %status, slot_released, ?queue_action, "completion applied");

        Ok(FeedbackOutcome::Applied {
            status,
            slot_released,
            queue_action,
        })
    }

    /// Release the execution's slot on the queue it was admitted from
    async fn release_slot(&self, message: &WorkflowMessage) -> Result<bool, FeedbackError> {
        let Some(queue) = message.queue_name() else {
            return Ok(false);
        };
        if message.execution_limit(queue).is_none() {
            return Ok(false);
        }
        match self.semaphore.down(queue).await {
            Ok(_) => Ok(true),
            Err(CoordinationError::SemaphoreUnderflow { .. }) => {
                tracing::warn!(queue, "slot already released, ignoring repeated completion");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_source_queue(
        &self,
        event: &WorkflowStatusEvent,
    ) -> Result<QueueAction, FeedbackError> {
        let Some(source) = event.message.event_source() else {
            return Ok(QueueAction::None);
        };
        let same_workflow = source.workflow_name.is_some()
            && source.workflow_name.as_deref() == event.message.workflow_name();
        if source.kind != QUEUE_EVENT_SOURCE || !source.delete_completed_message || !same_workflow {
            return Ok(QueueAction::None);
        }

        let queue_url = source
            .queue_url
            .as_deref()
            .ok_or(FeedbackError::MissingField("queueUrl"))?;
        let receipt_handle = source
            .receipt_handle
            .as_deref()
            .ok_or(FeedbackError::MissingField("receiptHandle"))?;

        if event.status == ExecutionStatus::Succeeded {
            self.queue.delete(queue_url, receipt_handle).await?;
            Ok(QueueAction::Deleted)
        } else {
            let visibility = self.config.retry_visibility;
            self.queue
                .change_visibility(queue_url, receipt_handle, visibility)
                .await?;
            Ok(QueueAction::VisibilityReset(visibility))
        }
    }
}

#[cfg(test)]
#[path = "feedback_tests.rs"]
mod tests;
