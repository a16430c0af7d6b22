// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for dispatch and feedback

use swath_adapters::{OrchestratorError, QueueError};
use swath_core::{CoordinationError, ErrorKind, MessageError};
use thiserror::Error;

/// Errors that end a consume run
#[derive(Debug, Error)]
pub enum ConsumerError {
    #[error(transparent)]
    Queue(#[from] QueueError),
}

/// Errors from starting one queued message
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid workflow message: {0}")]
    InvalidMessage(#[from] MessageError),
    #[error("workflow message is missing cumulus_meta.{0}")]
    MissingField(&'static str),
    #[error("workflow message has no queueExecutionLimits entry for {queue}")]
    MissingExecutionLimit { queue: String },
    #[error(transparent)]
    Coordination(#[from] CoordinationError),
    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),
}

impl DispatchError {
    /// Classification for callers that branch on retryability
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::Coordination(e) => e.kind(),
            _ => ErrorKind::Backend,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::ResourcesLocked
    }
}

/// Errors from applying a workflow status event
#[derive(Debug, Error)]
pub enum FeedbackError {
    #[error("invalid status event: {0}")]
    InvalidEvent(String),
    #[error("event source is missing {0}")]
    MissingField(&'static str),
    #[error(transparent)]
    Message(#[from] MessageError),
    #[error(transparent)]
    Coordination(#[from] CoordinationError),
    #[error(transparent)]
    Queue(#[from] QueueError),
}
