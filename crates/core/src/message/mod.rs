// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow-invocation messages
//!
//! A message is the JSON document placed on a work queue and later handed to
//! the orchestrator as execution input. Templates may carry arbitrary extra
//! fields, so the sections are kept as JSON maps and the fields this crate
//! relies on are reached through accessors.

mod build;
mod merge;

pub use build::{
    build_cumulus_meta, build_meta, build_queue_message_from_template, CumulusMeta,
    CumulusMetaParams, Meta, MetaParams, MessageParams, Workflow,
};
pub use merge::deep_merge;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from building or reading messages
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("invalid message template: {0}")]
    InvalidTemplate(String),
    #[error("message field {0} must be an object")]
    NotAnObject(&'static str),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Event source kind for messages received from a work queue
pub const QUEUE_EVENT_SOURCE: &str = "sqs";

/// Where a queued message came from, used to acknowledge it after the run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_handle: Option<String>,
    #[serde(default)]
    pub delete_completed_message: bool,
    #[serde(
        rename = "workflow_name",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub workflow_name: Option<String>,
}

/// A workflow-invocation message
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMessage {
    #[serde(default)]
    pub cumulus_meta: Map<String, Value>,
    #[serde(default)]
    pub meta: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
    /// Template fields outside the three known sections
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WorkflowMessage {
    /// Parse a queue message body
    pub fn from_json(body: &str) -> Result<Self, MessageError> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn to_json(&self) -> Result<String, MessageError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn execution_name(&self) -> Option<&str> {
        self.cumulus_meta.get("execution_name").and_then(Value::as_str)
    }

    pub fn state_machine(&self) -> Option<&str> {
        self.cumulus_meta.get("state_machine").and_then(Value::as_str)
    }

    pub fn queue_name(&self) -> Option<&str> {
        self.cumulus_meta.get("queueName").and_then(Value::as_str)
    }

    /// Maximum concurrent executions the producer set for `queue`
    pub fn execution_limit(&self, queue: &str) -> Option<u64> {
        self.cumulus_meta
            .get("queueExecutionLimits")
            .and_then(|limits| limits.get(queue))
            .and_then(Value::as_u64)
    }

    pub fn workflow_name(&self) -> Option<&str> {
        self.meta.get("workflow_name").and_then(Value::as_str)
    }

    /// The queue this message was received from, if recorded
    pub fn event_source(&self) -> Option<EventSource> {
        self.meta
            .get("eventSource")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn set_cumulus_meta(&mut self, field: &str, value: impl Into<Value>) {
        self.cumulus_meta.insert(field.to_string(), value.into());
    }

    pub fn set_meta(&mut self, field: &str, value: impl Into<Value>) {
        self.meta.insert(field.to_string(), value.into());
    }

    /// Record the queue message this workflow was started from
    pub fn set_event_source(&mut self, source: &EventSource) -> Result<(), MessageError> {
        self.set_meta("eventSource", serde_json::to_value(source)?);
        Ok(())
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
