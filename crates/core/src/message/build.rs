// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Building queue messages from workflow templates

use super::{deep_merge, MessageError, WorkflowMessage};
use crate::id::IdGen;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Inputs for the orchestrator-facing section of a message
#[derive(Clone, Debug, Default)]
pub struct CumulusMetaParams {
    pub queue_name: String,
    pub state_machine: String,
    pub parent_execution_arn: Option<String>,
    pub async_operation_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulusMeta {
    pub execution_name: String,
    #[serde(rename = "queueName")]
    pub queue_name: String,
    pub state_machine: String,
    #[serde(
        rename = "parentExecutionArn",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_execution_arn: Option<String>,
    #[serde(
        rename = "asyncOperationId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub async_operation_id: Option<String>,
}

/// Inputs for the workflow-facing section of a message
#[derive(Clone, Debug, Default)]
pub struct MetaParams {
    pub workflow_name: String,
    pub collection: Option<Value>,
    pub provider: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub workflow_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Value>,
}

/// The workflow a message will start
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Workflow {
    pub name: String,
    /// State machine identifier passed to the orchestrator
    pub arn: String,
}

/// Everything needed to turn a template into a queue message
#[derive(Clone, Debug)]
pub struct MessageParams<'a> {
    pub template: &'a Value,
    pub workflow: Workflow,
    pub queue_name: String,
    pub payload: Value,
    pub provider: Option<Value>,
    pub collection: Option<Value>,
    pub parent_execution_arn: Option<String>,
    pub async_operation_id: Option<String>,
    pub custom_meta: Option<Value>,
    pub custom_cumulus_meta: Option<Value>,
    /// Reuse a known name instead of generating one, so a retried send
    /// collides with the execution it already started
    pub execution_name: Option<String>,
}

impl<'a> MessageParams<'a> {
    pub fn new(template: &'a Value, workflow: Workflow, queue_name: impl Into<String>) -> Self {
        Self {
            template,
            workflow,
            queue_name: queue_name.into(),
            payload: Value::Object(Map::new()),
            provider: None,
            collection: None,
            parent_execution_arn: None,
            async_operation_id: None,
            custom_meta: None,
            custom_cumulus_meta: None,
            execution_name: None,
        }
    }
}

/// Orchestrator-facing metadata with a freshly generated execution name
pub fn build_cumulus_meta(params: CumulusMetaParams, ids: &impl IdGen) -> CumulusMeta {
    CumulusMeta {
        execution_name: ids.next(),
        queue_name: params.queue_name,
        state_machine: params.state_machine,
        parent_execution_arn: params.parent_execution_arn,
        async_operation_id: params.async_operation_id,
    }
}

pub fn build_meta(params: MetaParams) -> Meta {
    Meta {
        workflow_name: params.workflow_name,
        collection: params.collection,
        provider: params.provider,
    }
}

/// Build a queue message from a workflow template
///
/// Each section is layered as template, then custom overrides, then the
/// computed values, with later layers winning. The template is left as-is.
pub fn build_queue_message_from_template(
    params: &MessageParams<'_>,
    ids: &impl IdGen,
) -> Result<WorkflowMessage, MessageError> {
    let Some(template) = params.template.as_object() else {
        return Err(MessageError::InvalidTemplate(
            "template must be a JSON object".to_string(),
        ));
    };

    let computed_cumulus_meta = build_cumulus_meta(
        CumulusMetaParams {
            queue_name: params.queue_name.clone(),
            state_machine: params.workflow.arn.clone(),
            parent_execution_arn: params.parent_execution_arn.clone(),
            async_operation_id: params.async_operation_id.clone(),
        },
        ids,
    );
    let computed_meta = build_meta(MetaParams {
        workflow_name: params.workflow.name.clone(),
        collection: params.collection.clone(),
        provider: params.provider.clone(),
    });

    let mut cumulus_meta = section(template, "cumulus_meta")?;
    overlay(&mut cumulus_meta, params.custom_cumulus_meta.as_ref(), "customCumulusMeta")?;
    deep_merge(&mut cumulus_meta, &serde_json::to_value(&computed_cumulus_meta)?);

    let mut meta = section(template, "meta")?;
    overlay(&mut meta, params.custom_meta.as_ref(), "customMeta")?;
    deep_merge(&mut meta, &serde_json::to_value(&computed_meta)?);

    let mut message = template.clone();
    message.insert("cumulus_meta".to_string(), cumulus_meta);
    message.insert("meta".to_string(), meta);
    message.insert("payload".to_string(), params.payload.clone());

    let mut message: WorkflowMessage = serde_json::from_value(Value::Object(message))?;
    if let Some(name) = &params.execution_name {
        message.set_cumulus_meta("execution_name", name.as_str());
    }
    Ok(message)
}

fn section(template: &Map<String, Value>, field: &'static str) -> Result<Value, MessageError> {
    match template.get(field) {
        None | Some(Value::Null) => Ok(Value::Object(Map::new())),
        Some(value @ Value::Object(_)) => Ok(value.clone()),
        Some(_) => Err(MessageError::NotAnObject(field)),
    }
}

fn overlay(
    base: &mut Value,
    custom: Option<&Value>,
    field: &'static str,
) -> Result<(), MessageError> {
    match custom {
        None | Some(Value::Null) => Ok(()),
        Some(value @ Value::Object(_)) => {
            deep_merge(base, value);
            Ok(())
        }
        Some(_) => Err(MessageError::NotAnObject(field)),
    }
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
