// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use swath_adapters::WorkQueue;
use swath_core::{
    build_queue_message_from_template, IdGen, MessageParams, UuidIdGen, Workflow, WorkflowMessage,
};

use super::{parse_json, read_input};
use crate::context::Context;
use crate::output;

#[derive(Args)]
pub struct MessageArgs {
    #[command(subcommand)]
    pub command: MessageCommand,
}

#[derive(Subcommand)]
pub enum MessageCommand {
    /// Build a workflow message from a template, optionally queueing it
    Build(BuildArgs),
}

#[derive(Args)]
pub struct BuildArgs {
    /// Message template JSON file (`-` for stdin)
    #[arg(long)]
    pub template: PathBuf,
    /// Workflow name recorded in meta.workflow_name
    #[arg(long)]
    pub workflow: String,
    /// State machine the execution will run on
    #[arg(long)]
    pub state_machine: String,
    /// Queue whose execution limit applies
    #[arg(long)]
    pub queue: String,
    /// Payload JSON file
    #[arg(long)]
    pub payload: Option<PathBuf>,
    #[arg(long)]
    pub provider: Option<String>,
    #[arg(long)]
    pub collection: Option<String>,
    /// JSON object merged into meta before the computed fields
    #[arg(long)]
    pub custom_meta: Option<String>,
    /// JSON object merged into cumulus_meta before the computed fields
    #[arg(long)]
    pub custom_cumulus_meta: Option<String>,
    #[arg(long)]
    pub parent_execution_arn: Option<String>,
    #[arg(long)]
    pub async_operation_id: Option<String>,
    /// Use this execution name instead of generating one
    #[arg(long)]
    pub execution_name: Option<String>,
    /// Send the message to the queue instead of printing it
    #[arg(long)]
    pub send: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SentMessage {
    message_id: String,
    queue: String,
    execution_name: String,
}

impl fmt::Display for SentMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sent {} to {} (execution {})",
            self.message_id, self.queue, self.execution_name
        )
    }
}

pub async fn handle(command: MessageCommand, ctx: &Context) -> Result<()> {
    match command {
        MessageCommand::Build(args) => build(args, ctx).await,
    }
}

async fn build(args: BuildArgs, ctx: &Context) -> Result<()> {
    let template = parse_json("--template", &read_input(&args.template)?)?;
    let message = build_message(&args, &template, &UuidIdGen)?;

    if !args.send {
        println!("{}", serde_json::to_string_pretty(&message)?);
        return Ok(());
    }

    let body = message.to_json()?;
    let message_id = ctx
        .queue()
        .send(&args.queue, &body)
        .await
        .with_context(|| format!("cannot send to queue {}", args.queue))?;
    output::emit(
        &SentMessage {
            message_id,
            queue: args.queue,
            execution_name: message.execution_name().unwrap_or_default().to_string(),
        },
        ctx.format,
    )
}

fn build_message(
    args: &BuildArgs,
    template: &serde_json::Value,
    ids: &impl IdGen,
) -> Result<WorkflowMessage> {
    let workflow = Workflow {
        name: args.workflow.clone(),
        arn: args.state_machine.clone(),
    };
    let mut params = MessageParams::new(template, workflow, &args.queue);
    if let Some(path) = &args.payload {
        params.payload = parse_json("--payload", &read_input(path)?)?;
    }
    params.provider = args
        .provider
        .as_deref()
        .map(|text| parse_json("--provider", text))
        .transpose()?;
    params.collection = args
        .collection
        .as_deref()
        .map(|text| parse_json("--collection", text))
        .transpose()?;
    params.custom_meta = args
        .custom_meta
        .as_deref()
        .map(|text| parse_json("--custom-meta", text))
        .transpose()?;
    params.custom_cumulus_meta = args
        .custom_cumulus_meta
        .as_deref()
        .map(|text| parse_json("--custom-cumulus-meta", text))
        .transpose()?;
    params.parent_execution_arn = args.parent_execution_arn.clone();
    params.async_operation_id = args.async_operation_id.clone();
    params.execution_name = args.execution_name.clone();

    Ok(build_queue_message_from_template(&params, ids)?)
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
