// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use swath_core::Semaphore;
use swath_engine::{CompletionHandler, FeedbackOutcome, QueueAction, WorkflowStatusEvent};

use super::read_input;
use crate::context::Context;
use crate::output;

#[derive(Args)]
pub struct FeedbackArgs {
    /// Status event JSON file (`-` for stdin)
    #[arg(long)]
    pub event: PathBuf,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FeedbackReport {
    execution_name: String,
    status: String,
    applied: bool,
    slot_released: bool,
    /// `none`, `deleted` or `visibility-reset`
    queue_action: &'static str,
}

impl FeedbackReport {
    fn new(execution_name: &str, outcome: &FeedbackOutcome) -> Self {
        let execution_name = execution_name.to_string();
        match outcome {
            FeedbackOutcome::Skipped { status } => Self {
                execution_name,
                status: status.to_string(),
                applied: false,
                slot_released: false,
                queue_action: "none",
            },
            FeedbackOutcome::Applied {
                status,
                slot_released,
                queue_action,
            } => Self {
                execution_name,
                status: status.to_string(),
                applied: true,
                slot_released: *slot_released,
                queue_action: match queue_action {
                    QueueAction::None => "none",
                    QueueAction::Deleted => "deleted",
                    QueueAction::VisibilityReset(_) => "visibility-reset",
                },
            },
        }
    }
}

impl fmt::Display for FeedbackReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.applied {
            return write!(f, "{} is {}, nothing to do", self.execution_name, self.status);
        }
        write!(f, "{} {}", self.execution_name, self.status)?;
        if self.slot_released {
            write!(f, ", slot released")?;
        }
        match self.queue_action {
            "none" => Ok(()),
            action => write!(f, ", message {}", action),
        }
    }
}

pub async fn handle(args: FeedbackArgs, ctx: &Context) -> Result<()> {
    let event = WorkflowStatusEvent::from_json(&read_input(&args.event)?)?;
    let handler = CompletionHandler::new(
        Semaphore::new(ctx.store()?),
        ctx.queue(),
        ctx.config.feedback.clone(),
    );

    let outcome = handler.handle(&event).await?;
    let execution_name = event.message.execution_name().unwrap_or("execution");
    output::emit(&FeedbackReport::new(execution_name, &outcome), ctx.format)
}

#[cfg(test)]
#[path = "feedback_tests.rs"]
mod tests;
