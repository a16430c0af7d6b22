// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use swath_adapters::WorkQueue;

use super::read_input;
use crate::context::Context;
use crate::output;

#[derive(Args)]
pub struct QueueArgs {
    #[command(subcommand)]
    pub command: QueueCommand,
}

#[derive(Subcommand)]
pub enum QueueCommand {
    /// Send a raw message body
    Send {
        queue: String,
        /// Body file (`-` for stdin)
        #[arg(long)]
        body: PathBuf,
    },
    /// Count messages still on the queue, visible or in flight
    Depth { queue: String },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueueReport {
    queue: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    depth: Option<usize>,
}

impl fmt::Display for QueueReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.message_id, self.depth) {
            (Some(id), _) => write!(f, "Sent {} to {}", id, self.queue),
            (None, depth) => write!(f, "{}: {}", self.queue, depth.unwrap_or_default()),
        }
    }
}

pub async fn handle(command: QueueCommand, ctx: &Context) -> Result<()> {
    let queue = ctx.queue();

    let report = match command {
        QueueCommand::Send {
            queue: queue_url,
            body,
        } => {
            let body = read_input(&body)?;
            let message_id = queue
                .send(&queue_url, &body)
                .await
                .with_context(|| format!("cannot send to queue {}", queue_url))?;
            QueueReport {
                queue: queue_url,
                message_id: Some(message_id),
                depth: None,
            }
        }
        QueueCommand::Depth { queue: queue_url } => {
            let depth = queue.inner().depth(&queue_url)?;
            QueueReport {
                queue: queue_url,
                message_id: None,
                depth: Some(depth),
            }
        }
    };

    output::emit(&report, ctx.format)
}
