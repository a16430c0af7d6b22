// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use swath_core::{DispatchConfig, Semaphore, SystemClock};
use swath_engine::{staged_consumers, Dispatcher};

use crate::context::Context;
use crate::error::CliError;
use crate::output;

#[derive(Args)]
pub struct DispatchArgs {
    /// Queue to drain; repeat to drain several queues in one run
    #[arg(long = "queue", required = true)]
    pub queues: Vec<String>,
    /// Stop after receiving this many messages
    #[arg(long)]
    pub message_limit: Option<u64>,
    /// Stop receiving after this long (e.g. 30s, 2m)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub time_limit: Option<Duration>,
    /// Leave started messages in flight until feedback removes them
    #[arg(long)]
    pub keep_messages: bool,
    /// Start at most this many executions per second across all queues
    #[arg(long)]
    pub rate_limit: Option<u32>,
}

#[derive(Debug, Serialize)]
struct QueueSummary {
    queue: String,
    processed: u64,
}

#[derive(Debug, Serialize)]
struct DispatchSummary {
    processed: u64,
    queues: Vec<QueueSummary>,
}

impl DispatchSummary {
    fn new(queues: &[String], counts: Vec<u64>) -> Self {
        let queues: Vec<QueueSummary> = queues
            .iter()
            .zip(counts)
            .map(|(queue, processed)| QueueSummary {
                queue: queue.clone(),
                processed,
            })
            .collect();
        Self {
            processed: queues.iter().map(|q| q.processed).sum(),
            queues,
        }
    }
}

impl fmt::Display for DispatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self
            .queues
            .iter()
            .map(|q| format!("Processed {} message(s) from {}", q.processed, q.queue))
            .collect();
        write!(f, "{}", lines.join("\n"))?;
        if self.queues.len() > 1 {
            write!(f, "\nProcessed {} message(s) in total", self.processed)?;
        }
        Ok(())
    }
}

/// Apply command-line overrides on top of the loaded config
fn effective_config(args: &DispatchArgs, base: &DispatchConfig) -> Result<DispatchConfig> {
    let mut config = base.clone();
    if let Some(limit) = args.message_limit {
        if limit == 0 {
            return Err(CliError::new("--message-limit must be at least 1").into());
        }
        config.message_limit = limit;
    }
    if let Some(limit) = args.time_limit {
        config.time_limit = limit;
    }
    if args.keep_messages {
        config.delete_processed = false;
    }
    if let Some(rate) = args.rate_limit {
        if rate == 0 {
            return Err(CliError::new("--rate-limit must be at least 1").into());
        }
        config.rate_limit_per_second = Some(rate);
    }
    Ok(config)
}

pub async fn handle(args: DispatchArgs, ctx: &Context) -> Result<()> {
    let config = effective_config(&args, &ctx.config.dispatch)?;
    let track_source = !config.delete_processed;

    let queues = &args.queues;
    let consumers = staged_consumers(ctx.queue(), queues, &config, SystemClock);
    let dispatcher = Dispatcher::new(
        Semaphore::new(ctx.store()?),
        ctx.orchestrator(),
        SystemClock,
    )
    .with_source_tracking(track_source);

    let counts = tokio::select! {
        result = dispatcher.run_all(&consumers) => {
            result.with_context(|| format!("dispatch from {} failed", queues.join(", ")))?
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!(queues = ?queues, "interrupted, stopping dispatch");
            return Err(CliError::new("dispatch interrupted")
                .with_context("Messages already received stay invisible until their visibility timeout passes")
                .into());
        }
    };

    output::emit(&DispatchSummary::new(queues, counts), ctx.format)
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
