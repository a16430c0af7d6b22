// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::fmt;
use swath_core::Semaphore;

use crate::context::Context;
use crate::error::CliError;
use crate::output;

#[derive(Args)]
pub struct SemaphoreArgs {
    #[command(subcommand)]
    pub command: SemaphoreCommand,
}

#[derive(Subcommand)]
pub enum SemaphoreCommand {
    /// Show the current count
    Show { key: String },
    /// Take a slot if the count is below --max
    Up {
        key: String,
        #[arg(long)]
        max: u64,
    },
    /// Release a slot
    Down { key: String },
}

#[derive(Debug, Serialize)]
struct SemaphoreCount {
    key: String,
    count: u64,
}

impl fmt::Display for SemaphoreCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.count)
    }
}

pub async fn handle(command: SemaphoreCommand, ctx: &Context) -> Result<()> {
    let semaphore = Semaphore::new(ctx.store()?);

    let (key, count) = match command {
        SemaphoreCommand::Show { key } => {
            let count = semaphore.count(&key).await.map_err(CliError::from)?;
            (key, count)
        }
        SemaphoreCommand::Up { key, max } => {
            let count = semaphore.up(&key, max).await.map_err(CliError::from)?;
            (key, count)
        }
        SemaphoreCommand::Down { key } => {
            let count = semaphore.down(&key).await.map_err(CliError::from)?;
            (key, count)
        }
    };

    output::emit(&SemaphoreCount { key, count }, ctx.format)
}
