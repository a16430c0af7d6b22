// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::fmt;
use swath_core::{ConnectionLock, IdGen, Provider, SystemClock, UuidIdGen};

use crate::context::Context;
use crate::error::CliError;
use crate::output;

#[derive(Args)]
pub struct ConnectionsArgs {
    #[command(subcommand)]
    pub command: ConnectionsCommand,
}

#[derive(Subcommand)]
pub enum ConnectionsCommand {
    /// Count live permits, reaping abandoned ones
    Count { provider: String },
    /// Wait for a permit under --limit
    Acquire {
        provider: String,
        /// Permit id, usually the file being transferred (default: random)
        #[arg(long)]
        id: Option<String>,
        /// Provider's global connection limit; without one no permit is taken
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Return a permit
    Release {
        provider: String,
        /// Permit id given when it was acquired
        #[arg(long)]
        id: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionReport {
    provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    /// `count`, `acquired`, `unlimited` or `released`
    action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<u32>,
}

impl fmt::Display for ConnectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.id.as_deref().unwrap_or_default();
        match self.action {
            "count" => write!(f, "{}: {}", self.provider, self.count.unwrap_or_default()),
            "unlimited" => write!(f, "{}: no connection limit, proceeding", self.provider),
            action => write!(f, "{}: {} {}", self.provider, action, id),
        }
    }
}

pub async fn handle(command: ConnectionsCommand, ctx: &Context) -> Result<()> {
    let connections =
        ConnectionLock::with_config(ctx.store()?, SystemClock, ctx.config.connections.clone());

    let report = match command {
        ConnectionsCommand::Count { provider } => {
            let count = connections
                .count_lock(&provider)
                .await
                .map_err(CliError::from)?;
            ConnectionReport {
                provider,
                id: None,
                action: "count",
                count: Some(count),
            }
        }
        ConnectionsCommand::Acquire {
            provider,
            id,
            limit,
        } => {
            let id = id.unwrap_or_else(|| UuidIdGen.next());
            let mut target = Provider::new(&provider);
            if let Some(limit) = limit {
                target = target.with_limit(limit);
            }
            connections
                .proceed(&target, &id)
                .await
                .map_err(CliError::from)?;
            ConnectionReport {
                provider,
                id: Some(id),
                action: if limit.is_some() { "acquired" } else { "unlimited" },
                count: None,
            }
        }
        ConnectionsCommand::Release { provider, id } => {
            connections
                .remove_lock(&provider, &id)
                .await
                .map_err(CliError::from)?;
            ConnectionReport {
                provider,
                id: Some(id),
                action: "released",
                count: None,
            }
        }
    };

    output::emit(&report, ctx.format)
}
