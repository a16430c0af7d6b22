// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use swath_core::{LockManager, OwnerCheck, SystemClock};

use crate::context::Context;
use crate::error::CliError;
use crate::output;

#[derive(Args)]
pub struct LockArgs {
    #[command(subcommand)]
    pub command: LockCommand,
}

#[derive(Subcommand)]
pub enum LockCommand {
    /// Compare an owner token with the current holder
    Check {
        key: String,
        #[arg(long)]
        owner: String,
    },
    /// Take the lock until --timeout passes
    Acquire {
        key: String,
        #[arg(long)]
        owner: String,
        /// How long the lock stays held without a release (e.g. 30s, 5m)
        #[arg(long, value_parser = humantime::parse_duration, default_value = "5m")]
        timeout: Duration,
    },
    /// Release a lock held by --owner
    Release {
        key: String,
        #[arg(long)]
        owner: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LockReport {
    key: String,
    /// `none`, `match`, `conflict`, `acquired` or `released`
    state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<String>,
    /// Epoch milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    expire: Option<u64>,
}

impl fmt::Display for LockReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let owner = self.owner.as_deref().unwrap_or_default();
        match self.state {
            "none" => write!(f, "{}: not locked", self.key),
            "match" => write!(f, "{}: held by {} (you)", self.key, owner),
            "conflict" => write!(f, "{}: held by {}", self.key, owner),
            "acquired" => write!(
                f,
                "{}: acquired by {} until {}",
                self.key,
                owner,
                self.expire.unwrap_or_default()
            ),
            state => write!(f, "{}: {}", self.key, state),
        }
    }
}

pub async fn handle(command: LockCommand, ctx: &Context) -> Result<()> {
    let locks = LockManager::new(ctx.store()?, SystemClock);

    let report = match command {
        LockCommand::Check { key, owner } => {
            let check = locks
                .check_matching_owner(&key, &owner)
                .await
                .map_err(CliError::from)?;
            let (state, owner) = match check {
                OwnerCheck::NoLock => ("none", None),
                OwnerCheck::Match => ("match", Some(owner)),
                OwnerCheck::Conflict(holder) => ("conflict", Some(holder)),
            };
            LockReport {
                key,
                state,
                owner,
                expire: None,
            }
        }
        LockCommand::Acquire {
            key,
            owner,
            timeout,
        } => {
            let record = locks
                .write_lock(&key, timeout, &owner)
                .await
                .map_err(CliError::from)?;
            LockReport {
                key,
                state: "acquired",
                owner: Some(record.owner),
                expire: Some(record.expire),
            }
        }
        LockCommand::Release { key, owner } => {
            locks.unlock(&key, &owner).await.map_err(CliError::from)?;
            LockReport {
                key,
                state: "released",
                owner: Some(owner),
                expire: None,
            }
        }
    };

    output::emit(&report, ctx.format)
}
