// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::fmt;
use swath_adapters::ExecutionRecord;

use crate::context::Context;
use crate::output;

#[derive(Args)]
pub struct ExecutionsArgs {
    /// State machine whose executions to list
    pub state_machine: String,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
struct ExecutionRow(ExecutionRecord);

impl fmt::Display for ExecutionRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<40} {}", self.0.name, self.0.start_date)
    }
}

pub fn handle(args: ExecutionsArgs, ctx: &Context) -> Result<()> {
    let rows: Vec<ExecutionRow> = ctx
        .orchestrator()
        .inner()
        .executions(&args.state_machine)?
        .into_iter()
        .map(ExecutionRow)
        .collect();
    output::emit_rows(&rows, ctx.format)
}
