// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod connections;
pub mod dispatch;
pub mod executions;
pub mod feedback;
pub mod lock;
pub mod message;
pub mod queue;
pub mod semaphore;

use anyhow::{Context as _, Result};
use serde_json::Value;
use std::io::Read;
use std::path::Path;

/// Read a file argument; `-` reads stdin
pub(crate) fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("cannot read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

/// Parse an inline JSON argument
pub(crate) fn parse_json(flag: &str, text: &str) -> Result<Value> {
    serde_json::from_str(text).with_context(|| format!("{} is not valid JSON", flag))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
