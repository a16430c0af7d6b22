// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rendering command reports for `--output`
//!
//! Every report type implements both `Display` (the text form) and
//! `Serialize` (the JSON form), so commands never branch on the format.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    /// Render a single report
    pub fn render<T: Serialize + Display>(self, report: &T) -> Result<String> {
        match self {
            OutputFormat::Text => Ok(report.to_string()),
            OutputFormat::Json => {
                serde_json::to_string_pretty(report).context("cannot encode report as JSON")
            }
        }
    }

    /// Render rows: one line each as text, a single array as JSON
    pub fn render_rows<T: Serialize + Display>(self, rows: &[T]) -> Result<String> {
        match self {
            OutputFormat::Text => Ok(rows
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Json => {
                serde_json::to_string_pretty(rows).context("cannot encode rows as JSON")
            }
        }
    }
}

/// Print a report to stdout
pub fn emit<T: Serialize + Display>(report: &T, format: OutputFormat) -> Result<()> {
    println!("{}", format.render(report)?);
    Ok(())
}

/// Print rows to stdout; an empty text listing prints nothing
pub fn emit_rows<T: Serialize + Display>(rows: &[T], format: OutputFormat) -> Result<()> {
    let rendered = format.render_rows(rows)?;
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
    Ok(())
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
