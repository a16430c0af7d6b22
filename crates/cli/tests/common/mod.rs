// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test utilities for CLI integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Template allowing `limit` concurrent executions from `granules`
pub fn template(limit: u64) -> String {
    format!(
        r#"{{"cumulus_meta": {{"queueExecutionLimits": {{"granules": {}}}}}}}"#,
        limit
    )
}

/// Temp directory holding a swath state root at `.swath`
pub fn setup_test_env() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

pub fn state_root(dir: &Path) -> PathBuf {
    dir.join(".swath")
}

pub fn swath(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("swath").expect("swath binary");
    cmd.current_dir(dir)
        .env("SWATH_ROOT", state_root(dir))
        .env_remove("SWATH_LOG");
    cmd
}

/// Queue `count` granule messages built from [`template`]
pub fn send_granules(dir: &Path, count: usize, limit: u64) {
    let template_path = dir.join("template.json");
    fs::write(&template_path, template(limit)).expect("Failed to write template");
    for i in 0..count {
        swath(dir)
            .args([
                "message",
                "build",
                "--template",
                template_path.to_str().expect("utf-8 path"),
                "--workflow",
                "IngestGranule",
                "--state-machine",
                "ingest",
                "--queue",
                "granules",
                "--execution-name",
                &format!("g-{}", i),
                "--send",
            ])
            .assert()
            .success();
    }
}

/// Number of executions started on the `ingest` state machine
pub fn execution_count(dir: &Path) -> usize {
    let output = swath(dir)
        .args(["--output", "json", "executions", "ingest"])
        .output()
        .expect("Failed to list executions");
    let rows: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("executions output is JSON");
    rows.as_array().map_or(0, Vec::len)
}
