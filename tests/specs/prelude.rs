//! Shared harness for CLI behavior tests
//!
//! Each test gets its own temporary project directory; the CLI state root is
//! `<project>/.swath`.

pub use serde_json::{json, Value};

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Exit code when capacity is exhausted
pub const EXIT_RESOURCES_LOCKED: i32 = 2;
/// Exit code when a lock is held by another owner
pub const EXIT_LOCK_CONFLICT: i32 = 3;

/// Template for a workflow allowed two concurrent executions from `granules`
pub const TEMPLATE: &str = r#"{
  "cumulus_meta": {
    "queueExecutionLimits": { "granules": 2 }
  },
  "meta": { "stack": "test" },
  "exception": "None"
}"#;

pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn root(&self) -> PathBuf {
        self.path().join(".swath")
    }

    /// Write a file relative to the project directory
    pub fn file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn swath(&self) -> Cli {
        let mut cmd = Command::cargo_bin("swath").unwrap();
        cmd.current_dir(self.path())
            .env("SWATH_ROOT", self.root())
            .env_remove("SWATH_LOG");
        Cli { cmd }
    }

    /// Build a message from [`TEMPLATE`] and queue it on `granules`
    pub fn send_granule(&self, execution_name: &str) {
        let template = self.file("template.json", TEMPLATE);
        self.swath()
            .args(&[
                "message",
                "build",
                "--template",
                template.to_str().unwrap(),
                "--workflow",
                "IngestGranule",
                "--state-machine",
                "ingest",
                "--queue",
                "granules",
                "--execution-name",
                execution_name,
                "--send",
            ])
            .passes();
    }

    /// Started executions of the `ingest` state machine
    pub fn executions(&self) -> Vec<Value> {
        let output = self
            .swath()
            .args(&["--output", "json", "executions", "ingest"])
            .passes();
        match output.stdout_json() {
            Value::Array(items) => items,
            other => panic!("expected array, got {other}"),
        }
    }
}

pub struct Cli {
    cmd: Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn stdin(mut self, input: &str) -> Self {
        self.cmd.write_stdin(input.to_string());
        self
    }

    pub fn passes(mut self) -> Output {
        let output = self.cmd.output().unwrap();
        assert!(
            output.status.success(),
            "expected success, got {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
        Output(output)
    }

    pub fn fails(mut self) -> Output {
        let output = self.cmd.output().unwrap();
        assert!(
            !output.status.success(),
            "expected failure\nstdout: {}",
            String::from_utf8_lossy(&output.stdout),
        );
        Output(output)
    }

    pub fn exits(self, code: i32) -> Output {
        let output = self.fails();
        assert_eq!(output.0.status.code(), Some(code), "stderr: {}", output.stderr());
        output
    }
}

pub struct Output(std::process::Output);

impl Output {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.0.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.0.stderr).into_owned()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(expected), "stdout missing {expected:?}:\n{stdout}");
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(expected), "stderr missing {expected:?}:\n{stderr}");
        self
    }

    pub fn stdout_json(&self) -> Value {
        serde_json::from_slice(&self.0.stdout).unwrap()
    }
}
