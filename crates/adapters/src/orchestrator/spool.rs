// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory-backed orchestrator
//!
//! Starting an execution records it at
//! `<root>/executions/<state-machine>/<name>.json`. The file is created with
//! create-new semantics, so a name can only ever be started once.

use super::{execution_arn, Orchestrator, OrchestratorError};
use crate::spool::{json_files, sanitize};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use swath_core::Clock;

/// A started execution as written to the spool
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub execution_arn: String,
    pub state_machine: String,
    pub name: String,
    /// Epoch milliseconds
    pub start_date: u64,
    pub input: Value,
}

#[derive(Clone, Debug)]
pub struct SpoolOrchestrator<C> {
    root: Arc<PathBuf>,
    clock: C,
}

impl<C: Clock> SpoolOrchestrator<C> {
    pub fn new(root: impl Into<PathBuf>, clock: C) -> Self {
        Self {
            root: Arc::new(root.into()),
            clock,
        }
    }

    fn machine_dir(&self, state_machine: &str) -> PathBuf {
        self.root.join("executions").join(sanitize(state_machine))
    }

    /// Executions started for `state_machine`, ordered by name
    pub fn executions(&self, state_machine: &str) -> Result<Vec<ExecutionRecord>, OrchestratorError> {
        let mut records = Vec::new();
        for path in json_files(&self.machine_dir(state_machine))? {
            let bytes = std::fs::read(&path)?;
            let record = serde_json::from_slice(&bytes)
                .map_err(|e| OrchestratorError::Backend(format!("{}: {}", path.display(), e)))?;
            records.push(record);
        }
        Ok(records)
    }
}

#[async_trait]
impl<C: Clock> Orchestrator for SpoolOrchestrator<C> {
    async fn start_execution(
        &self,
        state_machine: &str,
        name: &str,
        input: &str,
    ) -> Result<String, OrchestratorError> {
        let input: Value =
            serde_json::from_str(input).map_err(|e| OrchestratorError::InvalidInput(e.to_string()))?;
        let record = ExecutionRecord {
            execution_arn: execution_arn(state_machine, name),
            state_machine: state_machine.to_string(),
            name: name.to_string(),
            start_date: self.clock.epoch_ms(),
            input,
        };
        let dir = self.machine_dir(state_machine);
        let path = dir.join(format!("{}.json", sanitize(name)));
        let bytes = serde_json::to_vec_pretty(&record)
            .map_err(|e| OrchestratorError::Backend(e.to_string()))?;

        tokio::task::spawn_blocking(move || -> Result<(), OrchestratorError> {
            std::fs::create_dir_all(&dir)?;
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    return Err(OrchestratorError::ExecutionAlreadyExists {
                        state_machine: record.state_machine,
                        name: record.name,
                    });
                }
                Err(e) => return Err(e.into()),
            };
            file.write_all(&bytes)?;
            file.sync_all()?;
            Ok(())
        })
        .await
        .map_err(|e| OrchestratorError::Backend(format!("spool task failed: {}", e)))??;

        Ok(execution_arn(state_machine, name))
    }
}

#[cfg(test)]
#[path = "spool_tests.rs"]
mod tests;
