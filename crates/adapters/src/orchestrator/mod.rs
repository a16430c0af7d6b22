// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow orchestrator adapters

mod spool;

pub use spool::{ExecutionRecord, SpoolOrchestrator};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeOrchestrator, StartCall};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from orchestrator operations
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// An execution with this name was already started for the state machine
    #[error("execution {name} already exists for {state_machine}")]
    ExecutionAlreadyExists { state_machine: String, name: String },
    #[error("execution input is not valid JSON: {0}")]
    InvalidInput(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("orchestrator backend error: {0}")]
    Backend(String),
}

impl OrchestratorError {
    pub fn is_already_exists(&self) -> bool {
        matches!(self, OrchestratorError::ExecutionAlreadyExists { .. })
    }
}

/// Adapter for starting workflow executions
#[async_trait]
pub trait Orchestrator: Clone + Send + Sync + 'static {
    /// Start `state_machine` with a unique `name`; returns the execution id
    async fn start_execution(
        &self,
        state_machine: &str,
        name: &str,
        input: &str,
    ) -> Result<String, OrchestratorError>;
}

/// Execution identifier for a named run of a state machine
pub fn execution_arn(state_machine: &str, name: &str) -> String {
    format!("{}:{}", state_machine, name)
}
