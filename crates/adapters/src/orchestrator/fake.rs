// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake orchestrator for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{execution_arn, Orchestrator, OrchestratorError};
use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

/// Recorded start request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartCall {
    pub state_machine: String,
    pub name: String,
    pub input: String,
}

#[derive(Debug, Default)]
struct FakeOrchestratorState {
    started: HashSet<(String, String)>,
    calls: Vec<StartCall>,
    failures: VecDeque<String>,
}

/// Fake orchestrator that rejects duplicate execution names
#[derive(Clone, Default)]
pub struct FakeOrchestrator {
    state: Arc<Mutex<FakeOrchestratorState>>,
}

impl FakeOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeOrchestratorState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// All start requests, including rejected ones
    pub fn calls(&self) -> Vec<StartCall> {
        self.lock().calls.clone()
    }

    /// Number of executions actually started
    pub fn started_count(&self) -> usize {
        self.lock().started.len()
    }

    /// Fail the next start with a backend error
    pub fn fail_next(&self, reason: &str) {
        self.lock().failures.push_back(reason.to_string());
    }
}

#[async_trait]
impl Orchestrator for FakeOrchestrator {
    async fn start_execution(
        &self,
        state_machine: &str,
        name: &str,
        input: &str,
    ) -> Result<String, OrchestratorError> {
        let mut state = self.lock();
        state.calls.push(StartCall {
            state_machine: state_machine.to_string(),
            name: name.to_string(),
            input: input.to_string(),
        });
        if let Some(reason) = state.failures.pop_front() {
            return Err(OrchestratorError::Backend(reason));
        }
        if !state
            .started
            .insert((state_machine.to_string(), name.to_string()))
        {
            return Err(OrchestratorError::ExecutionAlreadyExists {
                state_machine: state_machine.to_string(),
                name: name.to_string(),
            });
        }
        Ok(execution_arn(state_machine, name))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
