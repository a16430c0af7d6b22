// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the work queue and workflow orchestrator

pub mod orchestrator;
pub mod queue;
mod spool;
pub mod traced;

pub use orchestrator::{
    execution_arn, ExecutionRecord, Orchestrator, OrchestratorError, SpoolOrchestrator,
};
pub use queue::{QueueError, QueueMessage, SpoolQueue, WorkQueue, MAX_RECEIVE_BATCH};
pub use traced::{TracedOrchestrator, TracedWorkQueue};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use orchestrator::{FakeOrchestrator, StartCall};
#[cfg(any(test, feature = "test-support"))]
pub use queue::{FakeWorkQueue, QueueCall};
