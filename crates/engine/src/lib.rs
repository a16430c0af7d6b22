// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Queue consumption, admission-controlled dispatch and completion feedback

mod consumer;
mod dispatch;
mod error;
mod feedback;
mod throttle;

pub use consumer::{staged_consumers, Consumer, ConsumerState};
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use error::{ConsumerError, DispatchError, FeedbackError};
pub use feedback::{
    CompletionHandler, ExecutionStatus, FeedbackOutcome, QueueAction, WorkflowStatusEvent,
};
pub use throttle::RateLimiter;
