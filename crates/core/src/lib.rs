// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

//! swath-core: coordination primitives for queue-driven workflow dispatch
//!
//! This crate provides:
//! - A compare-and-swap [`Store`] contract with an in-memory implementation
//! - Semaphores, TTL locks and per-provider connection permits built on it
//! - The workflow message builder
//! - `swath.toml` configuration

pub mod clock;
pub mod config;
pub mod coordination;
pub mod error;
pub mod id;
pub mod message;
pub mod store;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, DispatchConfig, FeedbackConfig, SwathConfig, CONFIG_FILE};
pub use coordination::{
    ConnectionLock, ConnectionLockConfig, ConnectionToken, LockManager, LockRecord, OwnerCheck,
    Provider, Semaphore, SemaphoreRecord,
};
pub use error::{CoordinationError, ErrorKind};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use message::{
    build_queue_message_from_template, EventSource, MessageError, MessageParams, Workflow,
    WorkflowMessage, QUEUE_EVENT_SOURCE,
};
pub use store::{Expect, MemoryStore, Record, Store, StoreError, WriteOutcome};
