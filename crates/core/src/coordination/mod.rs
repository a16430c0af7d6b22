// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordination primitives shared between independent workers
//!
//! This module provides:
//! - **Semaphore** - Bounded counter capping concurrent executions per queue
//! - **LockManager** - TTL-bounded exclusive claims on named resources
//! - **ConnectionLock** - Per-provider permit pool for outbound connections
//!
//! All state lives in a [`Store`](crate::store::Store); every mutation is a
//! conditional write against the version just read.

pub mod connection;
pub mod mutex;
pub mod semaphore;

pub use connection::{ConnectionLock, ConnectionLockConfig, ConnectionToken, Provider};
pub use mutex::{LockManager, LockRecord, OwnerCheck};
pub use semaphore::{Semaphore, SemaphoreRecord};

/// Re-read/re-write rounds before contention is reported as `ResourcesLocked`
pub(crate) const MAX_CAS_ATTEMPTS: usize = 16;
