// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared by the coordination primitives

use crate::store::StoreError;
use thiserror::Error;

/// Coarse classification callers branch on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Capacity is exhausted right now; leave the work pending and retry later
    ResourcesLocked,
    /// A live lock is held by another owner
    LockConflict,
    /// Anything else from the backend; not retried here
    Backend,
}

/// Errors from semaphores, locks and connection permits
#[derive(Debug, Error)]
pub enum CoordinationError {
    #[error("resources locked: {0}")]
    ResourcesLocked(String),

    #[error("lock {key} is held by {owner}")]
    LockConflict { key: String, owner: String },

    #[error("semaphore {key} is already at zero")]
    SemaphoreUnderflow { key: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CoordinationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoordinationError::ResourcesLocked(_) => ErrorKind::ResourcesLocked,
            CoordinationError::LockConflict { .. } => ErrorKind::LockConflict,
            CoordinationError::SemaphoreUnderflow { .. } | CoordinationError::Store(_) => {
                ErrorKind::Backend
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::ResourcesLocked
    }

    /// The owner blocking a lock operation, when known
    pub fn conflicting_owner(&self) -> Option<&str> {
        match self {
            CoordinationError::LockConflict { owner, .. } => Some(owner),
            _ => None,
        }
    }
}
