// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.
//!
//! Every failure leaves the process through [`CliError`], which also picks
//! the exit code scripts branch on:
//! - `1` for anything unexpected, including command-line usage errors
//! - `2` when capacity is exhausted and the call can be retried later
//! - `3` when a lock is held by someone else

use std::fmt;
use swath_core::CoordinationError;
use swath_engine::{DispatchError, FeedbackError};

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_RESOURCES_LOCKED: u8 = 2;
pub const EXIT_LOCK_CONFLICT: u8 = 3;

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct CliError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
    pub exit_code: u8,
    /// Original error if any
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CliError {
    /// Create a new error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            exit_code: EXIT_FAILURE,
            source: None,
        }
    }

    /// Add context about why this error might have happened.
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    /// Add a suggestion for how to fix this error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_exit_code(mut self, code: u8) -> Self {
        self.exit_code = code;
        self
    }

    /// Set the source error that caused this error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.context.push(source.to_string());
        self.source = Some(Box::new(source));
        self
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    /// Recover a `CliError` raised by a command, or describe any other error
    /// with its cause chain as context
    pub fn from_anyhow(err: anyhow::Error) -> Self {
        let err = match err.downcast::<CliError>() {
            Ok(cli_err) => return cli_err,
            Err(err) => err,
        };
        if let Some(coordination) = find_coordination(&err) {
            return Self::from_coordination(coordination);
        }

        let mut cli_err = CliError::new(err.to_string());
        for cause in err.chain().skip(1) {
            cli_err = cli_err.with_context(cause.to_string());
        }
        cli_err
    }

    fn from_coordination(err: &CoordinationError) -> Self {
        match err {
            CoordinationError::LockConflict { key, owner } => Self::lock_held(key, owner),
            CoordinationError::ResourcesLocked(detail) => Self::resources_locked(detail),
            CoordinationError::SemaphoreUnderflow { key } => Self::semaphore_underflow(key),
            CoordinationError::Store(e) => {
                CliError::new("coordination store failed").with_context(e.to_string())
            }
        }
    }
}

fn find_coordination(err: &anyhow::Error) -> Option<&CoordinationError> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<CoordinationError>() {
            return Some(e);
        }
        match cause.downcast_ref::<DispatchError>() {
            Some(DispatchError::Coordination(e)) => return Some(e),
            Some(_) | None => {}
        }
        match cause.downcast_ref::<FeedbackError>() {
            Some(FeedbackError::Coordination(e)) => Some(e),
            Some(_) | None => None,
        }
    })
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<CoordinationError> for CliError {
    fn from(err: CoordinationError) -> Self {
        Self::from_coordination(&err)
    }
}

/// Common error builders for typical failure scenarios.
impl CliError {
    /// A live lock is held by another owner.
    pub fn lock_held(key: &str, owner: &str) -> Self {
        CliError::new(format!("lock '{}' is held by '{}'", key, owner))
            .with_context("Locks stay held until released or until their timeout passes")
            .with_suggestion(format!("Check the holder: swath lock check {} --owner <token>", key))
            .with_suggestion("Retry after the holder's timeout")
            .with_exit_code(EXIT_LOCK_CONFLICT)
    }

    /// Capacity is exhausted right now.
    pub fn resources_locked(detail: &str) -> Self {
        CliError::new("resources locked")
            .with_context(detail.to_string())
            .with_suggestion("Retry once running executions complete")
            .with_exit_code(EXIT_RESOURCES_LOCKED)
    }

    pub fn semaphore_underflow(key: &str) -> Self {
        CliError::new(format!("semaphore '{}' is already at zero", key))
            .with_context("Every slot on this queue has already been released")
            .with_suggestion(format!("Inspect the counter: swath semaphore show {}", key))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
