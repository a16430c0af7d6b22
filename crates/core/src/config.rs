// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `swath.toml` configuration
//!
//! Every section and field is optional; a missing file yields the defaults.

use crate::coordination::ConnectionLockConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// File name looked up in the state root
pub const CONFIG_FILE: &str = "swath.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: Box<toml::de::Error>,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings for one dispatch run against a work queue
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Stop after this many messages have been received
    pub message_limit: u64,
    /// Stop receiving once this much wall-clock time has passed
    #[serde(with = "humantime_serde")]
    pub time_limit: Duration,
    /// Visibility applied to messages at receive time
    #[serde(with = "humantime_serde")]
    pub visibility_timeout: Duration,
    /// Delete a message once its execution started; otherwise keep it in
    /// flight until completion feedback removes it
    pub delete_processed: bool,
    #[serde(with = "humantime_serde")]
    pub in_flight_visibility: Duration,
    #[serde(with = "humantime_serde")]
    pub empty_receive_backoff: Duration,
    pub rate_limit_per_second: Option<u32>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            message_limit: 1,
            time_limit: Duration::from_secs(120),
            visibility_timeout: Duration::from_secs(120),
            delete_processed: true,
            in_flight_visibility: Duration::from_secs(6 * 60 * 60),
            empty_receive_backoff: Duration::from_secs(1),
            rate_limit_per_second: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Visibility set on a message whose execution did not succeed
    #[serde(with = "humantime_serde")]
    pub retry_visibility: Duration,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            retry_visibility: Duration::from_secs(5),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwathConfig {
    pub dispatch: DispatchConfig,
    pub connections: ConnectionLockConfig,
    pub feedback: FeedbackConfig,
}

impl SwathConfig {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dispatch.message_limit == 0 {
            return Err(ConfigError::Invalid(
                "dispatch.message_limit must be at least 1".to_string(),
            ));
        }
        if self.dispatch.rate_limit_per_second == Some(0) {
            return Err(ConfigError::Invalid(
                "dispatch.rate_limit_per_second must be at least 1".to_string(),
            ));
        }
        if self.dispatch.empty_receive_backoff.is_zero() {
            return Err(ConfigError::Invalid(
                "dispatch.empty_receive_backoff must be non-zero".to_string(),
            ));
        }
        if self.connections.poll_interval.is_zero() {
            return Err(ConfigError::Invalid(
                "connections.poll_interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
