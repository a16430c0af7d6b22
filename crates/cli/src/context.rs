// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backends shared by every command, rooted at one state directory
//!
//! ```text
//! <root>/swath.toml          config (optional)
//! <root>/store/              coordination records
//! <root>/queues/<queue>/     spooled queue messages
//! <root>/executions/<sm>/    started executions
//! ```

use anyhow::Result;
use std::path::{Path, PathBuf};
use swath_adapters::{SpoolOrchestrator, SpoolQueue, TracedOrchestrator, TracedWorkQueue};
use swath_core::{SwathConfig, SystemClock, UuidIdGen, CONFIG_FILE};
use swath_storage::FileStore;

use crate::error::CliError;
use crate::output::OutputFormat;

pub type Queue = TracedWorkQueue<SpoolQueue<SystemClock, UuidIdGen>>;
pub type Orchestrator = TracedOrchestrator<SpoolOrchestrator<SystemClock>>;

pub struct Context {
    pub root: PathBuf,
    pub config: SwathConfig,
    pub format: OutputFormat,
}

impl Context {
    pub fn load(root: PathBuf, config: Option<&Path>, format: OutputFormat) -> Result<Self> {
        let config_path = config.map_or_else(|| root.join(CONFIG_FILE), Path::to_path_buf);
        let config = SwathConfig::load(&config_path).map_err(|e| {
            CliError::new(format!("cannot load {}", config_path.display()))
                .with_context(e.to_string())
                .with_suggestion("Check the file against the documented swath.toml keys")
        })?;
        tracing::debug!(root = %root.display(), "context loaded");
        Ok(Self {
            root,
            config,
            format,
        })
    }

    pub fn store(&self) -> Result<FileStore> {
        let path = self.root.join("store");
        FileStore::open(&path).map_err(|e| {
            CliError::new(format!("cannot open store at {}", path.display()))
                .with_source(e)
                .into()
        })
    }

    pub fn queue(&self) -> Queue {
        TracedWorkQueue::new(SpoolQueue::new(&self.root, SystemClock, UuidIdGen))
    }

    pub fn orchestrator(&self) -> Orchestrator {
        TracedOrchestrator::new(SpoolOrchestrator::new(&self.root, SystemClock))
    }
}
