// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic, clippy::unwrap_used, clippy::expect_used))]

//! swath-storage: durable store backends shared between worker processes

mod file;

pub use file::FileStore;
