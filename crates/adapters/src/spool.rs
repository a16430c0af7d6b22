// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory helpers shared by the spool-backed adapters

use fs2::FileExt;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

const LOCK_FILE: &str = ".lock";

/// File-system-safe name for a queue url, state machine or execution name
///
/// Percent-encoding keeps distinct names distinct. A leading `.` is encoded
/// too, so no name can become `.`, `..` or the spool's lock file.
pub(crate) fn sanitize(name: &str) -> String {
    let encoded = urlencoding::encode(name);
    match encoded.strip_prefix('.') {
        Some(rest) => format!("%2E{}", rest),
        None => encoded.into_owned(),
    }
}

pub(crate) fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Run `f` while holding an exclusive lock on `dir/.lock`
pub(crate) fn with_dir_lock<T, E>(dir: &Path, f: impl FnOnce() -> Result<T, E>) -> Result<T, E>
where
    E: From<io::Error>,
{
    std::fs::create_dir_all(dir)?;
    let lock = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(dir.join(LOCK_FILE))?;
    lock.lock_exclusive()?;
    let result = f();
    if let Err(e) = FileExt::unlock(&lock) {
        tracing::warn!(dir = %dir.display(), error = %e, "failed to release spool lock");
    }
    result
}

/// Replace `path` with the JSON encoding of `value` via temp file + rename
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let tmp = path.with_extension("tmp");
    let mut file = File::create(&tmp)?;
    serde_json::to_writer_pretty(&mut file, value)?;
    file.flush()?;
    file.sync_all()?;
    std::fs::rename(&tmp, path)
}

/// `*.json` entries directly under `dir`, sorted by file name
pub(crate) fn json_files(dir: &Path) -> io::Result<Vec<std::path::PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
#[path = "spool_tests.rs"]
mod tests;
