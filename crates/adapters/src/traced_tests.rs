// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::orchestrator::FakeOrchestrator;
use crate::queue::FakeWorkQueue;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs.clone())
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

#[tokio::test]
async fn traced_queue_rejects_oversized_batch_before_inner_call() {
    let fake = FakeWorkQueue::new();
    let traced = TracedWorkQueue::new(fake.clone());

    let result = traced.receive("q", 25, Duration::from_secs(1)).await;

    assert!(matches!(result, Err(QueueError::BatchTooLarge { requested: 25 })));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn traced_orchestrator_requires_names() {
    let fake = FakeOrchestrator::new();
    let traced = TracedOrchestrator::new(fake.clone());

    let result = traced.start_execution("sm", "", "{}").await;

    assert!(result.is_err());
    assert!(fake.calls().is_empty());
}

#[test]
fn traced_queue_send_and_receive_log_spans() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedWorkQueue::new(FakeWorkQueue::new());
        traced.send("granules", "{}").await?;
        traced.receive("granules", 10, Duration::from_secs(30)).await
    });

    assert_eq!(result.unwrap().len(), 1);
    assert!(logs.contains("queue.send"), "Logs:\n{}", logs);
    assert!(logs.contains("queue.receive"), "Logs:\n{}", logs);
    assert!(logs.contains("received=1"), "Logs:\n{}", logs);
}

#[test]
fn traced_orchestrator_logs_duplicate_as_warning() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedOrchestrator::new(FakeOrchestrator::new());
        traced.start_execution("sm", "exec-1", "{}").await?;
        traced.start_execution("sm", "exec-1", "{}").await
    });

    assert!(result.unwrap_err().is_already_exists());
    assert!(logs.contains("orchestrator.start"), "Logs:\n{}", logs);
    assert!(logs.contains("execution started"), "Logs:\n{}", logs);
    assert!(logs.contains("WARN"), "Logs:\n{}", logs);
    assert!(logs.contains("execution already exists"), "Logs:\n{}", logs);
}

#[test]
fn traced_queue_logs_delete_failure() {
    let (logs, result) = with_tracing(|| async {
        let traced = TracedWorkQueue::new(FakeWorkQueue::new());
        traced.delete("granules", "missing-receipt").await
    });

    assert!(matches!(result, Err(QueueError::ReceiptNotFound(_))));
    assert!(logs.contains("delete failed"), "Logs:\n{}", logs);
}
