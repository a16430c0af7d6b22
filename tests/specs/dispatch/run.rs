//! Dispatch specs
//!
//! A dispatch run starts at most the queue's execution limit; the rest stay
//! queued for a later run.

use crate::prelude::*;

fn dispatch(temp: &Project, limit: &str) -> Cli {
    temp.swath().args(&[
        "dispatch",
        "--queue",
        "granules",
        "--message-limit",
        limit,
        "--time-limit",
        "1s",
    ])
}

#[test]
fn starts_queued_messages() {
    let temp = Project::empty();
    temp.send_granule("g-1");
    temp.send_granule("g-2");

    dispatch(&temp, "2")
        .passes()
        .stdout_has("Processed 2 message(s) from granules");

    let names: Vec<_> = temp.executions().iter().map(|e| e["name"].clone()).collect();
    assert_eq!(names, vec![json!("g-1"), json!("g-2")]);
    temp.swath()
        .args(&["queue", "depth", "granules"])
        .passes()
        .stdout_has("granules: 0");
}

#[test]
fn execution_limit_caps_starts() {
    let temp = Project::empty();
    for name in ["g-1", "g-2", "g-3"] {
        temp.send_granule(name);
    }

    dispatch(&temp, "3")
        .passes()
        .stdout_has("Processed 2 message(s)");

    assert_eq!(temp.executions().len(), 2);
    temp.swath()
        .args(&["semaphore", "show", "granules"])
        .passes()
        .stdout_has("granules: 2");
    temp.swath()
        .args(&["queue", "depth", "granules"])
        .passes()
        .stdout_has("granules: 1");
}

#[test]
fn started_execution_carries_queue_fields() {
    let temp = Project::empty();
    temp.send_granule("g-1");
    dispatch(&temp, "1").passes();

    let executions = temp.executions();
    let input = &executions[0]["input"];
    assert_eq!(input["cumulus_meta"]["queueName"], "granules");
    assert!(input["cumulus_meta"]["workflow_start_time"].is_u64());
    assert!(input["meta"].get("eventSource").is_none());
}

#[test]
fn empty_queue_stops_at_time_limit() {
    let temp = Project::empty();
    temp.swath()
        .args(&[
            "--output",
            "json",
            "dispatch",
            "--queue",
            "granules",
            "--message-limit",
            "5",
            "--time-limit",
            "0s",
        ])
        .passes()
        .stdout_has("\"processed\": 0");
}

const TWO_QUEUE_TEMPLATE: &str = r#"{
  "cumulus_meta": {
    "queueExecutionLimits": { "granules": 100, "pdrs": 100 }
  }
}"#;

fn send_to(temp: &Project, queue: &str, execution_name: &str) {
    let template = temp.file("two-queues.json", TWO_QUEUE_TEMPLATE);
    temp.swath()
        .args(&[
            "message",
            "build",
            "--template",
            template.to_str().unwrap(),
            "--workflow",
            "IngestGranule",
            "--state-machine",
            "ingest",
            "--queue",
            queue,
            "--execution-name",
            execution_name,
            "--send",
        ])
        .passes();
}

#[test]
fn several_queues_drain_in_one_run() {
    let temp = Project::empty();
    send_to(&temp, "granules", "g-1");
    send_to(&temp, "pdrs", "p-1");
    send_to(&temp, "pdrs", "p-2");

    temp.swath()
        .args(&[
            "dispatch", "--queue", "granules", "--queue", "pdrs", "--message-limit", "5",
            "--time-limit", "0s",
        ])
        .passes()
        .stdout_has("Processed 1 message(s) from granules")
        .stdout_has("Processed 2 message(s) from pdrs")
        .stdout_has("Processed 3 message(s) in total");
    assert_eq!(temp.executions().len(), 3);
}

#[test]
fn shared_rate_limit_caps_starts_across_queues() {
    let temp = Project::empty();
    for i in 0..4 {
        send_to(&temp, "granules", &format!("g-{i}"));
        send_to(&temp, "pdrs", &format!("p-{i}"));
    }

    let output = temp
        .swath()
        .args(&[
            "--output", "json", "dispatch", "--queue", "granules", "--queue", "pdrs",
            "--message-limit", "4", "--time-limit", "1s", "--rate-limit", "2",
        ])
        .passes();

    // Slots fall at 0s and 0.5s; the next would land on the 1s deadline
    let processed = output.stdout_json()["processed"].as_u64().unwrap();
    assert!((1..=2).contains(&processed), "processed {processed}");
    assert_eq!(temp.executions().len() as u64, processed);
}
