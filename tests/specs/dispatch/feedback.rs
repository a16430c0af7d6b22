//! Completion feedback specs
//!
//! A finished execution hands its slot back, and a message kept in flight
//! during the run is deleted on success.

use crate::prelude::*;

/// Dispatch one granule with the message kept in flight; returns the
/// execution's input message
fn start_tracked(temp: &Project) -> Value {
    temp.send_granule("g-1");
    temp.swath()
        .args(&[
            "dispatch",
            "--queue",
            "granules",
            "--message-limit",
            "1",
            "--keep-messages",
        ])
        .passes();
    temp.executions()[0]["input"].clone()
}

fn feedback(temp: &Project, status: &str, message: &Value) -> Cli {
    let event = json!({ "status": status, "message": message });
    let path = temp.file("event.json", &event.to_string());
    temp.swath()
        .args(&["feedback", "--event", path.to_str().unwrap()])
}

#[test]
fn tracked_message_records_its_source() {
    let temp = Project::empty();
    let input = start_tracked(&temp);
    let source = &input["meta"]["eventSource"];
    assert_eq!(source["type"], "sqs");
    assert_eq!(source["queueUrl"], "granules");
    assert_eq!(source["deleteCompletedMessage"], true);
    assert_eq!(source["workflow_name"], "IngestGranule");
}

#[test]
fn success_releases_slot_and_deletes_message() {
    let temp = Project::empty();
    let input = start_tracked(&temp);
    temp.swath()
        .args(&["queue", "depth", "granules"])
        .passes()
        .stdout_has("granules: 1");

    feedback(&temp, "SUCCEEDED", &input)
        .passes()
        .stdout_has("g-1 SUCCEEDED, slot released, message deleted");

    temp.swath()
        .args(&["semaphore", "show", "granules"])
        .passes()
        .stdout_has("granules: 0");
    temp.swath()
        .args(&["queue", "depth", "granules"])
        .passes()
        .stdout_has("granules: 0");
}

#[test]
fn failure_releases_slot_and_keeps_message() {
    let temp = Project::empty();
    let input = start_tracked(&temp);

    feedback(&temp, "FAILED", &input)
        .passes()
        .stdout_has("message visibility-reset");
    temp.swath()
        .args(&["queue", "depth", "granules"])
        .passes()
        .stdout_has("granules: 1");
}

#[test]
fn running_status_changes_nothing() {
    let temp = Project::empty();
    let input = start_tracked(&temp);

    feedback(&temp, "RUNNING", &input)
        .passes()
        .stdout_has("nothing to do");
    temp.swath()
        .args(&["semaphore", "show", "granules"])
        .passes()
        .stdout_has("granules: 1");
}

#[test]
fn repeated_completion_does_not_underflow() {
    let temp = Project::empty();
    let input = start_tracked(&temp);
    feedback(&temp, "ABORTED", &input).passes();

    let output = temp
        .swath()
        .args(&["--output", "json", "feedback", "--event", "event.json"])
        .passes();
    assert_eq!(output.stdout_json()["slotReleased"], false);
}

#[test]
fn state_change_event_from_stdin() {
    let temp = Project::empty();
    let input = start_tracked(&temp);
    let event = json!({
        "source": "aws.states",
        "detail": {
            "status": "SUCCEEDED",
            "input": input.to_string(),
            "output": input.to_string()
        }
    });

    temp.swath()
        .args(&["feedback", "--event", "-"])
        .stdin(&event.to_string())
        .passes()
        .stdout_has("message deleted");
}
