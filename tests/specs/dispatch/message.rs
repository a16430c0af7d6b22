//! Message build specs

use crate::prelude::*;

fn build(temp: &Project) -> Cli {
    let template = temp.file("template.json", TEMPLATE);
    temp.swath().args(&[
        "message",
        "build",
        "--template",
        template.to_str().unwrap(),
        "--workflow",
        "IngestGranule",
        "--state-machine",
        "ingest",
        "--queue",
        "granules",
        "--provider",
        r#"{"id":"lpdaac"}"#,
        "--custom-meta",
        r#"{"stack":"override"}"#,
    ])
}

#[test]
fn build_prints_message() {
    let temp = Project::empty();
    let message = build(&temp).passes().stdout_json();

    assert_eq!(message["cumulus_meta"]["queueName"], "granules");
    assert_eq!(message["cumulus_meta"]["state_machine"], "ingest");
    assert_eq!(message["cumulus_meta"]["queueExecutionLimits"]["granules"], 2);
    assert!(message["cumulus_meta"]["execution_name"].is_string());
    assert_eq!(message["meta"]["workflow_name"], "IngestGranule");
    assert_eq!(message["meta"]["stack"], "override");
    assert_eq!(message["meta"]["provider"]["id"], "lpdaac");
    assert_eq!(message["exception"], "None");
}

#[test]
fn builds_get_distinct_execution_names() {
    let temp = Project::empty();
    let first = build(&temp).passes().stdout_json();
    let second = build(&temp).passes().stdout_json();
    assert_ne!(
        first["cumulus_meta"]["execution_name"],
        second["cumulus_meta"]["execution_name"]
    );
}

#[test]
fn template_from_stdin() {
    let temp = Project::empty();
    let output = temp
        .swath()
        .args(&[
            "message",
            "build",
            "--template",
            "-",
            "--workflow",
            "w",
            "--state-machine",
            "sm",
            "--queue",
            "q",
            "--execution-name",
            "fixed",
        ])
        .stdin("{}")
        .passes();
    assert_eq!(output.stdout_json()["cumulus_meta"]["execution_name"], "fixed");
}

#[test]
fn send_queues_the_message() {
    let temp = Project::empty();
    build(&temp)
        .args(&["--send"])
        .passes()
        .stdout_has("to granules (execution ");
    temp.swath()
        .args(&["queue", "depth", "granules"])
        .passes()
        .stdout_has("granules: 1");
}
