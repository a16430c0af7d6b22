//! Error reporting specs
//!
//! Failures print `error:` with context on stderr and exit non-zero.

use crate::prelude::*;

#[test]
fn invalid_config_is_reported() {
    let temp = Project::empty();
    temp.file(".swath/swath.toml", "[dispatch]\nmessage_limit = 0\n");

    temp.swath()
        .args(&["semaphore", "show", "granules"])
        .exits(1)
        .stderr_has("error: cannot load")
        .stderr_has("message_limit");
}

#[test]
fn explicit_config_path_is_used() {
    let temp = Project::empty();
    let config = temp.file("custom.toml", "[connections]\npoll_interval = \"0s\"\n");

    temp.swath()
        .args(&["--config", config.to_str().unwrap(), "semaphore", "show", "q"])
        .exits(1)
        .stderr_has("poll_interval");
}

#[test]
fn missing_template_is_reported() {
    let temp = Project::empty();
    temp.swath()
        .args(&[
            "message",
            "build",
            "--template",
            "nope.json",
            "--workflow",
            "w",
            "--state-machine",
            "sm",
            "--queue",
            "q",
        ])
        .exits(1)
        .stderr_has("cannot read nope.json");
}

#[test]
fn malformed_event_is_reported() {
    let temp = Project::empty();
    let event = temp.file("event.json", "{\"status\": \"DANCING\"}");

    temp.swath()
        .args(&["feedback", "--event", event.to_str().unwrap()])
        .exits(1)
        .stderr_has("error:");
}
