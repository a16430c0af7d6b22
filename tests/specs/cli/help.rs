//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    let temp = Project::empty();
    temp.swath()
        .args(&["--help"])
        .passes()
        .stdout_has("message")
        .stdout_has("dispatch")
        .stdout_has("feedback")
        .stdout_has("semaphore")
        .stdout_has("lock")
        .stdout_has("connections");
}

#[test]
fn unknown_command_fails() {
    let temp = Project::empty();
    temp.swath().args(&["frobnicate"]).fails();
}

#[test]
fn semaphore_up_requires_max() {
    let temp = Project::empty();
    temp.swath()
        .args(&["semaphore", "up", "granules"])
        .fails()
        .stderr_has("--max");
}

#[test]
fn dispatch_requires_a_queue() {
    let temp = Project::empty();
    temp.swath()
        .args(&["dispatch"])
        .fails()
        .stderr_has("--queue");
}
