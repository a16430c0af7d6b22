//! Semaphore specs
//!
//! Counters survive across processes and never exceed the caller's maximum.

use crate::prelude::*;

#[test]
fn show_is_zero_before_first_use() {
    let temp = Project::empty();
    temp.swath()
        .args(&["semaphore", "show", "granules"])
        .passes()
        .stdout_has("granules: 0");
}

#[test]
fn up_counts_across_invocations() {
    let temp = Project::empty();
    temp.swath()
        .args(&["semaphore", "up", "granules", "--max", "2"])
        .passes()
        .stdout_has("granules: 1");
    temp.swath()
        .args(&["semaphore", "up", "granules", "--max", "2"])
        .passes()
        .stdout_has("granules: 2");
    temp.swath()
        .args(&["semaphore", "show", "granules"])
        .passes()
        .stdout_has("granules: 2");
}

#[test]
fn up_at_maximum_exits_resources_locked() {
    let temp = Project::empty();
    temp.swath()
        .args(&["semaphore", "up", "granules", "--max", "1"])
        .passes();
    temp.swath()
        .args(&["semaphore", "up", "granules", "--max", "1"])
        .exits(EXIT_RESOURCES_LOCKED)
        .stderr_has("resources locked");
}

#[test]
fn down_releases_a_slot() {
    let temp = Project::empty();
    temp.swath()
        .args(&["semaphore", "up", "granules", "--max", "1"])
        .passes();
    temp.swath()
        .args(&["--output", "json", "semaphore", "down", "granules"])
        .passes()
        .stdout_has("\"count\": 0");
}

#[test]
fn down_at_zero_fails_and_leaves_counter() {
    let temp = Project::empty();
    temp.swath()
        .args(&["semaphore", "down", "granules"])
        .exits(1)
        .stderr_has("already at zero");
    temp.swath()
        .args(&["semaphore", "show", "granules"])
        .passes()
        .stdout_has("granules: 0");
}
