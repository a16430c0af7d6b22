//! Connection permit specs

use crate::prelude::*;

const FAST_POLL: &str = "[connections]\npoll_interval = \"10ms\"\nmax_attempts = 2\n";

#[test]
fn acquire_count_release() {
    let temp = Project::empty();
    temp.swath()
        .args(&["connections", "acquire", "lpdaac", "--id", "g1.hdf", "--limit", "2"])
        .passes()
        .stdout_has("lpdaac: acquired g1.hdf");
    temp.swath()
        .args(&["connections", "count", "lpdaac"])
        .passes()
        .stdout_has("lpdaac: 1");
    temp.swath()
        .args(&["connections", "release", "lpdaac", "--id", "g1.hdf"])
        .passes();
    temp.swath()
        .args(&["connections", "count", "lpdaac"])
        .passes()
        .stdout_has("lpdaac: 0");
}

#[test]
fn saturated_provider_exits_resources_locked() {
    let temp = Project::empty();
    temp.file(".swath/swath.toml", FAST_POLL);
    temp.swath()
        .args(&["connections", "acquire", "lpdaac", "--id", "g1.hdf", "--limit", "1"])
        .passes();
    temp.swath()
        .args(&["connections", "acquire", "lpdaac", "--id", "g2.hdf", "--limit", "1"])
        .exits(EXIT_RESOURCES_LOCKED);
}

#[test]
fn no_limit_takes_no_permit() {
    let temp = Project::empty();
    temp.swath()
        .args(&["connections", "acquire", "lpdaac"])
        .passes()
        .stdout_has("no connection limit");
    temp.swath()
        .args(&["connections", "count", "lpdaac"])
        .passes()
        .stdout_has("lpdaac: 0");
}

#[test]
fn release_requires_id() {
    let temp = Project::empty();
    temp.swath()
        .args(&["connections", "release", "lpdaac"])
        .exits(1)
        .stderr_has("--id");
}
