//! Lock specs

use crate::prelude::*;

fn acquire(temp: &Project, owner: &str) -> Cli {
    temp.swath()
        .args(&["lock", "acquire", "granule-7", "--owner", owner, "--timeout", "10m"])
}

#[test]
fn acquire_then_check() {
    let temp = Project::empty();
    acquire(&temp, "worker-a")
        .passes()
        .stdout_has("granule-7: acquired by worker-a");

    temp.swath()
        .args(&["lock", "check", "granule-7", "--owner", "worker-a"])
        .passes()
        .stdout_has("held by worker-a (you)");
    temp.swath()
        .args(&["lock", "check", "granule-7", "--owner", "worker-b"])
        .passes()
        .stdout_has("held by worker-a");
}

#[test]
fn check_without_lock() {
    let temp = Project::empty();
    temp.swath()
        .args(&["--output", "json", "lock", "check", "granule-7", "--owner", "w"])
        .passes()
        .stdout_has("\"state\": \"none\"");
}

#[test]
fn second_owner_exits_lock_conflict() {
    let temp = Project::empty();
    acquire(&temp, "worker-a").passes();
    acquire(&temp, "worker-b")
        .exits(EXIT_LOCK_CONFLICT)
        .stderr_has("held by 'worker-a'");
}

#[test]
fn release_by_other_owner_is_refused() {
    let temp = Project::empty();
    acquire(&temp, "worker-a").passes();
    temp.swath()
        .args(&["lock", "release", "granule-7", "--owner", "worker-b"])
        .exits(EXIT_LOCK_CONFLICT);
}

#[test]
fn released_lock_can_be_taken_again() {
    let temp = Project::empty();
    acquire(&temp, "worker-a").passes();
    temp.swath()
        .args(&["lock", "release", "granule-7", "--owner", "worker-a"])
        .passes()
        .stdout_has("released");
    acquire(&temp, "worker-b").passes();
}

#[test]
fn expired_lock_is_reclaimed() {
    let temp = Project::empty();
    temp.swath()
        .args(&["lock", "acquire", "granule-7", "--owner", "worker-a", "--timeout", "1ms"])
        .passes();
    std::thread::sleep(std::time::Duration::from_millis(20));
    acquire(&temp, "worker-b").passes();
}

#[test]
fn releasing_absent_lock_is_a_no_op() {
    let temp = Project::empty();
    temp.swath()
        .args(&["lock", "release", "granule-7", "--owner", "worker-a"])
        .passes();
}
