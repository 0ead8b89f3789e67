//! Integration tests for the `dsfctl` binary entry point.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

#[test]
fn help_lists_the_subcommands() {
    let mut command = cargo_bin_cmd!("dsfctl");
    command.arg("--help");
    command
        .assert()
        .success()
        .stdout(contains("subscribe").and(contains("intercept")));
}

#[test]
fn missing_codes_exit_with_failure() {
    let mut command = cargo_bin_cmd!("dsfctl");
    command.arg("code");
    command.assert().failure().stderr(contains("CODE"));
}

#[test]
fn absent_control_server_exits_with_failure() {
    let dir = tempfile::tempdir().expect("temp dir");
    let socket = dir.path().join("dcs.sock");
    let mut command = cargo_bin_cmd!("dsfctl");
    command.env_remove("DSF_SOCKET");
    command.arg("--socket").arg(&socket).arg("model");
    command
        .assert()
        .failure()
        .stderr(contains("failed to connect to the control server"));
}
