//! Integration tests for the qabox command surface.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn qabox() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("qabox"));
    cmd.env("NO_COLOR", "1")
        .env_remove("W3TCQA_EC2_INSTANCE_TYPE")
        .env_remove("W3TCQA_EC2_KEY_NAME")
        .env_remove("W3TCQA_EC2_SECURITY_GROUP_ID")
        .env_remove("W3TCQA_ENV_DIR")
        .env_remove("W3TCQA_WORK_DIR");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help() {
    qabox()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Build and launch QA boxes on EC2"));
}

#[test]
fn test_cli_help_lists_commands() {
    qabox()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("image"))
        .stdout(predicate::str::contains("box"))
        .stdout(predicate::str::contains("wait"))
        .stdout(predicate::str::contains("marker"));
}

#[test]
fn test_version_command_shows_version() {
    qabox()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!(
            "qabox ",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_image_requires_subcommand() {
    qabox().arg("image").assert().failure();
}

#[test]
fn test_box_up_requires_name() {
    qabox()
        .args(["box", "up"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("<NAME>"));
}

// --- Validation before any cloud call ---

#[test]
fn test_invalid_image_name_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    qabox()
        .args(["image", "build", "Not_Valid"])
        .arg("--env-dir")
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid name 'Not_Valid'"));
}

#[test]
fn test_box_up_without_launch_settings_names_variables() {
    let dir = tempfile::tempdir().expect("tempdir");
    qabox()
        .args(["box", "up", "bar"])
        .arg("--env-dir")
        .arg(dir.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("W3TCQA_EC2_INSTANCE_TYPE"));
    assert!(
        !dir.path().join("working").exists(),
        "no run marker before configuration is complete"
    );
}

#[test]
fn test_image_build_without_vars_file_names_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    qabox()
        .args(["image", "build", "foo"])
        .arg("--env-dir")
        .arg(dir.path())
        .env("W3TCQA_EC2_INSTANCE_TYPE", "t3.medium")
        .env("W3TCQA_EC2_KEY_NAME", "qa-key")
        .env("W3TCQA_EC2_SECURITY_GROUP_ID", "sg-0123")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("vars.yml"));
}
