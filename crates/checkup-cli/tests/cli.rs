#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const ENV_VARS: &[&str] = &[
    "CHECKUP_PROJECT_ID",
    "CHECKUP_ACCOUNT_ID",
    "CHECKUP_APP_ID",
    "CHECKUP_BINARY_PATH",
    "CHECKUP_CREDENTIAL_ID",
    "CHECKUP_SECRETS_DIR",
    "CHECKUP_STATE_FILE",
    "CHECKUP_NO_WAIT",
    "CHECKUP_NO_GENERATE_REPORT",
    "CHECKUP_SEVERITY_THRESHOLD",
    "CHECKUP_FAIL_ON",
    "CHECKUP_BASE_URL",
];

fn checkup_cmd() -> Command {
    let mut cmd = Command::cargo_bin("checkup-cli").expect("binary should be built");
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

/// Upload invocation against an unroutable base URL; every test here fails
/// before any request is sent.
fn upload_cmd(binary_path: &str) -> Command {
    let mut cmd = checkup_cmd();
    cmd.args([
        "upload",
        "--project-id",
        "checks-upload",
        "--account-id",
        "1",
        "--app-id",
        "12",
        "--binary-path",
        binary_path,
        "--base-url",
        "http://127.0.0.1:9",
    ]);
    cmd
}

fn secrets_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("ci"), "test-token").unwrap();
    dir
}

#[test]
fn help_lists_subcommands() {
    checkup_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: checkup-cli"))
        .stdout(predicate::str::contains("upload"))
        .stdout(predicate::str::contains("resume"));
}

#[test]
fn missing_credentials_exit_2() {
    upload_cmd("app.apk")
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "must provide initialized credentials",
        ));
}

#[test]
fn unknown_credential_id_exit_2() {
    let secrets = secrets_dir();
    upload_cmd("app.apk")
        .arg("--credential-id")
        .arg("nope")
        .arg("--secrets-dir")
        .arg(secrets.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("credential `nope` is not set"));
}

#[test]
fn missing_artifact_exit_2() {
    let secrets = secrets_dir();
    upload_cmd("./wrong-path-to-binary.apk")
        .arg("--credential-id")
        .arg("ci")
        .arg("--secrets-dir")
        .arg(secrets.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("artifact not found"))
        .stderr(predicate::str::contains("Uploading ./wrong-path-to-binary.apk"));
}

#[test]
fn options_can_come_from_environment() {
    let secrets = secrets_dir();
    checkup_cmd()
        .arg("upload")
        .env("CHECKUP_PROJECT_ID", "checks-upload")
        .env("CHECKUP_ACCOUNT_ID", "1")
        .env("CHECKUP_APP_ID", "12")
        .env("CHECKUP_BINARY_PATH", "./wrong-path-to-binary.apk")
        .env("CHECKUP_CREDENTIAL_ID", "ci")
        .env("CHECKUP_SECRETS_DIR", secrets.path())
        .env("CHECKUP_BASE_URL", "http://127.0.0.1:9")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("artifact not found"));
}

#[test]
fn invalid_threshold_is_rejected() {
    upload_cmd("app.apk")
        .arg("--severity-threshold")
        .arg("critical")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn resume_without_state_file_exit_2() {
    let dir = TempDir::new().unwrap();
    checkup_cmd()
        .arg("resume")
        .arg("--state-file")
        .arg(dir.path().join("missing.json"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("poll state"));
}

#[test]
fn missing_required_option_is_a_usage_error() {
    checkup_cmd()
        .args(["upload", "--project-id", "p"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--account-id"));
}
