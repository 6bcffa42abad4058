use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("pipexpect").unwrap();
    cmd.env_remove("RUST_LOG").timeout(Duration::from_secs(10));
    cmd
}

fn manifest_path(rel: &str) -> String {
    format!("{}/{}", env!("CARGO_MANIFEST_DIR"), rel)
}

fn script_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_demo_dialogue_passes() {
    cargo_bin()
        .arg("--script")
        .arg(manifest_path("demos/input.script"))
        .arg("--command")
        .arg("bash")
        .arg("--")
        .arg(manifest_path("tests/fixtures/input.sh"))
        .assert()
        .success()
        .stderr(predicate::str::contains("dialogue matched"));
}

#[test]
fn test_mismatch_fails_with_diff() {
    let script = script_file(
        "expect \"Enter your name:\"\nsend \"Adrian\"\nexpect \"Welcome Bob!\"\n",
    );
    cargo_bin()
        .arg("--script")
        .arg(script.path())
        .arg("--command")
        .arg("bash")
        .arg("--")
        .arg(manifest_path("tests/fixtures/input.sh"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Welcome Bob!").and(predicate::str::contains("Welcome Adrian!")));
}

#[test]
fn test_unknown_program() {
    let script = script_file("expect \"x\"\n");
    cargo_bin()
        .arg("--script")
        .arg(script.path())
        .arg("--command")
        .arg("definitely-not-a-command-4821")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot find"));
}

#[test]
fn test_invalid_script() {
    let script = script_file("shout \"x\"\n");
    cargo_bin()
        .arg("--script")
        .arg(script.path())
        .arg("--command")
        .arg("cat")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown command"));
}

#[test]
fn test_exit_status_only_fails_when_strict() {
    let script = script_file("expect \"hi\"\n");
    let run = |strict: bool| {
        let mut cmd = cargo_bin();
        cmd.arg("--script").arg(script.path());
        if strict {
            cmd.arg("--strict-exit");
        }
        cmd.arg("--command")
            .arg("sh")
            .arg("--")
            .arg("-c")
            .arg("echo hi; exit 3");
        cmd.assert()
    };

    run(false)
        .success()
        .stderr(predicate::str::contains("command error"));
    run(true)
        .failure()
        .stderr(predicate::str::contains("exit status: 3"));
}
