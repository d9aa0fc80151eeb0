//! End-to-end runs of the `ctxguard` binary against a fake agent script.

#![cfg(unix)]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

mod common;

use common::fixtures::{FakeAgent, install_history_fixture, load_status_fixture};

/// Isolated environment: fake agent, private history file, no config file.
struct Sandbox {
    dir: TempDir,
    agent: FakeAgent,
}

impl Sandbox {
    fn new(status_fixture: &str, compact_exit: i32) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let agent = FakeAgent::install(dir.path(), &load_status_fixture(status_fixture), compact_exit);
        Self { dir, agent }
    }

    fn history_path(&self) -> std::path::PathBuf {
        self.dir.path().join("state/history.json")
    }

    #[allow(deprecated)]
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("ctxguard").unwrap();
        cmd.env_clear()
            .env("PATH", std::env::var("PATH").unwrap_or_default())
            .env("HOME", self.dir.path())
            .env("CTXGUARD_CONFIG", self.dir.path().join("missing-config.toml"))
            .env("CTXGUARD_HISTORY_FILE", self.history_path())
            .env("CTXGUARD_AGENT_BIN", &self.agent.program)
            .env("CTXGUARD_LOG", "error")
            .env("NO_COLOR", "1");
        cmd
    }

    fn history(&self) -> Value {
        serde_json::from_str(&std::fs::read_to_string(self.history_path()).unwrap()).unwrap()
    }
}

fn json_stdout(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn status_is_default_command() {
    let sandbox = Sandbox::new("healthy", 0);

    sandbox
        .cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("Context Guardian Status"))
        .stdout(predicate::str::contains("Threshold: 75% (default)"))
        .stdout(predicate::str::contains("42%"))
        .stdout(predicate::str::contains("History events: 0"));

    assert!(!sandbox.history_path().exists());
    assert_eq!(sandbox.agent.compact_count(), 0);
}

#[test]
fn status_succeeds_when_usage_unreadable() {
    let sandbox = Sandbox::new("no_sessions", 0);

    sandbox
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: Unable to parse context"));
}

#[test]
fn check_compacts_when_critical() {
    let sandbox = Sandbox::new("critical", 0);

    sandbox
        .cmd()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("compacted"));

    assert_eq!(sandbox.agent.compact_count(), 1);
    let history = sandbox.history();
    let events = history["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["action"], "check");
    assert_eq!(events[1]["action"], "compact");
    assert_eq!(events[1]["percentage"], 95);
    assert_eq!(history["threshold"], 75);
}

#[test]
fn check_below_threshold_records_only_check() {
    let sandbox = Sandbox::new("healthy", 0);

    sandbox.cmd().arg("check").assert().success();

    assert_eq!(sandbox.agent.compact_count(), 0);
    assert_eq!(sandbox.history()["events"].as_array().unwrap().len(), 1);
}

#[test]
fn check_fails_when_compaction_fails() {
    let sandbox = Sandbox::new("critical", 2);

    sandbox
        .cmd()
        .arg("check")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("compaction failed"));

    assert_eq!(sandbox.agent.compact_count(), 1);
    assert_eq!(sandbox.history()["events"].as_array().unwrap().len(), 2);
}

#[test]
fn check_fails_without_usage_line() {
    let sandbox = Sandbox::new("no_sessions", 0);

    sandbox
        .cmd()
        .arg("check")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Check failed"));

    assert!(!sandbox.history_path().exists());
}

#[test]
fn check_fails_when_agent_missing() {
    let sandbox = Sandbox::new("healthy", 0);

    sandbox
        .cmd()
        .args(["check", "--agent-bin", "ctxguard-no-such-agent"])
        .assert()
        .code(1);

    assert!(!sandbox.history_path().exists());
}

#[test]
fn dry_run_records_without_compacting() {
    let sandbox = Sandbox::new("critical", 0);

    let output = sandbox
        .cmd()
        .args(["check", "--dry-run", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value = json_stdout(&output);
    assert_eq!(value["data"]["remediation"]["outcome"], "dryRun");
    assert_eq!(sandbox.agent.compact_count(), 0);
    assert_eq!(sandbox.history()["events"].as_array().unwrap().len(), 2);
}

#[test]
fn set_threshold_bounds() {
    let sandbox = Sandbox::new("healthy", 0);

    for bad in ["49", "96", "-1"] {
        sandbox
            .cmd()
            .args(["set-threshold", bad])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("threshold must be 50-95%"));
    }
    assert!(!sandbox.history_path().exists());

    for good in ["50", "95"] {
        sandbox
            .cmd()
            .args(["set-threshold", good])
            .assert()
            .success()
            .stdout(predicate::str::contains(format!("Threshold set to {good}%")));
    }
    assert_eq!(sandbox.history()["threshold"], 95);
}

#[test]
fn persisted_threshold_is_used_by_later_runs() {
    let sandbox = Sandbox::new("critical", 0);
    sandbox.cmd().args(["set-threshold", "95"]).assert().success();

    sandbox
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Threshold: 95% (history file)"));

    // 95% reaches a 95% threshold.
    sandbox.cmd().arg("check").assert().success();
    assert_eq!(sandbox.agent.compact_count(), 1);
}

#[test]
fn env_threshold_overrides_persisted() {
    let sandbox = Sandbox::new("healthy", 0);
    std::fs::create_dir_all(sandbox.history_path().parent().unwrap()).unwrap();
    install_history_fixture("legacy", &sandbox.history_path());

    let output = sandbox
        .cmd()
        .args(["status", "--json"])
        .env("CTXGUARD_THRESHOLD", "60")
        .output()
        .unwrap();

    let value = json_stdout(&output);
    assert_eq!(value["data"]["threshold"], 60);
    assert_eq!(value["data"]["thresholdSource"], "environment variable");
}

#[test]
fn env_override_run_keeps_saved_threshold() {
    let sandbox = Sandbox::new("healthy", 0);
    sandbox.cmd().args(["set-threshold", "80"]).assert().success();

    sandbox
        .cmd()
        .arg("check")
        .env("CTXGUARD_THRESHOLD", "60")
        .assert()
        .success();
    assert_eq!(sandbox.history()["threshold"], 80);
    assert_eq!(sandbox.history()["events"].as_array().unwrap().len(), 1);

    sandbox
        .cmd()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Threshold: 80% (history file)"));
}

#[test]
fn history_lists_newest_first() {
    let sandbox = Sandbox::new("healthy", 0);
    std::fs::create_dir_all(sandbox.history_path().parent().unwrap()).unwrap();
    install_history_fixture("legacy", &sandbox.history_path());

    sandbox
        .cmd()
        .args(["history", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recent Events (Last 2)"))
        .stdout(predicate::str::contains("1. [08:20:01.553871] compact: 82%"))
        .stdout(predicate::str::contains("2. [08:20:01.553870] check: 82%"))
        .stdout(predicate::str::contains("48%").not());

    let output = sandbox
        .cmd()
        .args(["history", "--limit", "10", "--json"])
        .output()
        .unwrap();
    let value = json_stdout(&output);
    assert_eq!(value["schemaVersion"], "ctxguard.v1");
    assert_eq!(value["command"], "history");
    assert_eq!(value["data"]["events"].as_array().unwrap().len(), 3);
}

#[test]
fn history_with_no_file_is_empty() {
    let sandbox = Sandbox::new("healthy", 0);

    sandbox
        .cmd()
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("No events recorded"));
}

#[test]
fn invalid_config_file_is_reported() {
    let sandbox = Sandbox::new("healthy", 0);
    let config = sandbox.dir.path().join("bad.toml");
    std::fs::write(&config, "[guardian\nthreshold = ").unwrap();

    sandbox
        .cmd()
        .arg("status")
        .env("CTXGUARD_CONFIG", &config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config parse error"));
}

#[test]
fn unknown_command_is_rejected() {
    let sandbox = Sandbox::new("healthy", 0);

    sandbox
        .cmd()
        .arg("notacommand")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized").or(predicate::str::contains("error")));
}
