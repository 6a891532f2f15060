//! CLI tests for the tabsync binary

use std::io::{BufRead, BufReader};
use std::process::Stdio;
use std::time::Duration;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const WATCHED: &str = "https://dash.example.com/d?view=x";

/// A tabsync command isolated from the user's config, logs and store
fn tabsync(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tabsync").expect("binary built");
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("NO_COLOR", "1")
        .arg("--store-dir")
        .arg(home.path().join("store"));
    cmd
}

#[test]
fn test_extract_prints_window_json() {
    let home = TempDir::new().unwrap();

    tabsync(&home)
        .args(["extract", "https://dash.example.com/d?from=1&to_ts=2&refresh_mode=paused"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"from\": \"1\""))
        .stdout(predicate::str::contains("\"to\": \"2\""))
        .stdout(predicate::str::contains("\"refreshMode\": \"paused\""));
}

#[test]
fn test_extract_text_without_window() {
    let home = TempDir::new().unwrap();

    tabsync(&home)
        .args(["extract", "--format", "text", "https://dash.example.com/d?view=x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(no time window)"));
}

#[test]
fn test_apply_preserves_other_parameters() {
    let home = TempDir::new().unwrap();

    tabsync(&home)
        .args([
            "apply",
            "https://dash.example.com/d?view=x&from=5",
            "--from",
            "100",
            "--to",
            "200",
        ])
        .assert()
        .success()
        .stdout(predicate::str::diff("https://dash.example.com/d?view=x&from_ts=100&to_ts=200\n"));
}

#[test]
fn test_publish_then_show() {
    let home = TempDir::new().unwrap();

    tabsync(&home)
        .args(["publish", "https://dash.example.com/d?from_ts=100&to_ts=200"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Published"));

    tabsync(&home)
        .args(["show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("100..200"))
        .stdout(predicate::str::contains("https://dash.example.com/d?from_ts=100&to_ts=200"));

    tabsync(&home)
        .args(["show", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"originTabKey\""))
        .stdout(predicate::str::contains("\"version\": 1"));
}

#[test]
fn test_publish_without_window_writes_nothing() {
    let home = TempDir::new().unwrap();

    tabsync(&home)
        .args(["publish", "https://dash.example.com/d?view=x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No timestamp found"));

    tabsync(&home)
        .args(["show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Slot is empty"));
}

#[test]
fn test_clear_empties_slot() {
    let home = TempDir::new().unwrap();

    tabsync(&home)
        .args(["publish", "https://dash.example.com/d?from_ts=1"])
        .assert()
        .success();
    tabsync(&home).args(["clear"]).assert().success();
    tabsync(&home)
        .args(["show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Slot is empty"));
}

#[test]
fn test_invalid_url_is_rejected() {
    let home = TempDir::new().unwrap();

    tabsync(&home)
        .args(["extract", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_explicit_config_missing_fails() {
    let home = TempDir::new().unwrap();

    tabsync(&home)
        .args(["--config", "missing.yml", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_show_reports_unreadable_envelope() {
    let home = TempDir::new().unwrap();
    let store = home.path().join("store");
    std::fs::create_dir_all(&store).unwrap();
    std::fs::write(
        store.join("dd-timestamp-sync.json"),
        r#"{"key":"dd-timestamp-sync","writer":"other","written-at":0,"value":"{not json","previous":null}"#,
    )
    .unwrap();

    tabsync(&home)
        .args(["show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Slot holds an unreadable envelope"));
}

#[test]
fn test_watch_move_does_not_publish() {
    let home = TempDir::new().unwrap();

    tabsync(&home)
        .args(["watch", WATCHED, "--duration", "1"])
        .write_stdin("https://dash.example.com/d?view=x&from_ts=7&to_ts=9\n")
        .timeout(Duration::from_secs(30))
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved to https://dash.example.com/d?view=x&from_ts=7&to_ts=9"))
        .stdout(predicate::str::contains("\"published\": 0"));

    tabsync(&home)
        .args(["show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Slot is empty"));
}

#[test]
fn test_watch_sync_publishes_current_location() {
    let home = TempDir::new().unwrap();

    tabsync(&home)
        .args(["watch", WATCHED, "--duration", "1"])
        .write_stdin("https://dash.example.com/d?view=x&from_ts=7&to_ts=9\nsync\n")
        .timeout(Duration::from_secs(30))
        .assert()
        .success()
        .stdout(predicate::str::contains("Published"))
        .stdout(predicate::str::contains("\"published\": 1"));

    tabsync(&home)
        .args(["show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("7..9"))
        .stdout(predicate::str::contains("Origin:   https://dash.example.com/d?view=x&from_ts=7&to_ts=9"));
}

#[test]
fn test_watch_applies_window_published_by_another_process() {
    let home = TempDir::new().unwrap();

    let mut watcher = std::process::Command::new(assert_cmd::cargo::cargo_bin("tabsync"))
        .current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("NO_COLOR", "1")
        .arg("--store-dir")
        .arg(home.path().join("store"))
        .args(["watch", WATCHED, "--duration", "3"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .spawn()
        .expect("watch started");

    let mut lines = BufReader::new(watcher.stdout.take().expect("piped stdout")).lines();
    // The subscription is live once the banner is printed
    let banner = lines.next().expect("watch output").unwrap();
    assert!(banner.contains("Watching as"));

    tabsync(&home)
        .args(["publish", "https://dash.example.com/other?from_ts=100&to_ts=200"])
        .assert()
        .success();

    let output: Vec<String> = lines.map(|l| l.unwrap()).collect();
    assert!(watcher.wait().unwrap().success());

    let output = output.join("\n");
    assert!(output.contains("+ 🕐 Syncing timestamp..."), "output: {}", output);
    assert!(
        output.contains("→ https://dash.example.com/d?view=x&from_ts=100&to_ts=200"),
        "output: {}",
        output
    );
    assert!(output.contains("\"applied\": 1"), "output: {}", output);
}
