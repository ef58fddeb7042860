//! Integration tests for the `linkwatch` binary.
//!
//! Network-facing commands run against `--demo`, replay files, or a local
//! wiremock server, never a real access point.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INFO_PAGE: &str = "<script>\n\
setWirelessTable('00:26:18:85:25:87','','eth1','0:28:11','39M','78M','ok','-57','-79','22','453');\n\
</script>\n";

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the binary with env isolation.
///
/// Clears `LINKWATCH_*` variables and points config directories at a
/// nonexistent path so tests never touch the user's real settings.
fn linkwatch_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("linkwatch");
    cmd.env("HOME", "/tmp/linkwatch-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/linkwatch-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    for (key, _) in std::env::vars() {
        if key.starts_with("LINKWATCH_") {
            cmd.env_remove(key);
        }
    }
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/Info.live.htm")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    linkwatch_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("watch")
            .and(predicate::str::contains("check"))
            .and(predicate::str::contains("bands")),
    );
}

#[test]
fn test_version_flag() {
    linkwatch_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("linkwatch"));
}

#[test]
fn test_completions_bash() {
    linkwatch_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_demo_and_replay_conflict() {
    let output = linkwatch_cmd()
        .args(["--demo", "--replay", "samples.toml", "check"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Bands ───────────────────────────────────────────────────────────

#[test]
fn test_bands_lists_default_table() {
    linkwatch_cmd().arg("bands").assert().success().stdout(
        predicate::str::contains("error")
            .and(predicate::str::contains("nocon"))
            .and(predicate::str::contains("medium"))
            .and(predicate::str::contains("35")),
    );
}

#[test]
fn test_band_spec_without_nocon_is_rejected() {
    let output = linkwatch_cmd()
        .arg("bands")
        .env("LINKWATCH_BANDS", "-2:error, 0:low, 35:high")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("nocon"));
}

#[test]
fn test_unknown_classification_key_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("config.toml");
    std::fs::write(&settings, "classification_key = \"RSSI\"\n").unwrap();

    let output = linkwatch_cmd()
        .arg("--config")
        .arg(&settings)
        .arg("bands")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("RSSI"));
}

// ── Check ───────────────────────────────────────────────────────────

#[test]
fn test_check_demo_starts_with_error_state() {
    let output = linkwatch_cmd()
        .args(["--demo", "check", "--json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));

    let state: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(state["band"], "error");
    assert_eq!(state["tooltip"], "ERR: url connection timeout");
    assert!(state["level"].is_null());
}

#[test]
fn test_check_replay_file_classifies() {
    let dir = tempfile::tempdir().unwrap();
    let samples = dir.path().join("samples.toml");
    std::fs::write(
        &samples,
        "[[samples]]\nkind = \"fields\"\nfields = { Q10 = \"453\", SNR = \"22\" }\n",
    )
    .unwrap();

    linkwatch_cmd()
        .arg("--replay")
        .arg(&samples)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("high").and(predicate::str::contains("SNR: 22 / Q: 45%")));
}

#[test]
fn test_check_missing_replay_file() {
    let output = linkwatch_cmd()
        .args(["--replay", "/nonexistent/samples.toml", "check"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_check_live_device() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Info.live.htm"))
        .respond_with(ResponseTemplate::new(200).set_body_string(INFO_PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/Info.live.htm", server.uri());
    let output = linkwatch_cmd()
        .args(["--url", &url, "check", "--json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0), "{}", combined_output(&output));

    let state: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(state["band"], "high");
    assert_eq!(state["level"], 45);
}

#[test]
fn test_check_unreachable_device() {
    let output = linkwatch_cmd()
        .args(["--url", &closed_port_url(), "--timeout", "2", "check"])
        .timeout(Duration::from_secs(20))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7));
    let text = combined_output(&output);
    assert!(text.contains("error"), "{text}");
    assert!(text.contains("ERR: url"), "{text}");
}

// ── Watch ───────────────────────────────────────────────────────────

#[test]
fn test_watch_quits_on_q() {
    linkwatch_cmd()
        .args(["--demo", "watch"])
        .write_stdin("q\n")
        .timeout(Duration::from_secs(10))
        .assert()
        .success();
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_flag() {
    linkwatch_cmd()
        .args(["--config", "/tmp/somewhere/linkwatch.toml", "config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/tmp/somewhere/linkwatch.toml"));
}

#[test]
fn test_config_init_writes_only_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let settings = dir.path().join("config.toml");

    linkwatch_cmd()
        .arg("--config")
        .arg(&settings)
        .args(["--url", "http://10.0.0.1/Info.live.htm", "config", "init"])
        .assert()
        .success();

    let written = std::fs::read_to_string(&settings).unwrap();
    assert!(written.contains("url = \"http://10.0.0.1/Info.live.htm\""), "{written}");
    assert!(!written.contains("pattern"), "{written}");

    linkwatch_cmd()
        .arg("--config")
        .arg(&settings)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("http://10.0.0.1/Info.live.htm")
                .and(predicate::str::contains("update_interval = 30")),
        );

    let output = linkwatch_cmd()
        .arg("--config")
        .arg(&settings)
        .args(["config", "init"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--force"));
}
