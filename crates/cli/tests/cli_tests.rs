//! CLI integration tests

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn landslide(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_landslide"))
        .args(args)
        .env_remove("LANDSLIDE_SEED")
        .env_remove("LANDSLIDE_FAILURE_RATE")
        .env_remove("LANDSLIDE_CONFIG")
        .output()
        .expect("Failed to execute command")
}

fn landslide_with_stdin(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_landslide"))
        .args(args)
        .env_remove("LANDSLIDE_CONFIG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn command");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");

    child.wait_with_output().expect("Failed to wait for command")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = landslide(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Landslide Risk Monitor"), "Should show app name");
    assert!(stdout.contains("status"), "Should show status command");
    assert!(stdout.contains("watch"), "Should show watch command");
    assert!(stdout.contains("classify"), "Should show classify command");
    assert!(stdout.contains("locations"), "Should show locations command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = landslide(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("landslide"), "Should show binary name");
}

#[test]
fn test_classify_json() {
    let output = landslide(&["classify", "0.75", "--format", "json"]);

    assert!(output.status.success());
    let body = stdout_json(&output);
    assert_eq!(body["tier"], "high");
    assert_eq!(body["color"], "#f44336");
    assert_eq!(body["alert_severity"], "error");
    assert_eq!(body["recommendations"].as_array().unwrap().len(), 4);
}

#[test]
fn test_classify_boundaries() {
    for (risk, tier) in [("0.0", "low"), ("0.3", "moderate"), ("0.6", "high"), ("-0.2", "low")] {
        let output = landslide(&["--format", "json", "classify", risk]);
        assert!(output.status.success(), "classify {} should succeed", risk);
        assert_eq!(stdout_json(&output)["tier"], tier, "risk {}", risk);
    }
}

#[test]
fn test_classify_table() {
    let output = landslide(&["classify", "0.1"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Low landslide risk"));
    assert!(stdout.contains("Recommendations"));
}

#[test]
fn test_classify_rejects_non_number() {
    let output = landslide(&["classify", "high"]);
    assert!(!output.status.success());
}

#[test]
fn test_status_json() {
    let output = landslide(&["status", "--seed", "42", "--format", "json"]);

    assert!(output.status.success());
    let snapshot = stdout_json(&output);
    assert_eq!(snapshot["selected_location"], "PONTO-A");
    assert_eq!(snapshot["batch"].as_array().unwrap().len(), 10);
    assert_eq!(snapshot["chart_series"].as_array().unwrap().len(), 10);
    assert_eq!(snapshot["loading"], false);
    assert!(snapshot["error"].is_null());
    assert_eq!(
        snapshot["current"]["classification"]["tier"],
        snapshot["batch"][0]["status"]
    );
}

#[test]
fn test_status_is_reproducible_with_seed() {
    let first = stdout_json(&landslide(&["status", "--seed", "5", "-f", "json"]));
    let second = stdout_json(&landslide(&["status", "--seed", "5", "-f", "json"]));

    let risks = |snapshot: &serde_json::Value| -> Vec<f64> {
        snapshot["batch"]
            .as_array()
            .unwrap()
            .iter()
            .map(|sample| sample["risk_level"].as_f64().unwrap())
            .collect()
    };
    assert_eq!(risks(&first), risks(&second));
}

#[test]
fn test_status_for_other_location() {
    let output = landslide(&["status", "--location", "PONTO-B", "--format", "json"]);

    assert!(output.status.success());
    let snapshot = stdout_json(&output);
    assert_eq!(snapshot["selected_location"], "PONTO-B");
    assert_eq!(snapshot["batch"][0]["location"], "PONTO-B");
}

#[test]
fn test_status_table() {
    let output = landslide(&["status", "--seed", "3"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("PONTO-A"));
    assert!(stdout.contains("Conditions"));
    assert!(stdout.contains("Risk History"));
    assert!(stdout.contains("Recommendations"));
}

#[test]
fn test_status_source_failure() {
    let output = landslide(&["status", "--failure-rate", "1", "--format", "json"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("sample source unavailable"));
    let snapshot = stdout_json(&output);
    assert_eq!(snapshot["error"], "Failed to load data. Please try again.");
    assert!(snapshot["batch"].as_array().unwrap().is_empty());
}

#[test]
fn test_status_unknown_location() {
    let output = landslide(&["status", "--location", "PONTO-Z"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("unknown location: PONTO-Z"));
}

#[test]
fn test_locations_default() {
    let output = landslide(&["locations", "--format", "json"]);

    assert!(output.status.success());
    let body = stdout_json(&output);
    assert_eq!(body[0]["location"], "PONTO-A");
    assert_eq!(body[0]["default"], true);
    assert_eq!(body[1]["location"], "PONTO-B");
    assert_eq!(body[1]["default"], false);
}

#[test]
fn test_locations_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{"locations": ["PONTO-X", "PONTO-Y"], "default_location": "PONTO-Y"}"#,
    )
    .unwrap();

    let output = landslide(&[
        "locations",
        "--format",
        "json",
        "--config",
        path.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    let body = stdout_json(&output);
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[1]["location"], "PONTO-Y");
    assert_eq!(body[1]["default"], true);
}

#[test]
fn test_watch_quits_on_command() {
    let output = landslide_with_stdin(&["watch", "--seed", "1", "--format", "json"], "q\n");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let first = stdout.lines().next().expect("at least one snapshot");
    let snapshot: serde_json::Value = serde_json::from_str(first).unwrap();
    assert_eq!(snapshot["selected_location"], "PONTO-A");
}

#[test]
fn test_watch_reports_unknown_location() {
    let output = landslide_with_stdin(&["watch", "--format", "json"], "l PONTO-Z\nq\n");
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success());
    assert!(stderr.contains("unknown location: PONTO-Z"));
}

#[test]
fn test_watch_stops_at_end_of_input() {
    let output = landslide_with_stdin(&["watch", "--format", "json"], "");
    assert!(output.status.success());
}
