//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against the dev data directory
//! and verify exit codes and outputs.

use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "focusnest-cli", "--"])
        .args(args)
        .env("FOCUSNEST_ENV", "dev")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn login() {
    let (_, stderr, code) = run_cli(&["auth", "login", "cli-test@example.com"]);
    assert_eq!(code, 0, "login failed: {stderr}");
}

#[test]
fn test_auth_login_and_status() {
    login();
    let (stdout, stderr, code) = run_cli(&["auth", "status"]);
    assert_eq!(code, 0, "auth status failed: {stderr}");
    assert!(stdout.contains("cli-test@example.com"));
}

#[test]
fn test_task_create_and_list() {
    login();
    let (stdout, stderr, code) = run_cli(&["task", "create", "CLI test task", "--tags", "a,b"]);
    assert_eq!(code, 0, "task create failed: {stderr}");
    assert!(stdout.contains("Task created:"));

    let (stdout, stderr, code) = run_cli(&["task", "list", "--json"]);
    assert_eq!(code, 0, "task list failed: {stderr}");
    let tasks: serde_json::Value = serde_json::from_str(&stdout).expect("task list is JSON");
    assert!(tasks.as_array().is_some());
}

#[test]
fn test_task_create_rejects_empty_title() {
    login();
    let (_, _, code) = run_cli(&["task", "create", "   "]);
    assert_ne!(code, 0, "blank title must be rejected");
}

#[test]
fn test_timer_status_is_json() {
    let (stdout, stderr, code) = run_cli(&["timer", "status"]);
    assert_eq!(code, 0, "timer status failed: {stderr}");
    let snapshot: serde_json::Value = serde_json::from_str(&stdout).expect("status is JSON");
    assert_eq!(snapshot["type"], "StateSnapshot");
}

#[test]
fn test_timer_start_pause_reset() {
    let (_, stderr, code) = run_cli(&["timer", "start"]);
    assert_eq!(code, 0, "timer start failed: {stderr}");

    let (_, stderr, code) = run_cli(&["timer", "pause"]);
    assert_eq!(code, 0, "timer pause failed: {stderr}");

    let (stdout, stderr, code) = run_cli(&["timer", "reset"]);
    assert_eq!(code, 0, "timer reset failed: {stderr}");
    assert!(stdout.contains("TimerReset"));
}

#[test]
fn test_timer_tick_counts_down() {
    run_cli(&["timer", "reset"]);
    run_cli(&["timer", "start"]);
    let (_, stderr, code) = run_cli(&["timer", "tick"]);
    assert_eq!(code, 0, "timer tick failed: {stderr}");

    let (stdout, _, _) = run_cli(&["timer", "status"]);
    let snapshot: serde_json::Value = serde_json::from_str(&stdout).expect("status is JSON");
    let remaining = snapshot["seconds_remaining"].as_u64().unwrap();
    let total = snapshot["seconds_total"].as_u64().unwrap();
    assert!(remaining < total);
}

#[test]
fn test_timer_rejects_unknown_preset() {
    let (_, stderr, code) = run_cli(&["timer", "preset", "90-20"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown preset"));
}

#[test]
fn test_config_get_set_list() {
    let (_, stderr, code) = run_cli(&["config", "set", "timer.preset", "50-10"]);
    assert_eq!(code, 0, "config set failed: {stderr}");

    let (stdout, stderr, code) = run_cli(&["config", "get", "timer.preset"]);
    assert_eq!(code, 0, "config get failed: {stderr}");
    assert_eq!(stdout.trim(), "50-10");

    let (stdout, stderr, code) = run_cli(&["config", "list"]);
    assert_eq!(code, 0, "config list failed: {stderr}");
    assert!(serde_json::from_str::<serde_json::Value>(&stdout).is_ok());

    let (_, _, code) = run_cli(&["config", "set", "timer.preset", "25-5"]);
    assert_eq!(code, 0);
}

#[test]
fn test_config_set_rejects_out_of_range() {
    let (_, _, code) = run_cli(&["config", "set", "timer.custom_work_min", "200"]);
    assert_ne!(code, 0, "out-of-range duration must be rejected");
}

#[test]
fn test_stats_weekly() {
    login();
    let (stdout, stderr, code) = run_cli(&["stats", "weekly"]);
    assert_eq!(code, 0, "stats weekly failed: {stderr}");
    let stats: serde_json::Value = serde_json::from_str(&stdout).expect("stats is JSON");
    assert_eq!(stats["daily_completions"].as_object().unwrap().len(), 7);

    let (_, stderr, code) = run_cli(&["stats", "weekly", "--refresh"]);
    assert_eq!(code, 0, "stats refresh failed: {stderr}");
}

#[test]
fn test_dashboard() {
    login();
    let (stdout, stderr, code) = run_cli(&["dashboard"]);
    assert_eq!(code, 0, "dashboard failed: {stderr}");
    assert!(stdout.contains("Last 7 days"));
}

#[test]
fn test_completions_generate() {
    let (stdout, stderr, code) = run_cli(&["completions", "bash"]);
    assert_eq!(code, 0, "completions failed: {stderr}");
    assert!(stdout.contains("focusnest"));
}
