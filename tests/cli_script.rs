use std::path::Path;

use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn pacing(dir: &Path, now: &str) -> Command {
    let mut cmd = Command::cargo_bin("pacing_cli").unwrap();
    cmd.env("PACING_STATE", dir.join("state.json"))
        .env("PACING_CONFIG", dir.join("config.json"))
        .env("PACING_NOW", now)
        .env_remove("RUST_LOG");
    cmd
}

fn json(dir: &Path, now: &str, args: &[&str]) -> Value {
    let output = pacing(dir, now).args(args).assert().success().get_output().clone();
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn script_runs_budget_flow_across_invocations() {
    let dir = TempDir::new().unwrap();
    let morning = "2024-03-12T10:00:00Z";

    pacing(dir.path(), morning)
        .arg("init")
        .assert()
        .success()
        .stdout(contains("Initialized state"));

    let brand = json(dir.path(), morning, &["brand", "Acme", "100", "1000"]);
    let brand_id = brand["id"].as_str().unwrap().to_string();
    let campaign = json(dir.path(), morning, &["campaign", &brand_id, "Spring Sale"]);
    let campaign_id = campaign["id"].as_str().unwrap().to_string();

    json(dir.path(), morning, &["spend", &campaign_id, "60"]);
    json(dir.path(), morning, &["spend", &campaign_id, "50", "search", "ads"]);

    let paused = json(dir.path(), morning, &["enforce-budgets"]);
    assert_eq!(paused["deactivated"].as_array().unwrap().len(), 1);

    let status = json(dir.path(), morning, &["status", &campaign_id]);
    assert_eq!(status["is_active"], Value::Bool(false));
    assert_eq!(status["spend_today"], Value::String("110".into()));

    let reset = json(dir.path(), "2024-03-13T00:05:00Z", &["reset"]);
    assert_eq!(reset["reactivated"].as_array().unwrap().len(), 1);

    let summary = json(dir.path(), "2024-03-13T00:05:00Z", &["summary", &brand_id]);
    assert_eq!(summary["current_daily_spend"], Value::String("0".into()));
    assert_eq!(summary["current_monthly_spend"], Value::String("110".into()));
}

#[test]
fn dayparting_window_is_applied_by_check() {
    let dir = TempDir::new().unwrap();
    let noon = "2024-03-12T12:00:00Z";

    let brand = json(dir.path(), noon, &["brand", "Nocturne", "500", "5000"]);
    let brand_id = brand["id"].as_str().unwrap().to_string();
    let campaign = json(dir.path(), noon, &["campaign", &brand_id, "Late Show"]);
    let campaign_id = campaign["id"].as_str().unwrap().to_string();
    json(dir.path(), noon, &["daypart", &campaign_id, "22:00", "06:00"]);

    let check = json(dir.path(), noon, &["check"]);
    assert_eq!(check["dayparting"]["deactivated"].as_array().unwrap().len(), 1);

    let late = json(dir.path(), "2024-03-12T23:00:00Z", &["reconcile", &campaign_id]);
    assert_eq!(late["activated"].as_array().unwrap().len(), 1);
}

#[test]
fn invalid_input_fails_with_message() {
    let dir = TempDir::new().unwrap();
    pacing(dir.path(), "2024-03-12T12:00:00Z")
        .args(["brand", "Acme", "lots", "1000"])
        .assert()
        .failure()
        .stderr(contains("Invalid input"));

    pacing(dir.path(), "2024-03-12T12:00:00Z")
        .arg("launch")
        .assert()
        .failure()
        .stderr(contains("unknown command"));
}
