use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("upkeep-{nanos}-{file_name}"))
}

fn run(args: &[&str], store_path: &PathBuf) -> Output {
    Command::new(env!("CARGO_BIN_EXE_upkeep"))
        .args(args)
        .env("UPKEEP_STORE_PATH", store_path)
        .env("UPKEEP_CONFIG_PATH", temp_path("smoke-config.json"))
        .env("UPKEEP_REMINDERS_PATH", temp_path("smoke-reminders.json"))
        .env("UPKEEP_DISABLE_NOTIFICATIONS", "1")
        .output()
        .expect("failed to run upkeep")
}

#[test]
fn help_prints_usage() {
    let store_path = temp_path("cli-help.json");
    let output = run(&["--help"], &store_path);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
    assert!(stdout.contains("add-custom"));
    assert!(stdout.contains("year-select"));
}

#[test]
fn unknown_command_fails_with_error_prefix() {
    let store_path = temp_path("cli-unknown.json");
    let output = run(&["frobnicate"], &store_path);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("ERROR: invalid_input"));
}

#[test]
fn tasks_for_quarter_start_include_monthly_and_quarterly() {
    let store_path = temp_path("cli-tasks.json");
    let output = run(&["tasks", "--month", "4", "--json"], &store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let tasks: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = tasks
        .as_array()
        .expect("task array")
        .iter()
        .map(|task| task["id"].as_str().unwrap())
        .collect();

    assert!(ids.contains(&"hvac-filter"));
    assert!(ids.contains(&"water-softener"));
    assert!(!ids.contains(&"gutters"));
}

#[test]
fn tasks_rejects_month_out_of_range() {
    let store_path = temp_path("cli-bad-month.json");
    let output = run(&["tasks", "--month", "13"], &store_path);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid_input"));
}

#[test]
fn catalog_lists_every_cadence_in_order() {
    let store_path = temp_path("cli-catalog.json");
    let output = run(&["catalog", "--json"], &store_path);

    assert!(output.status.success());
    let groups: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let cadences: Vec<&str> = groups
        .as_array()
        .expect("group array")
        .iter()
        .map(|group| group["cadence"].as_str().unwrap())
        .collect();

    assert_eq!(cadences.first(), Some(&"Monthly"));
    assert_eq!(cadences.last(), Some(&"Winter"));
    assert_eq!(groups[0]["tasks"][0]["id"], "hvac-filter");
}

#[test]
fn corrupt_store_still_runs_with_defaults() {
    let store_path = temp_path("cli-corrupt.json");
    std::fs::write(&store_path, "{ not json").unwrap();

    let output = run(&["month", "--month", "3", "--year", "2024", "--json"], &store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["completed_tasks"], 0);
}
