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
        .env("UPKEEP_CONFIG_PATH", temp_path("custom-config.json"))
        .env("UPKEEP_DISABLE_NOTIFICATIONS", "1")
        .output()
        .expect("failed to run upkeep")
}

#[test]
fn custom_task_joins_its_month() {
    let store_path = temp_path("cli-custom.json");

    let added = run(
        &["add-custom", "5", "Reseal deck", "--detail", "Two coats", "--json"],
        &store_path,
    );
    assert!(added.status.success());
    let task: serde_json::Value = serde_json::from_slice(&added.stdout).unwrap();
    let id = task["id"].as_str().expect("generated id").to_string();

    let may = run(&["tasks", "--month", "5", "--json"], &store_path);
    let june = run(&["tasks", "--month", "6", "--json"], &store_path);
    let completed = run(
        &["status", &id, "complete", "--month", "5", "--year", "2024"],
        &store_path,
    );
    std::fs::remove_file(&store_path).ok();

    assert_eq!(task["title"], "Reseal deck");
    assert_eq!(task["detail"], "Two coats");
    assert_eq!(task["schedule"], "Custom");

    let may: serde_json::Value = serde_json::from_slice(&may.stdout).unwrap();
    let last = may.as_array().unwrap().last().unwrap();
    assert_eq!(last["id"], id.as_str());

    let june: serde_json::Value = serde_json::from_slice(&june.stdout).unwrap();
    assert!(june.as_array().unwrap().iter().all(|task| task["id"] != id.as_str()));

    assert!(completed.status.success());
}

#[test]
fn custom_task_requires_title() {
    let store_path = temp_path("cli-custom-empty.json");

    let output = run(&["add-custom", "5", "   "], &store_path);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("title is required"));
}

#[test]
fn custom_tasks_are_persisted_with_month_number() {
    let store_path = temp_path("cli-custom-blob.json");

    run(&["add-custom", "11", "Drain hoses"], &store_path);

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    std::fs::remove_file(&store_path).ok();
    let custom: serde_json::Value =
        serde_json::from_str(stored["entries"]["customTasks"].as_str().unwrap()).unwrap();

    assert_eq!(custom[0]["month"], 11);
    assert_eq!(custom[0]["task"]["title"], "Drain hoses");
}

#[test]
fn year_select_changes_default_year() {
    let store_path = temp_path("cli-year-select.json");

    let selected = run(&["year-select", "2025"], &store_path);
    assert!(selected.status.success());
    let year = run(&["year", "--json"], &store_path);
    let listing = run(&["year-select", "--json"], &store_path);
    std::fs::remove_file(&store_path).ok();

    let year: serde_json::Value = serde_json::from_slice(&year.stdout).unwrap();
    assert_eq!(year["year"], 2025);

    let listing: serde_json::Value = serde_json::from_slice(&listing.stdout).unwrap();
    assert_eq!(listing["selected_year"], 2025);
    assert_eq!(listing["available_years"][0], 2024);
}

#[test]
fn year_select_rejects_out_of_range_year() {
    let store_path = temp_path("cli-year-range.json");

    let output = run(&["year-select", "1969"], &store_path);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid_input"));
    assert!(!store_path.exists());
}
