use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};
use time::OffsetDateTime;

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
        .env("UPKEEP_CONFIG_PATH", temp_path("defaults-config.json"))
        .env("UPKEEP_DISABLE_NOTIFICATIONS", "1")
        .output()
        .expect("failed to run upkeep")
}

/// `(year, month)` readings the binary may have used; the test harness is
/// multi-threaded, so the local offset can be unavailable here.
fn current_year_months() -> Vec<(i32, u8)> {
    let mut readings = vec![OffsetDateTime::now_utc()];
    if let Ok(local) = OffsetDateTime::now_local() {
        readings.push(local);
    }
    readings
        .into_iter()
        .map(|now| (now.year(), u8::from(now.month())))
        .collect()
}

fn stored_progress_keys(store_path: &PathBuf) -> Vec<String> {
    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store_path).unwrap()).unwrap();
    let raw = stored["entries"]["taskProgress"].as_str().expect("entry string");
    let progress: serde_json::Value = serde_json::from_str(raw).unwrap();
    progress
        .as_object()
        .expect("progress map")
        .keys()
        .cloned()
        .collect()
}

#[test]
fn status_without_month_uses_current_month_and_selected_year() {
    let store_path = temp_path("cli-default-month.json");

    let output = run(&["status", "hvac-filter", "complete"], &store_path);
    assert!(output.status.success());
    let keys = stored_progress_keys(&store_path);
    std::fs::remove_file(&store_path).ok();

    let expected: Vec<String> = current_year_months()
        .into_iter()
        .map(|(year, month)| format!("hvac-filter-{year}-{month}"))
        .collect();
    assert_eq!(keys.len(), 1);
    assert!(expected.contains(&keys[0]), "{keys:?} not in {expected:?}");
}

#[test]
fn status_without_year_follows_year_select() {
    let store_path = temp_path("cli-default-year.json");

    assert!(run(&["year-select", "2024"], &store_path).status.success());
    let output = run(&["status", "gutters", "in-progress", "--month", "9"], &store_path);
    assert!(output.status.success());
    let keys = stored_progress_keys(&store_path);
    std::fs::remove_file(&store_path).ok();

    assert_eq!(keys, vec!["gutters-2024-9".to_string()]);
}

#[test]
fn month_summary_defaults_to_current_month() {
    let store_path = temp_path("cli-default-summary.json");

    let output = run(&["month", "--json"], &store_path);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let reading = (
        summary["year"].as_i64().unwrap() as i32,
        summary["month"].as_u64().unwrap() as u8,
    );
    assert!(current_year_months().contains(&reading));
}
