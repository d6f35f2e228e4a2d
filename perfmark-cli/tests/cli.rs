//! End-to-end CLI commands against a temporary history document

use clap::Parser;
use perfmark::{HelperConfig, HistoryStore, JsonFileStore, PerformanceHelper};
use perfmark_cli::{Cli, execute};
use std::path::Path;

fn run(args: &[&str], cwd: &Path) -> anyhow::Result<String> {
    let cli = Cli::try_parse_from(std::iter::once("perfmark").chain(args.iter().copied()))?;
    let mut out = Vec::new();
    execute(&cli, cwd, &mut out)?;
    Ok(String::from_utf8(out)?)
}

fn seed(path: &Path) {
    let config = HelperConfig {
        storage_path: path.to_path_buf(),
        print_measurement_log: false,
        ..HelperConfig::default()
    };
    let helper = PerformanceHelper::new(config).unwrap();
    helper
        .measure("AppLaunch", || std::thread::sleep(std::time::Duration::from_millis(1)))
        .unwrap();
    helper.record_untimed_measurement("CacheHitRatio", 0.44).unwrap();
}

#[test]
fn test_list_and_filter() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("history.json");
    seed(&store);
    let store_arg = store.to_str().unwrap();

    let all = run(&["list", "--store", store_arg], dir.path()).unwrap();
    assert!(all.contains("AppLaunch  (timed: 1, untimed: 0)"));
    assert!(all.contains("CacheHitRatio  (timed: 0, untimed: 1)"));
    assert!(all.contains("2 identifiers stored."));

    let filtered = run(&["list", "Cache", "--store", store_arg], dir.path()).unwrap();
    assert!(!filtered.contains("AppLaunch"));
    assert!(filtered.contains("1 identifiers stored."));
}

#[test]
fn test_show_json() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("history.json");
    seed(&store);

    let output = run(
        &["show", "--format", "json", "--store", store.to_str().unwrap()],
        dir.path(),
    )
    .unwrap();
    let report: serde_json::Value = serde_json::from_str(&output).unwrap();
    let ids = report["identifiers"].as_array().unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(ids[1]["identifier"], "CacheHitRatio");
    assert_eq!(ids[1]["newest_untimed"], 0.44);
    assert!(ids[0]["newest_timed_secs"].as_f64().unwrap() >= 0.001);
}

#[test]
fn test_show_uses_configured_storage_path() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("perfmark.toml"),
        "storage_path = \"results/history.json\"\n",
    )
    .unwrap();
    seed(&dir.path().join("results/history.json"));

    let output = run(&["show"], dir.path()).unwrap();
    assert!(output.contains("Perfmark History"));
    assert!(output.contains("CacheHitRatio"));
}

#[test]
fn test_discard() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("history.json");
    seed(&store);
    let store_arg = store.to_str().unwrap();

    let output = run(&["discard", "AppLaunch", "--store", store_arg], dir.path()).unwrap();
    assert_eq!(output, "Discarded AppLaunch\n");
    let output = run(&["discard", "AppLaunch", "--store", store_arg], dir.path()).unwrap();
    assert_eq!(output, "No stored history for AppLaunch\n");

    let remaining = JsonFileStore::new(&store).load_all().unwrap();
    assert_eq!(remaining.keys().collect::<Vec<_>>(), vec!["CacheHitRatio"]);
}

#[test]
fn test_init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    run(&["init"], dir.path()).unwrap();

    let written = HelperConfig::load(dir.path().join("perfmark.toml")).unwrap();
    assert_eq!(written, HelperConfig::default());

    assert!(run(&["init"], dir.path()).is_err());
    run(&["init", "--force"], dir.path()).unwrap();
}

#[test]
fn test_invalid_filter() {
    let dir = tempfile::tempdir().unwrap();
    let err = run(&["list", "(unclosed"], dir.path()).unwrap_err();
    assert!(err.to_string().contains("Invalid filter pattern"));
}
