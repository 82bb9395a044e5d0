/// Integration tests for persisted benchmark settings
/// Exercises JsonFileStore on disk together with BenchSettings validation
use std::fs;
use tempfile::TempDir;
use xops_stress::{BenchSettings, JsonFileStore, SessionConfig, ThreadOptionSet};

#[test]
fn test_settings_survive_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("xops").join("settings.json");

    {
        let store = JsonFileStore::open(&path);
        let mut settings = BenchSettings::load(&store, ThreadOptionSet::new(8));
        settings.cycle_float_threads();
        settings.toggle_int_precision();
        settings.save(&store).expect("save should succeed");
    }

    let store = JsonFileStore::open(&path);
    let settings = BenchSettings::load(&store, ThreadOptionSet::new(8));
    assert_eq!(settings.float_threads, 32);
    assert_eq!(settings.int_threads, 16);
    assert!(settings.int_64bit);
    assert!(!settings.float_64bit);
}

#[test]
fn test_settings_from_larger_machine_are_repaired() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");

    // Saved on a 20-processor machine where 40 threads was selectable
    {
        let store = JsonFileStore::open(&path);
        let mut settings = BenchSettings::defaults(ThreadOptionSet::new(20));
        settings.set_float_threads(40);
        settings.save(&store).unwrap();
    }

    let store = JsonFileStore::open(&path);
    let settings = BenchSettings::load(&store, ThreadOptionSet::new(8));
    assert_eq!(settings.float_threads, 16);
}

#[test]
fn test_corrupt_settings_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "[1, 2,").unwrap();

    let store = JsonFileStore::open(&path);
    let options = ThreadOptionSet::new(4);
    assert_eq!(BenchSettings::load(&store, options.clone()), BenchSettings::defaults(options));
}

#[test]
fn test_saved_file_is_plain_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.json");

    let store = JsonFileStore::open(&path);
    BenchSettings::defaults(ThreadOptionSet::new(8)).save(&store).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value["FloatThreads"], 16);
    assert_eq!(value["Int64Bit"], false);
}

#[test]
fn test_settings_drive_session_config() {
    let mut settings = BenchSettings::defaults(ThreadOptionSet::new(8));
    settings.set_int_threads(64);
    let config = SessionConfig {
        workload: settings.to_request(),
        ..SessionConfig::default()
    };
    assert_eq!(config.workload.int_threads, 64);
    assert_eq!(config.warm_up_samples, 7);
}
