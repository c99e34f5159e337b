use std::fs;

use flowplan_config::{Config, ConfigError, ConfigManager};
use tempfile::tempdir;

#[test]
fn default_config_matches_planner_defaults() {
    let cfg = Config::default();

    assert_eq!(cfg.default_horizon_months, 12);
    assert_eq!(cfg.history_capacity, 15);
    assert_eq!(cfg.default_starting_balance, 0.0);
    assert_eq!(cfg.log_filter, "flowplan=info");
    assert!(cfg.data_root.is_none());
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));

    assert_eq!(manager.load().expect("load config"), Config::default());
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let mut cfg = Config::default();
    cfg.default_horizon_months = 24;
    cfg.default_starting_balance = 1500.5;
    cfg.data_root = Some(dir.path().join("data"));

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert!(manager.config_path().ends_with("config/config.json"));
    assert!(!manager.config_path().with_extension("json.tmp").exists());
}

#[test]
fn partial_file_fills_in_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "default_horizon_months": 18 }"#).expect("write config");

    let loaded = ConfigManager::new(path).load().expect("load config");

    assert_eq!(loaded.default_horizon_months, 18);
    assert_eq!(loaded.history_capacity, 15);
    assert_eq!(loaded.log_filter, "flowplan=info");
}

#[test]
fn zero_history_capacity_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));
    let cfg = Config {
        history_capacity: 0,
        ..Config::default()
    };

    assert!(matches!(manager.save(&cfg), Err(ConfigError::Invalid(_))));
}

#[test]
fn malformed_file_reports_serde_error() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, "not json").expect("write config");

    assert!(matches!(
        ConfigManager::new(path).load(),
        Err(ConfigError::Serde(_))
    ));
}

#[test]
fn explicit_data_root_wins() {
    let cfg = Config {
        data_root: Some("/srv/flowplan".into()),
        ..Config::default()
    };
    assert_eq!(cfg.resolve_data_root(), std::path::PathBuf::from("/srv/flowplan"));
    assert!(Config::default().resolve_data_root().ends_with(".flowplan"));
}
