// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 配置文件加载、默认值、内存覆写、快照
// ==========================================

use sales_target_ams::config::{config_keys, ConfigError, ConfigManager, PlanningConfigReader};
use std::io::Write;

#[test]
fn test_load_from_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{
            "ams_window_months": 3,
            "ams_exclusion_threshold_pct": 25.5,
            "target_increase_pct": 0,
            "csv_delimiter": "tab"
        }}"#
    )
    .unwrap();

    let config = ConfigManager::from_file(file.path()).unwrap();
    let params = config.get_planning_parameters().unwrap();

    assert_eq!(params.window_months, 3);
    assert_eq!(params.exclusion_threshold_percent, 25.5);
    assert_eq!(params.percent_increase, 0.0);
    assert_eq!(config.get_csv_delimiter().unwrap(), b'\t');
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        ConfigManager::from_file("tests/fixtures/no_such_config.json"),
        Err(ConfigError::FileRead { .. })
    ));
}

#[test]
fn test_malformed_json() {
    assert!(matches!(
        ConfigManager::from_json_str("{ not json"),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_update_and_snapshot() {
    let config = ConfigManager::new();
    config
        .update_config(config_keys::TARGET_INCREASE_PCT, "12.5")
        .unwrap();
    config
        .update_config(config_keys::AMS_WINDOW_MONTHS, "9")
        .unwrap();

    assert_eq!(config.get_target_increase_pct().unwrap(), 12.5);
    assert_eq!(config.get_window_months().unwrap(), 9);

    let snapshot: serde_json::Value =
        serde_json::from_str(&config.get_config_snapshot().unwrap()).unwrap();
    assert_eq!(snapshot["target_increase_pct"], "12.5");
    assert_eq!(snapshot["ams_window_months"], "9");

    // 克隆共享同一份配置
    let shared = config.clone();
    config
        .update_config(config_keys::TARGET_INCREASE_PCT, "-1")
        .unwrap();
    assert!(matches!(
        shared.get_target_increase_pct(),
        Err(ConfigError::InvalidValue { .. })
    ));
}

#[test]
fn test_invalid_delimiter() {
    let config = ConfigManager::from_json_str(r#"{"csv_delimiter": ";;"}"#).unwrap();
    assert!(config.get_csv_delimiter().is_err());
}
