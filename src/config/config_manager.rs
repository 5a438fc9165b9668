// ==========================================
// 销售目标测算 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: 扁平 key-value（JSON 对象文件），缺省键回退默认值
// ==========================================

use crate::config::planning_params::{
    PlanningParameters, DEFAULT_EXCLUSION_THRESHOLD_PCT, DEFAULT_TARGET_INCREASE_PCT,
    DEFAULT_WINDOW_MONTHS,
};
use crate::config::planning_config_trait::PlanningConfigReader;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, info};

/// 配置键
pub mod config_keys {
    pub const AMS_WINDOW_MONTHS: &str = "ams_window_months";
    pub const AMS_EXCLUSION_THRESHOLD_PCT: &str = "ams_exclusion_threshold_pct";
    pub const TARGET_INCREASE_PCT: &str = "target_increase_pct";
    pub const CSV_DELIMITER: &str = "csv_delimiter";
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    FileRead { path: String, message: String },

    #[error("配置格式错误: {0}")]
    Parse(String),

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    #[error("锁获取失败: {0}")]
    LockPoisoned(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl ConfigManager {
    /// 全部使用默认值
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 JSON 配置文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let manager = Self::from_json_str(&raw)?;
        info!(path = %path.display(), "配置文件加载完成");
        Ok(manager)
    }

    /// 从 JSON 对象字符串加载（值统一转为字符串保存）
    pub fn from_json_str(raw: &str) -> ConfigResult<Self> {
        let parsed: Value =
            serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let object = parsed
            .as_object()
            .ok_or_else(|| ConfigError::Parse("配置根节点必须是 JSON 对象".to_string()))?;

        let values: HashMap<String, String> = object
            .iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), text)
            })
            .collect();

        debug!(keys = values.len(), "配置项已载入");
        Ok(Self {
            values: Arc::new(Mutex::new(values)),
        })
    }

    /// 读取配置值
    pub fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|e| ConfigError::LockPoisoned(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    /// 读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// 覆写配置值（仅内存）
    pub fn update_config(&self, key: &str, value: &str) -> ConfigResult<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| ConfigError::LockPoisoned(e.to_string()))?;
        values.insert(key.to_string(), value.trim().to_string());
        info!(key = %key, value = %value, "配置已更新");
        Ok(())
    }

    /// 所有配置的快照（JSON，按键排序）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let values = self
            .values
            .lock()
            .map_err(|e| ConfigError::LockPoisoned(e.to_string()))?;
        let sorted: std::collections::BTreeMap<&String, &String> = values.iter().collect();
        serde_json::to_string(&json!(sorted)).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn parse_value<T: std::str::FromStr>(&self, key: &str, default: &str) -> ConfigResult<T> {
        let raw = self.get_config_or_default(key, default)?;
        raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.clone(),
            message: "无法解析为数值".to_string(),
        })
    }
}

impl PlanningConfigReader for ConfigManager {
    fn get_window_months(&self) -> ConfigResult<u32> {
        let key = config_keys::AMS_WINDOW_MONTHS;
        let months: u32 = self.parse_value(key, &DEFAULT_WINDOW_MONTHS.to_string())?;
        if months < 1 {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: months.to_string(),
                message: "回看月数必须 >= 1".to_string(),
            });
        }
        Ok(months)
    }

    fn get_exclusion_threshold_pct(&self) -> ConfigResult<f64> {
        let key = config_keys::AMS_EXCLUSION_THRESHOLD_PCT;
        let pct: f64 = self.parse_value(key, &DEFAULT_EXCLUSION_THRESHOLD_PCT.to_string())?;
        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: pct.to_string(),
                message: "剔除阈值必须在 [0, 100]".to_string(),
            });
        }
        Ok(pct)
    }

    fn get_target_increase_pct(&self) -> ConfigResult<f64> {
        let key = config_keys::TARGET_INCREASE_PCT;
        let pct: f64 = self.parse_value(key, &DEFAULT_TARGET_INCREASE_PCT.to_string())?;
        if !pct.is_finite() || pct < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: pct.to_string(),
                message: "目标增幅必须为非负数".to_string(),
            });
        }
        Ok(pct)
    }

    fn get_csv_delimiter(&self) -> ConfigResult<u8> {
        let key = config_keys::CSV_DELIMITER;
        let raw = self.get_config_or_default(key, ",")?;
        match raw.as_bytes() {
            [b] => Ok(*b),
            _ if raw.eq_ignore_ascii_case("tab") || raw == "\\t" => Ok(b'\t'),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.clone(),
                message: "分隔符必须是单个 ASCII 字符".to_string(),
            }),
        }
    }

    fn get_planning_parameters(&self) -> ConfigResult<PlanningParameters> {
        Ok(PlanningParameters {
            window_months: self.get_window_months()?,
            exclusion_threshold_percent: self.get_exclusion_threshold_pct()?,
            percent_increase: self.get_target_increase_pct()?,
        })
    }
}
