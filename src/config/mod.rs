// ==========================================
// 销售目标测算 - 配置层
// ==========================================
// 职责: 测算参数加载与校验，支持内存覆写
// 存储: JSON 配置文件（扁平 key-value）
// ==========================================

pub mod config_manager;
pub mod planning_config_trait;
pub mod planning_params;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigError, ConfigManager, ConfigResult};
pub use planning_config_trait::PlanningConfigReader;
pub use planning_params::PlanningParameters;
