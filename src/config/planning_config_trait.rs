// ==========================================
// 销售目标测算 - 测算配置读取 Trait
// ==========================================
// 职责: 定义 AMS/目标测算所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::config_manager::ConfigResult;
use crate::config::planning_params::PlanningParameters;

// ==========================================
// PlanningConfigReader Trait
// ==========================================
// 实现者: ConfigManager
pub trait PlanningConfigReader: Send + Sync {
    /// 获取 AMS 回看月数
    ///
    /// # 默认值
    /// - 6
    fn get_window_months(&self) -> ConfigResult<u32>;

    /// 获取低销量月份剔除阈值（%）
    ///
    /// # 默认值
    /// - 20
    fn get_exclusion_threshold_pct(&self) -> ConfigResult<f64>;

    /// 获取目标增幅（%）
    ///
    /// # 默认值
    /// - 10
    fn get_target_increase_pct(&self) -> ConfigResult<f64>;

    /// 获取 CSV 分隔符
    ///
    /// # 默认值
    /// - ','
    fn get_csv_delimiter(&self) -> ConfigResult<u8>;

    /// 一次性读取全部测算参数
    fn get_planning_parameters(&self) -> ConfigResult<PlanningParameters>;
}
