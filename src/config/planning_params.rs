// ==========================================
// 销售目标测算 - 测算参数
// ==========================================
// 职责: 回看月数、剔除阈值、目标增幅及默认值
// 红线: 校验规则复用引擎层，不另行定义
// ==========================================

use crate::engine::ams::{validate_threshold_percent, validate_window_months};
use crate::engine::error::EngineResult;
use crate::engine::target::validate_percent_increase;
use serde::{Deserialize, Serialize};

/// 默认回看月数
pub const DEFAULT_WINDOW_MONTHS: u32 = 6;
/// 默认剔除阈值（%）
pub const DEFAULT_EXCLUSION_THRESHOLD_PCT: f64 = 20.0;
/// 默认目标增幅（%）
pub const DEFAULT_TARGET_INCREASE_PCT: f64 = 10.0;

/// 一次测算所需的全部参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanningParameters {
    /// 回看月数（>= 1）
    #[serde(default = "default_window_months")]
    pub window_months: u32,

    /// 低于 initial_ams 该百分比的月份被剔除（0..=100）
    #[serde(default = "default_exclusion_threshold_pct")]
    pub exclusion_threshold_percent: f64,

    /// 目标增幅（%，>= 0）
    #[serde(default = "default_target_increase_pct")]
    pub percent_increase: f64,
}

impl PlanningParameters {
    /// 前置条件校验（任一不满足即整体拒绝）
    pub fn validate(&self) -> EngineResult<()> {
        validate_window_months(self.window_months)?;
        validate_threshold_percent(self.exclusion_threshold_percent)?;
        validate_percent_increase(self.percent_increase)
    }
}

impl Default for PlanningParameters {
    fn default() -> Self {
        Self {
            window_months: DEFAULT_WINDOW_MONTHS,
            exclusion_threshold_percent: DEFAULT_EXCLUSION_THRESHOLD_PCT,
            percent_increase: DEFAULT_TARGET_INCREASE_PCT,
        }
    }
}

fn default_window_months() -> u32 {
    DEFAULT_WINDOW_MONTHS
}

fn default_exclusion_threshold_pct() -> f64 {
    DEFAULT_EXCLUSION_THRESHOLD_PCT
}

fn default_target_increase_pct() -> f64 {
    DEFAULT_TARGET_INCREASE_PCT
}
