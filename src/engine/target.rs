// ==========================================
// 销售目标测算 - 目标量计算引擎
// ==========================================
// 职责: target_qty = round(ams * (1 + pct/100))
// 红线: pct 必须为有限非负数，否则整批拒绝
// ==========================================

use crate::domain::sales::{AmsRow, TargetRow};
use crate::engine::ams::round_to_u64;
use crate::engine::error::{EngineError, EngineResult};
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy, Default)]
pub struct TargetCalculator;

impl TargetCalculator {
    pub fn new() -> Self {
        Self
    }

    /// 按统一增幅计算各分段目标量
    #[instrument(skip(self, ams_rows), fields(count = ams_rows.len()))]
    pub fn compute_targets(
        &self,
        ams_rows: &[AmsRow],
        percent_increase: f64,
    ) -> EngineResult<Vec<TargetRow>> {
        validate_percent_increase(percent_increase)?;

        let factor = 1.0 + percent_increase / 100.0;
        let targets: Vec<TargetRow> = ams_rows
            .iter()
            .map(|row| TargetRow {
                segment: row.segment.clone(),
                target_qty: round_to_u64(row.ams as f64 * factor),
                ams: row.ams,
            })
            .collect();

        info!(
            segments = targets.len(),
            total_target = targets.iter().map(|t| t.target_qty).sum::<u64>(),
            "目标量计算完成"
        );
        Ok(targets)
    }
}

pub(crate) fn validate_percent_increase(percent: f64) -> EngineResult<()> {
    if !percent.is_finite() || percent < 0.0 {
        return Err(EngineError::invalid_parameter("percent_increase", percent));
    }
    Ok(())
}
