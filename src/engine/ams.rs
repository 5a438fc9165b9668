// ==========================================
// 销售目标测算 - 月均销量 (AMS) 引擎
// ==========================================
// 职责: 按分段、按窗口计算剔除低销量月份后的月均销量
// 输入: 已规范化的 SalesRecord 列表
// 输出: AmsRow 列表（按分段键字典序）
// ==========================================
// 算法:
// 1) max_month = 全部记录的最大月份
// 2) floor = max_month - window_months；保留 [floor, max_month]（两端包含）
// 3) 按分段键分组，按月汇总销量
// 4) initial_ams = 月汇总均值
// 5) threshold = pct/100 * initial_ams；保留 >= threshold 的月份
//    - 有保留月份 → 取保留月份均值
//    - 全部低于阈值 → 回退为 initial_ams，不剔除
//    - initial_ams == 0 → AMS = 0，计数均为 0
// 6) 四舍五入（远离零）取整
// ==========================================

use crate::domain::sales::{AmsBasis, AmsRow, SalesRecord};
use crate::domain::types::{CalendarMonth, SegmentKey};
use crate::engine::error::{EngineError, EngineResult};
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// 单个分段的月汇总序列
pub type MonthlyTotals = BTreeMap<CalendarMonth, u64>;

// ==========================================
// AmsEngine - 月均销量引擎
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct AmsEngine;

impl AmsEngine {
    pub fn new() -> Self {
        Self
    }

    /// 批量计算 AMS
    ///
    /// # 参数
    /// - records: 已规范化的销售记录
    /// - window_months: 回看月数（>= 1）
    /// - exclusion_threshold_percent: 剔除阈值百分比（0..=100）
    ///
    /// # 返回
    /// - Ok(Vec<AmsRow>): 每个分段一行，按分段键字典序
    /// - Err(InvalidParameter): 参数越界，不做任何计算
    /// - Err(EmptyInput): 输入为空
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub fn compute_ams(
        &self,
        records: &[SalesRecord],
        window_months: u32,
        exclusion_threshold_percent: f64,
    ) -> EngineResult<Vec<AmsRow>> {
        validate_window_months(window_months)?;
        validate_threshold_percent(exclusion_threshold_percent)?;

        let max_month = records
            .iter()
            .map(|r| r.month_key)
            .max()
            .ok_or(EngineError::EmptyInput)?;
        let floor = max_month.minus_months(window_months);
        debug!(max_month = %max_month, floor = %floor, "AMS 窗口");

        let segments = group_by_segment(records, floor, max_month);

        // 分段之间互不依赖，并行计算后按分段键重新排序
        let mut rows: Vec<AmsRow> = segments
            .into_iter()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|(segment, totals)| {
                self.evaluate_segment(segment, &totals, exclusion_threshold_percent)
            })
            .collect();
        rows.sort_by(|a, b| a.segment.cmp(&b.segment));

        info!(
            segments = rows.len(),
            months_excluded = rows.iter().map(|r| r.months_excluded).sum::<usize>(),
            fallback = rows.iter().filter(|r| r.basis == AmsBasis::AllExcluded).count(),
            "AMS 计算完成"
        );

        Ok(rows)
    }

    /// 单个分段计算（月汇总 → AmsRow）
    pub fn evaluate_segment(
        &self,
        segment: SegmentKey,
        totals: &MonthlyTotals,
        exclusion_threshold_percent: f64,
    ) -> AmsRow {
        let total_months = totals.len();
        let initial_ams = mean(totals.values().copied());

        let (ams, months_counted, months_excluded, basis) = if initial_ams > 0.0 {
            let threshold = exclusion_threshold_percent / 100.0 * initial_ams;
            let survivors: Vec<u64> = totals
                .values()
                .copied()
                .filter(|&total| total as f64 >= threshold)
                .collect();

            if survivors.is_empty() {
                (initial_ams, total_months, 0, AmsBasis::AllExcluded)
            } else {
                let counted = survivors.len();
                (
                    mean(survivors.into_iter()),
                    counted,
                    total_months - counted,
                    AmsBasis::Filtered,
                )
            }
        } else {
            (0.0, 0, 0, AmsBasis::NoSales)
        };

        AmsRow {
            segment,
            ams: round_to_u64(ams),
            months_counted,
            months_excluded,
            total_months,
            initial_ams,
            basis,
        }
    }
}

/// 窗口内记录按分段键分组并按月汇总
fn group_by_segment(
    records: &[SalesRecord],
    floor: CalendarMonth,
    max_month: CalendarMonth,
) -> BTreeMap<SegmentKey, MonthlyTotals> {
    let mut segments: BTreeMap<SegmentKey, MonthlyTotals> = BTreeMap::new();
    for record in records
        .iter()
        .filter(|r| r.month_key >= floor && r.month_key <= max_month)
    {
        *segments
            .entry(record.segment.clone())
            .or_default()
            .entry(record.month_key)
            .or_insert(0) += record.sales_qty;
    }
    segments
}

fn mean(values: impl Iterator<Item = u64>) -> f64 {
    let (sum, count) = values.fold((0u128, 0usize), |(sum, count), v| (sum + v as u128, count + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

/// 四舍五入取整（.5 远离零）
pub(crate) fn round_to_u64(value: f64) -> u64 {
    value.round().max(0.0) as u64
}

pub(crate) fn validate_window_months(window_months: u32) -> EngineResult<()> {
    if window_months < 1 {
        return Err(EngineError::invalid_parameter("window_months", window_months));
    }
    Ok(())
}

pub(crate) fn validate_threshold_percent(percent: f64) -> EngineResult<()> {
    if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
        return Err(EngineError::invalid_parameter(
            "exclusion_threshold_percent",
            percent,
        ));
    }
    Ok(())
}
