// ==========================================
// 销售目标测算 - 销售分析引擎
// ==========================================
// 职责: 月度汇总、两期对比、按维度汇总、结果汇总、实体对比、产品分析
// 口径: 月均销量 = 月汇总均值（向零截断）
// ==========================================

use crate::domain::sales::{AmsRow, SalesRecord, TargetRow};
use crate::domain::types::{CalendarMonth, Dimension, SegmentKey};
use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;

// ==========================================
// MonthRange - 闭区间月份范围
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRange {
    pub start: CalendarMonth,
    pub end: CalendarMonth,
}

impl MonthRange {
    pub fn new(start: CalendarMonth, end: CalendarMonth) -> EngineResult<Self> {
        if start > end {
            return Err(EngineError::invalid_parameter(
                "month_range",
                format!("{}..{}", start, end),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, month: CalendarMonth) -> bool {
        month >= self.start && month <= self.end
    }

    /// 收窄到数据实际范围
    pub fn clamp_to(&self, min: CalendarMonth, max: CalendarMonth) -> Self {
        Self {
            start: self.start.max(min),
            end: self.end.min(max),
        }
    }
}

/// 单期汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub range: MonthRange,
    pub total: u64,
    pub average_monthly: u64,
    pub month_count: usize,
    pub monthly_totals: Vec<(CalendarMonth, u64)>,
}

/// 两期对比
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub period1: PeriodSummary,
    pub period2: PeriodSummary,
    pub change: i64,
    pub change_pct: f64,
    pub average_change: i64,
}

// ==========================================
// 结果汇总（AMS / 目标量）
// ==========================================

/// 汇总粒度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SummaryLevel {
    Product,
    ProductRegionCustomer,
}

/// 汇总行；rank 从 1 开始，按排序后的位置编号
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub rank: usize,
    pub product: String,
    pub region: Option<String>,
    pub customer_type: Option<String>,
    pub ams: u64,
    pub target_qty: Option<u64>,
}

// ==========================================
// 区域 / 镇区对比
// ==========================================

/// 单个实体在区间内的销量构成
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityBreakdown {
    pub name: String,
    pub total: u64,
    pub by_customer_type: Vec<(String, u64)>,
    pub monthly_totals: Vec<(CalendarMonth, u64)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityComparison {
    pub dimension: Dimension,
    pub range: MonthRange,
    pub first: EntityBreakdown,
    pub second: EntityBreakdown,
}

// ==========================================
// 产品分析
// ==========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAnalysis {
    pub range: MonthRange,
    /// 各产品合计（降序）
    pub product_totals: Vec<(String, u64)>,
    /// (月份, 产品, 销量)，按月份、产品升序
    pub trend: Vec<(CalendarMonth, String, u64)>,
    /// (产品, 客户类型, 销量)，按产品、客户类型升序
    pub by_customer_type: Vec<(String, String, u64)>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SalesAnalysisEngine;

impl SalesAnalysisEngine {
    pub fn new() -> Self {
        Self
    }

    /// 按月汇总（升序）
    pub fn monthly_totals(&self, records: &[SalesRecord]) -> Vec<(CalendarMonth, u64)> {
        let mut totals: BTreeMap<CalendarMonth, u64> = BTreeMap::new();
        for record in records {
            *totals.entry(record.month_key).or_insert(0) += record.sales_qty;
        }
        totals.into_iter().collect()
    }

    /// 两期对比；区间先收窄到数据范围
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub fn compare_periods(
        &self,
        records: &[SalesRecord],
        period1: MonthRange,
        period2: MonthRange,
    ) -> EngineResult<PeriodComparison> {
        let min = records.iter().map(|r| r.month_key).min().ok_or(EngineError::EmptyInput)?;
        let max = records.iter().map(|r| r.month_key).max().ok_or(EngineError::EmptyInput)?;

        let p1 = self.summarize(records, period1.clamp_to(min, max))?;
        let p2 = self.summarize(records, period2.clamp_to(min, max))?;

        let change = p2.total as i64 - p1.total as i64;
        let change_pct = if p1.total > 0 {
            change as f64 / p1.total as f64 * 100.0
        } else {
            0.0
        };
        let average_change = p2.average_monthly as i64 - p1.average_monthly as i64;

        Ok(PeriodComparison {
            period1: p1,
            period2: p2,
            change,
            change_pct,
            average_change,
        })
    }

    fn summarize(&self, records: &[SalesRecord], range: MonthRange) -> EngineResult<PeriodSummary> {
        let in_range: Vec<SalesRecord> = records
            .iter()
            .filter(|r| range.contains(r.month_key))
            .cloned()
            .collect();
        if in_range.is_empty() {
            return Err(EngineError::EmptyInput);
        }

        let monthly_totals = self.monthly_totals(&in_range);
        let total: u64 = monthly_totals.iter().map(|(_, qty)| qty).sum();
        let month_count = monthly_totals.len();

        Ok(PeriodSummary {
            range,
            total,
            average_monthly: total / month_count as u64,
            month_count,
            monthly_totals,
        })
    }

    /// 按维度汇总，按总量降序、取值升序
    pub fn totals_by(&self, records: &[SalesRecord], dimension: Dimension) -> Vec<(String, u64)> {
        let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
        for record in records {
            *totals.entry(record.segment.value_of(dimension)).or_insert(0) += record.sales_qty;
        }

        let mut result: Vec<(String, u64)> = totals
            .into_iter()
            .map(|(value, total)| (value.to_string(), total))
            .collect();
        result.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        result
    }

    // ==========================================
    // 结果汇总
    // ==========================================

    /// AMS 汇总，按 AMS 降序
    pub fn summarize_ams(&self, rows: &[AmsRow], level: SummaryLevel) -> Vec<SummaryRow> {
        let entries = rows.iter().map(|r| (&r.segment, r.ams, None));
        let mut summary = group_summary(entries, level);
        summary.sort_by(|a, b| {
            b.ams
                .cmp(&a.ams)
                .then_with(|| group_key(a).cmp(&group_key(b)))
        });
        with_ranks(summary)
    }

    /// 目标量汇总（同时合计 AMS），按目标量降序
    pub fn summarize_targets(&self, rows: &[TargetRow], level: SummaryLevel) -> Vec<SummaryRow> {
        let entries = rows.iter().map(|r| (&r.segment, r.ams, Some(r.target_qty)));
        let mut summary = group_summary(entries, level);
        summary.sort_by(|a, b| {
            b.target_qty
                .cmp(&a.target_qty)
                .then_with(|| group_key(a).cmp(&group_key(b)))
        });
        with_ranks(summary)
    }

    // ==========================================
    // 实体对比
    // ==========================================

    /// 两个区域（或两个镇区）在同一区间内按客户类型、按月对比
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub fn compare_entities(
        &self,
        records: &[SalesRecord],
        dimension: Dimension,
        first: &str,
        second: &str,
        range: MonthRange,
    ) -> EngineResult<EntityComparison> {
        if !matches!(dimension, Dimension::Region | Dimension::Township) {
            return Err(EngineError::invalid_parameter("dimension", dimension));
        }
        if first == second {
            return Err(EngineError::invalid_parameter("entity", second));
        }

        let in_range = records_in_range(records, range);
        if in_range.is_empty() {
            return Err(EngineError::EmptyInput);
        }

        Ok(EntityComparison {
            dimension,
            range,
            first: self.breakdown(&in_range, dimension, first),
            second: self.breakdown(&in_range, dimension, second),
        })
    }

    fn breakdown(
        &self,
        records: &[SalesRecord],
        dimension: Dimension,
        name: &str,
    ) -> EntityBreakdown {
        let own: Vec<SalesRecord> = records
            .iter()
            .filter(|r| r.segment.value_of(dimension) == name)
            .cloned()
            .collect();

        let mut by_customer_type: BTreeMap<&str, u64> = BTreeMap::new();
        for record in &own {
            *by_customer_type
                .entry(record.segment.customer_type.as_str())
                .or_insert(0) += record.sales_qty;
        }

        EntityBreakdown {
            name: name.to_string(),
            total: own.iter().map(|r| r.sales_qty).sum(),
            by_customer_type: by_customer_type
                .into_iter()
                .map(|(customer_type, qty)| (customer_type.to_string(), qty))
                .collect(),
            monthly_totals: self.monthly_totals(&own),
        }
    }

    // ==========================================
    // 产品分析
    // ==========================================

    /// 区间内产品合计、月度趋势与客户类型构成
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub fn analyze_products(
        &self,
        records: &[SalesRecord],
        range: MonthRange,
    ) -> EngineResult<ProductAnalysis> {
        let in_range = records_in_range(records, range);
        if in_range.is_empty() {
            return Err(EngineError::EmptyInput);
        }

        let mut trend: BTreeMap<(CalendarMonth, &str), u64> = BTreeMap::new();
        let mut by_customer_type: BTreeMap<(&str, &str), u64> = BTreeMap::new();
        for record in &in_range {
            let product = record.segment.product.as_str();
            *trend.entry((record.month_key, product)).or_insert(0) += record.sales_qty;
            *by_customer_type
                .entry((product, record.segment.customer_type.as_str()))
                .or_insert(0) += record.sales_qty;
        }

        Ok(ProductAnalysis {
            range,
            product_totals: self.totals_by(&in_range, Dimension::Product),
            trend: trend
                .into_iter()
                .map(|((month, product), qty)| (month, product.to_string(), qty))
                .collect(),
            by_customer_type: by_customer_type
                .into_iter()
                .map(|((product, customer_type), qty)| {
                    (product.to_string(), customer_type.to_string(), qty)
                })
                .collect(),
        })
    }
}

fn records_in_range(records: &[SalesRecord], range: MonthRange) -> Vec<SalesRecord> {
    records
        .iter()
        .filter(|r| range.contains(r.month_key))
        .cloned()
        .collect()
}

fn group_summary<'a>(
    entries: impl Iterator<Item = (&'a SegmentKey, u64, Option<u64>)>,
    level: SummaryLevel,
) -> Vec<SummaryRow> {
    type GroupKey<'k> = (&'k str, Option<&'k str>, Option<&'k str>);

    let mut groups: BTreeMap<GroupKey<'a>, (u64, Option<u64>)> = BTreeMap::new();
    for (segment, ams, target) in entries {
        let key = match level {
            SummaryLevel::Product => (segment.product.as_str(), None, None),
            SummaryLevel::ProductRegionCustomer => (
                segment.product.as_str(),
                Some(segment.region.as_str()),
                Some(segment.customer_type.as_str()),
            ),
        };
        let slot = groups.entry(key).or_insert((0, None));
        slot.0 += ams;
        if let Some(target) = target {
            slot.1 = Some(slot.1.unwrap_or(0) + target);
        }
    }

    groups
        .into_iter()
        .map(|((product, region, customer_type), (ams, target_qty))| SummaryRow {
            rank: 0,
            product: product.to_string(),
            region: region.map(str::to_string),
            customer_type: customer_type.map(str::to_string),
            ams,
            target_qty,
        })
        .collect()
}

fn group_key(row: &SummaryRow) -> (&str, Option<&str>, Option<&str>) {
    (
        row.product.as_str(),
        row.region.as_deref(),
        row.customer_type.as_deref(),
    )
}

fn with_ranks(mut rows: Vec<SummaryRow>) -> Vec<SummaryRow> {
    for (idx, row) in rows.iter_mut().enumerate() {
        row.rank = idx + 1;
    }
    rows
}
