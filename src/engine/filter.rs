// ==========================================
// 销售目标测算 - 分段筛选
// ==========================================
// 职责: 按产品/客户类型/镇区/区域筛选记录（AMS 计算前）
// 规则: 选择了区域但未选择镇区 → 自动包含所选区域下的全部镇区
// ==========================================

use crate::domain::sales::SalesRecord;
use crate::domain::types::Dimension;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// 分段筛选条件（None 表示该维度不限）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentFilter {
    #[serde(default)]
    pub products: Option<BTreeSet<String>>,
    #[serde(default)]
    pub customer_types: Option<BTreeSet<String>>,
    #[serde(default)]
    pub townships: Option<BTreeSet<String>>,
    #[serde(default)]
    pub regions: Option<BTreeSet<String>>,
}

impl SegmentFilter {
    /// 不限任何维度
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with(mut self, dimension: Dimension, values: &[&str]) -> Self {
        let set: BTreeSet<String> = values.iter().map(|v| v.to_string()).collect();
        match dimension {
            Dimension::Product => self.products = Some(set),
            Dimension::CustomerType => self.customer_types = Some(set),
            Dimension::Township => self.townships = Some(set),
            Dimension::Region => self.regions = Some(set),
        }
        self
    }

    fn selection(&self, dimension: Dimension) -> Option<&BTreeSet<String>> {
        match dimension {
            Dimension::Product => self.products.as_ref(),
            Dimension::CustomerType => self.customer_types.as_ref(),
            Dimension::Township => self.townships.as_ref(),
            Dimension::Region => self.regions.as_ref(),
        }
    }

    /// 解析镇区选择：区域已选且镇区为空集时，展开为所选区域下的全部镇区
    pub fn resolve_townships(&self, records: &[SalesRecord]) -> Option<BTreeSet<String>> {
        match (&self.regions, &self.townships) {
            (Some(regions), Some(townships)) if !regions.is_empty() && townships.is_empty() => {
                Some(available_townships(records, regions).into_iter().collect())
            }
            (_, townships) => townships.clone(),
        }
    }

    /// 应用筛选，返回新的记录集合
    pub fn apply(&self, records: &[SalesRecord]) -> Vec<SalesRecord> {
        let townships = self.resolve_townships(records);
        let allowed = |dimension: Dimension, record: &SalesRecord| -> bool {
            let selection = match dimension {
                Dimension::Township => townships.as_ref(),
                other => self.selection(other),
            };
            selection.map_or(true, |set| set.contains(record.segment.value_of(dimension)))
        };

        let filtered: Vec<SalesRecord> = records
            .iter()
            .filter(|&r| {
                allowed(Dimension::Product, r)
                    && allowed(Dimension::CustomerType, r)
                    && allowed(Dimension::Township, r)
                    && allowed(Dimension::Region, r)
            })
            .cloned()
            .collect();

        debug!(before = records.len(), after = filtered.len(), "分段筛选完成");
        filtered
    }
}

/// 某一维度的全部取值（去重、排序）
pub fn distinct_values(records: &[SalesRecord], dimension: Dimension) -> Vec<String> {
    records
        .iter()
        .map(|r| r.segment.value_of(dimension).to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// 所选区域下的全部镇区（去重、排序）
pub fn available_townships(records: &[SalesRecord], regions: &BTreeSet<String>) -> Vec<String> {
    records
        .iter()
        .filter(|r| regions.contains(&r.segment.region))
        .map(|r| r.segment.township.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
