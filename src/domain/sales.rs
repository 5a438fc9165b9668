// ==========================================
// 销售目标测算 - 销售领域模型
// ==========================================
// 职责: 销售记录、AMS 结果行、目标结果行、导入结果
// 红线: 各阶段返回新集合，不回写输入
// ==========================================

use crate::domain::types::{CalendarMonth, SegmentKey};
use serde::{Deserialize, Serialize};

// ==========================================
// SalesRecord - 销售记录（已规范化）
// ==========================================
// 用途: 导入层产出，引擎层只读
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub month_key: CalendarMonth, // 自然月（规范化后）
    #[serde(flatten)]
    pub segment: SegmentKey,      // 产品/客户类型/镇区/区域
    pub sales_qty: u64,           // 销量（非负整数）
}

impl SalesRecord {
    pub fn new(month_key: CalendarMonth, segment: SegmentKey, sales_qty: u64) -> Self {
        Self {
            month_key,
            segment,
            sales_qty,
        }
    }
}

// ==========================================
// RawSalesRecord - 导入中间结构体
// ==========================================
// 用途: 字段映射产物，month_raw 尚未规范化
// 生命周期: 仅在导入流程内
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSalesRecord {
    pub month_raw: Option<String>,
    pub product: String,
    pub customer_type: String,
    pub township: String,
    pub region: String,
    pub sales_qty: u64,

    // 元信息
    pub row_number: usize, // 电子表格行号（表头为第 1 行）
}

impl RawSalesRecord {
    pub fn segment(&self) -> SegmentKey {
        SegmentKey::new(
            self.product.clone(),
            self.customer_type.clone(),
            self.township.clone(),
            self.region.clone(),
        )
    }
}

// ==========================================
// AmsBasis - AMS 取值依据
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AmsBasis {
    Filtered,     // 剔除低于阈值的月份后取均值
    AllExcluded,  // 所有月份均低于阈值，回退为全部月份均值
    NoSales,      // 窗口内无销量
}

// ==========================================
// AmsRow - 分段月均销量
// ==========================================
// 不变量: months_counted + months_excluded == total_months（NoSales 除外，二者均为 0）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmsRow {
    #[serde(flatten)]
    pub segment: SegmentKey,
    pub ams: u64,
    pub months_counted: usize,
    pub months_excluded: usize,
    pub total_months: usize,
    pub initial_ams: f64, // 未剔除前的均值（未取整）
    pub basis: AmsBasis,
}

// ==========================================
// TargetRow - 分段目标量
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRow {
    #[serde(flatten)]
    pub segment: SegmentKey,
    pub target_qty: u64,
    pub ams: u64,
}

// ==========================================
// RowError - 行级错误（非致命）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub row_number: usize,
    pub field: String,
    pub value: String,
    pub message: String,
}

// ==========================================
// ImportSummary - 导入汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total_rows: usize,
    pub success: usize,
    pub date_errors: usize,
    pub row_errors: usize,
    pub missing_month: usize,
}

// ==========================================
// SalesDataset - 导入结果
// ==========================================
// 用途: 导入层输出；date_errors/row_errors 供调用方逐行展示
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesDataset {
    pub batch_id: String,
    pub source: String,
    pub records: Vec<SalesRecord>,
    pub date_errors: Vec<RowError>,
    pub row_errors: Vec<RowError>,
    pub summary: ImportSummary,
}

impl SalesDataset {
    /// 是否存在行级错误
    pub fn has_errors(&self) -> bool {
        !self.date_errors.is_empty() || !self.row_errors.is_empty()
    }

    /// 数据中的月份范围 (min, max)
    pub fn month_bounds(&self) -> Option<(CalendarMonth, CalendarMonth)> {
        let min = self.records.iter().map(|r| r.month_key).min()?;
        let max = self.records.iter().map(|r| r.month_key).max()?;
        Some((min, max))
    }
}
