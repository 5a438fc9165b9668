// ==========================================
// 销售目标测算 - 领域模型层
// ==========================================
// 职责: 定义领域实体与值类型
// 红线: 不含文件读取逻辑,不含引擎逻辑
// ==========================================

pub mod sales;
pub mod types;

// 重导出核心类型
pub use sales::{
    AmsBasis, AmsRow, ImportSummary, RawSalesRecord, RowError, SalesDataset, SalesRecord,
    TargetRow,
};
pub use types::{CalendarMonth, Dimension, SegmentKey, MONTH_ABBRS, MONTH_NAMES};
