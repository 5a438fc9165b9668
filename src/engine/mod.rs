// ==========================================
// 销售目标测算 - 引擎层
// ==========================================
// 职责: 月份规范化、AMS、目标量、筛选与分析
// 红线: 引擎均为纯函数，不持有跨调用状态，不读写文件
// ==========================================

pub mod ams;
pub mod analysis;
pub mod date_normalizer;
pub mod error;
pub mod filter;
pub mod target;

// 重导出核心引擎
pub use ams::{AmsEngine, MonthlyTotals};
pub use analysis::{
    EntityBreakdown, EntityComparison, MonthRange, PeriodComparison, PeriodSummary,
    ProductAnalysis, SalesAnalysisEngine, SummaryLevel, SummaryRow,
};
pub use date_normalizer::{DateNormalizer, DateRule, RawDateValue};
pub use error::{EngineError, EngineResult};
pub use filter::{available_townships, distinct_values, SegmentFilter};
pub use target::TargetCalculator;
