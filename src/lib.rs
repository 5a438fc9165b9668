// ==========================================
// 销售目标测算 - 核心库
// ==========================================
// 职责: 月份规范化 + 月均销量 (AMS) + 目标量测算
// 系统定位: 纯计算核心，输入不可变，每阶段返回新集合
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 值类型与记录
pub mod domain;

// 引擎层 - 计算规则
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 测算参数
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 测算流程
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    AmsBasis, AmsRow, CalendarMonth, Dimension, ImportSummary, RowError, SalesDataset,
    SalesRecord, SegmentKey, TargetRow,
};

// 引擎
pub use engine::{
    AmsEngine, DateNormalizer, EngineError, EngineResult, RawDateValue, SalesAnalysisEngine,
    SegmentFilter, TargetCalculator,
};

// API
pub use api::{ApiError, PlanningApi, PlanningContext};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "销售目标测算";
