// ==========================================
// 销售目标测算 - API 层
// ==========================================
// 职责: 对外提供测算流程接口（CLI / 上层界面调用）
// ==========================================

pub mod error;
pub mod planning_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use planning_api::{PlanningApi, PlanningContext};
