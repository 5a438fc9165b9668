// ==========================================
// 销售目标测算 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// 单条记录的日期无法解析（非致命，由调用方收集）
    #[error("无法解析日期: {value}")]
    DateParse { value: String },

    /// 参数不满足前置条件（致命，不做任何部分计算）
    #[error("参数无效 ({parameter}): {value}")]
    InvalidParameter { parameter: String, value: String },

    /// 筛选/窗口后无记录
    #[error("输入记录为空")]
    EmptyInput,
}

impl EngineError {
    pub fn invalid_parameter(parameter: &str, value: impl ToString) -> Self {
        EngineError::InvalidParameter {
            parameter: parameter.to_string(),
            value: value.to_string(),
        }
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
