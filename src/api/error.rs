// ==========================================
// 销售目标测算 - API 层错误类型
// ==========================================
// 职责: 汇总引擎/导入/配置错误，供调用方统一处理
// ==========================================

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::importer::ImportError;
use thiserror::Error;

/// API 层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("测算失败: {0}")]
    Engine(#[from] EngineError),

    #[error("文件导入失败: {0}")]
    Import(#[from] ImportError),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    // ==========================================
    // 流程状态错误
    // ==========================================
    #[error("尚未导入销售数据")]
    NoDataLoaded,

    #[error("尚未计算 AMS")]
    AmsNotComputed,

    #[error("尚未计算目标量")]
    TargetsNotComputed,

    #[error("无效输入: {0}")]
    InvalidInput(String),
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
