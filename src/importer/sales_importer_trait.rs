// ==========================================
// 销售目标测算 - 销售数据导入 Trait
// ==========================================
// 职责: 定义导入接口（不包含实现）
// 管道: 文件解析 → 列校验 → 字段映射 → 月份规范化
// ==========================================

use crate::domain::sales::{RawSalesRecord, RowError, SalesDataset};
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

// ==========================================
// SalesImporter Trait
// ==========================================
// 实现者: SalesImporterImpl
#[async_trait]
pub trait SalesImporter: Send + Sync {
    /// 从 CSV 文件导入
    ///
    /// # 返回
    /// - Ok(SalesDataset): 可解析记录 + 全部行级错误
    /// - Err: 文件不可读、缺少必需列
    async fn import_from_csv<P: AsRef<Path> + Send>(&self, file_path: P)
        -> ImportResult<SalesDataset>;

    /// 从 Excel 文件导入（第一个工作表）
    async fn import_from_excel<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> ImportResult<SalesDataset>;

    /// 按扩展名自动选择解析器
    async fn import_file<P: AsRef<Path> + Send>(&self, file_path: P)
        -> ImportResult<SalesDataset>;

    /// 批量导入多个文件（并发执行，互不影响）
    ///
    /// # 返回
    /// - 每个文件一个结果；单个文件失败不影响其他文件
    async fn batch_import<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> Vec<Result<SalesDataset, String>>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为表头 + 原始行记录（HashMap<列名, 值>）
    ///
    /// 完全空白的行被跳过；每行附带其电子表格行号
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<ParsedTable>;
}

/// 解析结果
#[derive(Debug, Clone, Default)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<(usize, HashMap<String, String>)>,
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 实现者: FieldMapperImpl
pub trait FieldMapper: Send + Sync {
    /// 校验表头，返回缺失的必需列
    fn missing_columns(&self, headers: &[String]) -> Vec<String>;

    /// 将原始行记录映射为 RawSalesRecord
    ///
    /// # 参数
    /// - row: 原始行记录
    /// - row_number: 电子表格行号（用于错误报告）
    ///
    /// # 返回
    /// - Err(RowError): 行级错误，不中断导入
    fn map_to_raw_sales(
        &self,
        row: &HashMap<String, String>,
        row_number: usize,
    ) -> Result<RawSalesRecord, RowError>;
}
