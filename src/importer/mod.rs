// ==========================================
// 销售目标测算 - 导入层
// ==========================================
// 职责: 外部销售数据导入，生成规范化记录
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod sales_importer_impl;
pub mod sales_importer_trait;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::{FieldMapperImpl, REQUIRED_COLUMNS};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use sales_importer_impl::SalesImporterImpl;

// 重导出 Trait 接口
pub use sales_importer_trait::{FieldMapper, FileParser, ParsedTable, SalesImporter};
