// ==========================================
// 销售目标测算 - 销售数据导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到 SalesDataset
// 流程: 解析 → 列校验 → 映射 → 月份规范化 → 汇总
// 红线: 行级错误只收集不中断；缺少必需列直接失败
// ==========================================

use crate::config::{ConfigResult, PlanningConfigReader};
use crate::domain::sales::{ImportSummary, RowError, SalesDataset, SalesRecord};
use crate::engine::DateNormalizer;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{FieldMapperImpl, COL_MONTH};
use crate::importer::file_parser::{CsvParser, ExcelParser, UniversalFileParser};
use crate::importer::sales_importer_trait::{FieldMapper, FileParser, ParsedTable, SalesImporter};
use async_trait::async_trait;
use futures::future::join_all;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// SalesImporterImpl - 销售数据导入器实现
// ==========================================
pub struct SalesImporterImpl {
    csv_delimiter: u8,
    field_mapper: Box<dyn FieldMapper>,
    date_normalizer: DateNormalizer,
}

impl SalesImporterImpl {
    /// 创建导入器
    ///
    /// # 参数
    /// - csv_delimiter: CSV 分隔符
    /// - field_mapper: 字段映射器
    pub fn new(csv_delimiter: u8, field_mapper: Box<dyn FieldMapper>) -> Self {
        Self {
            csv_delimiter,
            field_mapper,
            date_normalizer: DateNormalizer::new(),
        }
    }

    /// 按配置创建（读取 CSV 分隔符）
    pub fn from_config(config: &dyn PlanningConfigReader) -> ConfigResult<Self> {
        Ok(Self::new(
            config.get_csv_delimiter()?,
            Box::new(FieldMapperImpl),
        ))
    }

    #[instrument(skip(self, parser, file_path), fields(batch_id))]
    fn import_with(&self, parser: &dyn FileParser, file_path: &Path) -> ImportResult<SalesDataset> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        let source = file_path.display().to_string();
        info!(batch_id = %batch_id, file_path = %source, "开始导入销售数据");

        // === 步骤 1: 解析文件 ===
        debug!("步骤 1: 解析文件");
        let table = parser.parse_to_raw_records(file_path).map_err(|e| {
            error!(error = %e, "文件解析失败");
            e
        })?;
        info!(total_rows = table.rows.len(), "文件解析完成");

        // === 步骤 2-4: 列校验 + 映射 + 月份规范化 ===
        let mut dataset = self.build_dataset(table, batch_id, source)?;

        info!(
            success = dataset.summary.success,
            date_errors = dataset.summary.date_errors,
            row_errors = dataset.summary.row_errors,
            missing_month = dataset.summary.missing_month,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "销售数据导入完成"
        );

        dataset.records.shrink_to_fit();
        Ok(dataset)
    }

    /// 将解析结果转换为 SalesDataset
    fn build_dataset(
        &self,
        table: ParsedTable,
        batch_id: String,
        source: String,
    ) -> ImportResult<SalesDataset> {
        // === 步骤 2: 列校验 ===
        debug!("步骤 2: 列校验");
        let missing = self.field_mapper.missing_columns(&table.headers);
        if !missing.is_empty() {
            error!(missing = ?missing, "缺少必需列");
            return Err(ImportError::MissingColumns(missing));
        }

        let mut summary = ImportSummary {
            total_rows: table.rows.len(),
            ..ImportSummary::default()
        };
        let mut records = Vec::with_capacity(table.rows.len());
        let mut date_errors = Vec::new();
        let mut row_errors = Vec::new();

        // === 步骤 3: 字段映射 + 步骤 4: 月份规范化 ===
        debug!("步骤 3/4: 字段映射 + 月份规范化");
        for (row_number, row) in &table.rows {
            let raw = match self.field_mapper.map_to_raw_sales(row, *row_number) {
                Ok(raw) => raw,
                Err(row_error) => {
                    warn!(row_number = row_number, field = %row_error.field, "字段映射失败");
                    row_errors.push(row_error);
                    continue;
                }
            };

            let month_text = match raw.month_raw.as_deref() {
                Some(text) => text,
                None => {
                    summary.missing_month += 1;
                    continue;
                }
            };

            match self.date_normalizer.normalize_str(month_text) {
                Ok(Some(month_key)) => {
                    records.push(SalesRecord::new(month_key, raw.segment(), raw.sales_qty));
                }
                Ok(None) => summary.missing_month += 1,
                Err(e) => {
                    warn!(row_number = row_number, value = %month_text, "月份解析失败");
                    date_errors.push(RowError {
                        row_number: *row_number,
                        field: COL_MONTH.to_string(),
                        value: month_text.to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        summary.success = records.len();
        summary.date_errors = date_errors.len();
        summary.row_errors = row_errors.len();

        Ok(SalesDataset {
            batch_id,
            source,
            records,
            date_errors,
            row_errors,
            summary,
        })
    }
}

impl Default for SalesImporterImpl {
    fn default() -> Self {
        Self::new(b',', Box::new(FieldMapperImpl))
    }
}

#[async_trait]
impl SalesImporter for SalesImporterImpl {
    async fn import_from_csv<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> ImportResult<SalesDataset> {
        let parser = CsvParser::new(self.csv_delimiter);
        self.import_with(&parser, file_path.as_ref())
    }

    async fn import_from_excel<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> ImportResult<SalesDataset> {
        self.import_with(&ExcelParser, file_path.as_ref())
    }

    async fn import_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
    ) -> ImportResult<SalesDataset> {
        let parser = UniversalFileParser::new(self.csv_delimiter);
        self.import_with(&parser, file_path.as_ref())
    }

    async fn batch_import<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> Vec<Result<SalesDataset, String>> {
        info!(file_count = file_paths.len(), "开始批量导入");

        let tasks = file_paths
            .iter()
            .map(|path| self.import_file(path.as_ref()));

        join_all(tasks)
            .await
            .into_iter()
            .map(|result| result.map_err(|e| e.to_string()))
            .collect()
    }
}
