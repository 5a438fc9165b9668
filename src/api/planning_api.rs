// ==========================================
// 销售目标测算 - 测算 API
// ==========================================
// 职责: 串联 导入 → 筛选 → AMS → 目标量
// 状态: 由调用方持有 PlanningContext，API 自身无可变状态
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{PlanningConfigReader, PlanningParameters};
use crate::domain::sales::{AmsRow, ImportSummary, SalesDataset, SalesRecord, TargetRow};
use crate::domain::types::Dimension;
use crate::engine::{
    available_townships, distinct_values, AmsEngine, EntityComparison, MonthRange,
    PeriodComparison, ProductAnalysis, SalesAnalysisEngine, SegmentFilter, SummaryLevel,
    SummaryRow, TargetCalculator,
};
use crate::importer::{SalesImporter, SalesImporterImpl};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, instrument};

// ==========================================
// PlanningContext - 调用方持有的测算上下文
// ==========================================
// 导入新数据会清空下游结果；修改参数/筛选后需重新计算
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanningContext {
    pub dataset: Option<SalesDataset>,
    pub filter: SegmentFilter,
    pub parameters: PlanningParameters,
    pub ams_rows: Option<Vec<AmsRow>>,
    pub targets: Option<Vec<TargetRow>>,
}

impl PlanningContext {
    pub fn new(parameters: PlanningParameters) -> Self {
        Self {
            parameters,
            ..Self::default()
        }
    }

    /// 直接装入已有数据集（跳过文件导入）
    pub fn with_dataset(mut self, dataset: SalesDataset) -> Self {
        self.set_dataset(dataset);
        self
    }

    pub fn set_dataset(&mut self, dataset: SalesDataset) {
        self.dataset = Some(dataset);
        self.clear_results();
    }

    pub fn set_filter(&mut self, filter: SegmentFilter) {
        self.filter = filter;
        self.clear_results();
    }

    pub fn clear_results(&mut self) {
        self.ams_rows = None;
        self.targets = None;
    }

    fn records(&self) -> ApiResult<&[SalesRecord]> {
        self.dataset
            .as_ref()
            .map(|d| d.records.as_slice())
            .ok_or(ApiError::NoDataLoaded)
    }
}

// ==========================================
// PlanningApi
// ==========================================
pub struct PlanningApi {
    importer: SalesImporterImpl,
    ams_engine: AmsEngine,
    target_calculator: TargetCalculator,
    analysis_engine: SalesAnalysisEngine,
}

impl PlanningApi {
    pub fn new(importer: SalesImporterImpl) -> Self {
        Self {
            importer,
            ams_engine: AmsEngine::new(),
            target_calculator: TargetCalculator::new(),
            analysis_engine: SalesAnalysisEngine::new(),
        }
    }

    /// 按配置创建 API 与初始上下文
    pub fn from_config(config: &dyn PlanningConfigReader) -> ApiResult<(Self, PlanningContext)> {
        let importer = SalesImporterImpl::from_config(config)?;
        let parameters = config.get_planning_parameters()?;
        Ok((Self::new(importer), PlanningContext::new(parameters)))
    }

    // ==========================================
    // 导入
    // ==========================================

    /// 导入销售文件，写入上下文并返回导入汇总
    pub async fn load_sales<P: AsRef<Path> + Send>(
        &self,
        context: &mut PlanningContext,
        file_path: P,
    ) -> ApiResult<ImportSummary> {
        let dataset = self.importer.import_file(file_path).await?;
        let summary = dataset.summary.clone();
        context.set_dataset(dataset);
        Ok(summary)
    }

    // ==========================================
    // 测算
    // ==========================================

    /// 按上下文中的筛选条件与参数计算 AMS
    #[instrument(skip(self, context))]
    pub fn run_ams<'a>(&self, context: &'a mut PlanningContext) -> ApiResult<&'a [AmsRow]> {
        let params = context.parameters;
        let filtered = context.filter.apply(context.records()?);

        let rows = self.ams_engine.compute_ams(
            &filtered,
            params.window_months,
            params.exclusion_threshold_percent,
        )?;

        context.targets = None;
        Ok(context.ams_rows.insert(rows).as_slice())
    }

    /// 基于已计算的 AMS 计算目标量
    #[instrument(skip(self, context))]
    pub fn run_targets<'a>(&self, context: &'a mut PlanningContext) -> ApiResult<&'a [TargetRow]> {
        let ams_rows = context.ams_rows.as_deref().ok_or(ApiError::AmsNotComputed)?;
        let targets = self
            .target_calculator
            .compute_targets(ams_rows, context.parameters.percent_increase)?;

        Ok(context.targets.insert(targets).as_slice())
    }

    /// 一次完成 AMS + 目标量；参数先整体校验，不做部分计算
    pub fn run_pipeline<'a>(
        &self,
        context: &'a mut PlanningContext,
    ) -> ApiResult<&'a [TargetRow]> {
        context.parameters.validate()?;
        self.run_ams(context)?;
        let targets = self.run_targets(context)?;
        info!(segments = targets.len(), "测算流程完成");
        Ok(targets)
    }

    // ==========================================
    // 分析与筛选选项
    // ==========================================

    /// 两期销量对比（基于筛选后的记录）
    pub fn compare_periods(
        &self,
        context: &PlanningContext,
        period1: MonthRange,
        period2: MonthRange,
    ) -> ApiResult<PeriodComparison> {
        let filtered = context.filter.apply(context.records()?);
        Ok(self
            .analysis_engine
            .compare_periods(&filtered, period1, period2)?)
    }

    /// 按维度汇总（基于筛选后的记录）
    pub fn totals_by(
        &self,
        context: &PlanningContext,
        dimension: Dimension,
    ) -> ApiResult<Vec<(String, u64)>> {
        let filtered = context.filter.apply(context.records()?);
        Ok(self.analysis_engine.totals_by(&filtered, dimension))
    }

    /// 区域或镇区两两对比（基于筛选后的记录）
    pub fn compare_entities(
        &self,
        context: &PlanningContext,
        dimension: Dimension,
        first: &str,
        second: &str,
        range: MonthRange,
    ) -> ApiResult<EntityComparison> {
        let filtered = context.filter.apply(context.records()?);
        Ok(self
            .analysis_engine
            .compare_entities(&filtered, dimension, first, second, range)?)
    }

    /// 产品分析（基于筛选后的记录）
    pub fn analyze_products(
        &self,
        context: &PlanningContext,
        range: MonthRange,
    ) -> ApiResult<ProductAnalysis> {
        let filtered = context.filter.apply(context.records()?);
        Ok(self.analysis_engine.analyze_products(&filtered, range)?)
    }

    /// AMS 结果汇总
    pub fn ams_summary(
        &self,
        context: &PlanningContext,
        level: SummaryLevel,
    ) -> ApiResult<Vec<SummaryRow>> {
        let rows = context.ams_rows.as_deref().ok_or(ApiError::AmsNotComputed)?;
        Ok(self.analysis_engine.summarize_ams(rows, level))
    }

    /// 目标量结果汇总
    pub fn target_summary(
        &self,
        context: &PlanningContext,
        level: SummaryLevel,
    ) -> ApiResult<Vec<SummaryRow>> {
        let targets = context.targets.as_deref().ok_or(ApiError::TargetsNotComputed)?;
        Ok(self.analysis_engine.summarize_targets(targets, level))
    }

    /// 某维度的全部可选值
    pub fn options_for(
        &self,
        context: &PlanningContext,
        dimension: Dimension,
    ) -> ApiResult<Vec<String>> {
        Ok(distinct_values(context.records()?, dimension))
    }

    /// 所选区域下的可选镇区
    pub fn townships_for(
        &self,
        context: &PlanningContext,
        regions: &BTreeSet<String>,
    ) -> ApiResult<Vec<String>> {
        Ok(available_townships(context.records()?, regions))
    }
}
