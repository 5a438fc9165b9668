// ==========================================
// PlanningApi 端到端测试
// ==========================================
// 测试目标: 导入 → 筛选 → AMS → 目标量；上下文由调用方持有
// ==========================================


use sales_target_ams::api::{ApiError, PlanningApi, PlanningContext};
use sales_target_ams::config::{ConfigManager, PlanningParameters};
use sales_target_ams::domain::{Dimension, ImportSummary, SalesDataset};
use sales_target_ams::engine::{EngineError, MonthRange, SegmentFilter, SummaryLevel};
use sales_target_ams::importer::SalesImporterImpl;
use sales_target_ams::logging;
use std::collections::BTreeSet;
use test_helpers::{month, monthly_series, segment_a, write_sales_csv};

fn api() -> PlanningApi {
    PlanningApi::new(SalesImporterImpl::default())
}

fn context_with(records: Vec<sales_target_ams::SalesRecord>) -> PlanningContext {
    PlanningContext::new(PlanningParameters::default()).with_dataset(SalesDataset {
        batch_id: "test".to_string(),
        source: "memory".to_string(),
        records,
        date_errors: vec![],
        row_errors: vec![],
        summary: ImportSummary::default(),
    })
}

#[tokio::test]
async fn test_full_pipeline_from_csv() {
    logging::init_test();

    let csv = write_sales_csv(&[
        "Jan-2024,Product A,Retail,Township 1,Region 1,100",
        "Feb-2024,Product A,Retail,Township 1,Region 1,100",
        "Mar-2024,Product A,Retail,Township 1,Region 1,100",
        "Apr-2024,Product A,Retail,Township 1,Region 1,5",
        "May-2024,Product A,Retail,Township 1,Region 1,100",
        "Jun-2024,Product A,Retail,Township 1,Region 1,100",
        "not-a-month,Product A,Retail,Township 1,Region 1,100",
    ]);

    let config = ConfigManager::new();
    let (api, mut context) = PlanningApi::from_config(&config).unwrap();

    let summary = api.load_sales(&mut context, csv.path()).await.unwrap();
    assert_eq!(summary.success, 6);
    assert_eq!(summary.date_errors, 1);

    let targets = api.run_pipeline(&mut context).unwrap().to_vec();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].segment, segment_a());
    assert_eq!(targets[0].ams, 100);
    assert_eq!(targets[0].target_qty, 110);

    let ams_rows = context.ams_rows.as_ref().unwrap();
    assert_eq!(ams_rows[0].months_excluded, 1);
}

#[tokio::test]
async fn test_sample_fixture_pipeline() {
    let (api, mut context) = PlanningApi::from_config(&ConfigManager::new()).unwrap();
    api.load_sales(&mut context, "tests/fixtures/sample_sales.csv")
        .await
        .unwrap();

    let targets = api.run_pipeline(&mut context).unwrap();
    assert_eq!(targets.len(), 16);
    for target in targets {
        assert!(target.target_qty >= target.ams);
    }
}

#[test]
fn test_run_before_loading() {
    let api = api();
    let mut context = PlanningContext::default();

    assert!(matches!(api.run_ams(&mut context), Err(ApiError::NoDataLoaded)));
    assert!(matches!(
        api.options_for(&context, Dimension::Product),
        Err(ApiError::NoDataLoaded)
    ));
}

#[test]
fn test_targets_require_ams() {
    let api = api();
    let mut context = context_with(monthly_series(&segment_a(), month(2024, 1), &[10, 20]));

    assert!(matches!(api.run_targets(&mut context), Err(ApiError::AmsNotComputed)));

    api.run_ams(&mut context).unwrap();
    assert_eq!(api.run_targets(&mut context).unwrap().len(), 1);
}

#[test]
fn test_invalid_parameters_leave_no_partial_results() {
    let api = api();
    let mut context = context_with(monthly_series(&segment_a(), month(2024, 1), &[10, 20]));
    context.parameters.percent_increase = -1.0;

    let result = api.run_pipeline(&mut context);
    assert!(matches!(
        result,
        Err(ApiError::Engine(EngineError::InvalidParameter { .. }))
    ));
    assert!(context.ams_rows.is_none());
    assert!(context.targets.is_none());
}

#[test]
fn test_filter_applies_before_ams_and_resets_results() {
    let api = api();
    let other = sales_target_ams::SegmentKey::new("Product B", "Retail", "Township 2", "Region 2");

    let mut records = monthly_series(&segment_a(), month(2024, 1), &[10, 20]);
    records.extend(monthly_series(&other, month(2024, 1), &[30, 40]));
    let mut context = context_with(records);

    assert_eq!(api.run_pipeline(&mut context).unwrap().len(), 2);

    context.set_filter(SegmentFilter::all().with(Dimension::Region, &["Region 2"]));
    assert!(context.ams_rows.is_none());

    let rows = api.run_ams(&mut context).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].segment, other);

    // 过滤后为空
    context.set_filter(SegmentFilter::all().with(Dimension::Product, &["Product Z"]));
    assert!(matches!(
        api.run_ams(&mut context),
        Err(ApiError::Engine(EngineError::EmptyInput))
    ));
}

#[test]
fn test_options_and_analysis() {
    let api = api();
    let other = sales_target_ams::SegmentKey::new("Product B", "Retail", "Township 2", "Region 1");

    let mut records = monthly_series(&segment_a(), month(2024, 1), &[10, 20, 30, 40]);
    records.extend(monthly_series(&other, month(2024, 1), &[5, 5, 5, 5]));
    let context = context_with(records);

    assert_eq!(
        api.options_for(&context, Dimension::Product).unwrap(),
        vec!["Product A", "Product B"]
    );

    let regions: BTreeSet<String> = ["Region 1".to_string()].into_iter().collect();
    assert_eq!(
        api.townships_for(&context, &regions).unwrap(),
        vec!["Township 1", "Township 2"]
    );

    let totals = api.totals_by(&context, Dimension::Product).unwrap();
    assert_eq!(totals[0], ("Product A".to_string(), 100));

    let comparison = api
        .compare_periods(
            &context,
            MonthRange::new(month(2024, 1), month(2024, 2)).unwrap(),
            MonthRange::new(month(2024, 3), month(2024, 4)).unwrap(),
        )
        .unwrap();
    assert_eq!(comparison.period1.total, 40);
    assert_eq!(comparison.period2.total, 80);
    assert_eq!(comparison.change, 40);
    assert!((comparison.change_pct - 100.0).abs() < 1e-9);
}

#[test]
fn test_result_summaries() {
    let api = api();
    let b_retail =
        sales_target_ams::SegmentKey::new("Product B", "Retail", "Township 2", "Region 1");
    let b_wholesale =
        sales_target_ams::SegmentKey::new("Product B", "Wholesale", "Township 3", "Region 2");

    let mut records = monthly_series(&segment_a(), month(2024, 1), &[100, 100]);
    records.extend(monthly_series(&b_retail, month(2024, 1), &[80, 80]));
    records.extend(monthly_series(&b_wholesale, month(2024, 1), &[60, 60]));
    let mut context = context_with(records);

    assert!(matches!(
        api.ams_summary(&context, SummaryLevel::Product),
        Err(ApiError::AmsNotComputed)
    ));

    api.run_ams(&mut context).unwrap();
    assert!(matches!(
        api.target_summary(&context, SummaryLevel::Product),
        Err(ApiError::TargetsNotComputed)
    ));

    let ams = api.ams_summary(&context, SummaryLevel::Product).unwrap();
    assert_eq!(ams[0].product, "Product B");
    assert_eq!(ams[0].ams, 140);
    assert_eq!(ams[1].product, "Product A");
    assert_eq!(ams[1].rank, 2);

    api.run_targets(&mut context).unwrap();
    let detailed = api
        .target_summary(&context, SummaryLevel::ProductRegionCustomer)
        .unwrap();
    assert_eq!(detailed.len(), 3);
    assert_eq!(detailed[0].target_qty, Some(110));
    assert_eq!(detailed[0].region.as_deref(), Some("Region 1"));
    assert_eq!(detailed[2].customer_type.as_deref(), Some("Wholesale"));
    assert_eq!(detailed[2].target_qty, Some(66));
}

#[test]
fn test_entity_comparison_and_product_analysis() {
    let api = api();
    let other =
        sales_target_ams::SegmentKey::new("Product B", "Wholesale", "Township 2", "Region 2");

    let mut records = monthly_series(&segment_a(), month(2024, 1), &[10, 20, 30]);
    records.extend(monthly_series(&other, month(2024, 1), &[5, 6, 7]));
    let context = context_with(records);
    let range = MonthRange::new(month(2024, 2), month(2024, 3)).unwrap();

    let regions = api
        .compare_entities(&context, Dimension::Region, "Region 1", "Region 2", range)
        .unwrap();
    assert_eq!(regions.first.total, 50);
    assert_eq!(regions.second.total, 13);
    assert_eq!(regions.second.by_customer_type, vec![("Wholesale".to_string(), 13)]);
    assert_eq!(regions.first.monthly_totals.len(), 2);

    let townships = api
        .compare_entities(&context, Dimension::Township, "Township 1", "Township 9", range)
        .unwrap();
    assert_eq!(townships.second.total, 0);
    assert!(townships.second.monthly_totals.is_empty());

    let products = api.analyze_products(&context, range).unwrap();
    assert_eq!(products.product_totals[0], ("Product A".to_string(), 50));
    assert_eq!(products.trend.len(), 4);
    assert_eq!(
        products.by_customer_type[1],
        ("Product B".to_string(), "Wholesale".to_string(), 13)
    );
}
