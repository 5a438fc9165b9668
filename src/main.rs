// ==========================================
// 销售目标测算 - 命令行入口
// ==========================================
// 用法:
//   sales-target-ams <sales_file> [config.json]
// 输出: 目标量表（JSON）写到 stdout，日志与行级错误写到 stderr
// ==========================================

use anyhow::{bail, Context};
use sales_target_ams::api::PlanningApi;
use sales_target_ams::config::ConfigManager;
use sales_target_ams::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let Some(sales_file) = args.next() else {
        bail!("用法: sales-target-ams <sales_file> [config.json]");
    };

    tracing::info!("==================================================");
    tracing::info!("{} v{}", sales_target_ams::APP_NAME, sales_target_ams::VERSION);
    tracing::info!("==================================================");

    let config = match args.next() {
        Some(path) => ConfigManager::from_file(&path)
            .with_context(|| format!("无法加载配置文件: {}", path))?,
        None => ConfigManager::new(),
    };

    let (api, mut context) = PlanningApi::from_config(&config)?;

    let summary = api
        .load_sales(&mut context, &sales_file)
        .await
        .with_context(|| format!("导入失败: {}", sales_file))?;

    if let Some(dataset) = &context.dataset {
        for err in dataset.date_errors.iter().chain(dataset.row_errors.iter()) {
            tracing::warn!(
                row = err.row_number,
                field = %err.field,
                value = %err.value,
                "{}",
                err.message
            );
        }
    }
    tracing::info!(
        total = summary.total_rows,
        success = summary.success,
        date_errors = summary.date_errors,
        row_errors = summary.row_errors,
        "导入汇总"
    );

    let targets = api.run_pipeline(&mut context)?;
    println!("{}", serde_json::to_string_pretty(targets)?);

    Ok(())
}
