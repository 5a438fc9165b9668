// ==========================================
// 销售模板数据生成器
// ==========================================
// 用途: 生成 12 个月的示例销售 CSV
// 输出: tests/fixtures/sample_sales.csv（或命令行指定路径）
// ==========================================

use chrono::{Datelike, Months, NaiveDate};
use csv::Writer;
use std::error::Error;
use std::fs::File;

const CSV_HEADER: &[&str] = &[
    "Mth-yr",
    "Product",
    "Customer Type",
    "Township",
    "Region",
    "Sales Qty",
];

const PRODUCTS: &[&str] = &["Product A", "Product B"];
const CUSTOMER_TYPES: &[&str] = &["Retail", "Wholesale"];
const TOWNSHIPS: &[&str] = &["Township 1", "Township 2"];
const REGIONS: &[&str] = &["Region 1", "Region 2"];

const MONTHS: u32 = 12;
const MIN_QTY: u64 = 50;
const MAX_QTY: u64 = 500;

/// 线性同余发生器，保证每次生成结果一致
struct Lcg(u64);

impl Lcg {
    fn next_in(&mut self, min: u64, max: u64) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        min + (self.0 >> 33) % (max - min + 1)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/fixtures/sample_sales.csv".to_string());
    println!("开始生成示例销售数据...");

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("无效起始月份")?;
    let mut rng = Lcg(42);

    let file = File::create(&path)?;
    let mut wtr = Writer::from_writer(file);
    wtr.write_record(CSV_HEADER)?;

    let mut rows = 0usize;
    for offset in 0..MONTHS {
        let month = start
            .checked_add_months(Months::new(offset))
            .ok_or("月份溢出")?;
        let month_label = format!("{}-{}", month.format("%b"), month.year());

        for product in PRODUCTS {
            for customer_type in CUSTOMER_TYPES {
                for township in TOWNSHIPS {
                    for region in REGIONS {
                        let qty = rng.next_in(MIN_QTY, MAX_QTY).to_string();
                        wtr.write_record([
                            month_label.as_str(),
                            *product,
                            *customer_type,
                            *township,
                            *region,
                            qty.as_str(),
                        ])?;
                        rows += 1;
                    }
                }
            }
        }
    }

    wtr.flush()?;
    println!("✓ 已生成 {} 行: {}", rows, path);
    Ok(())
}
