// ==========================================
// 销售目标测算 - 字段映射器实现
// ==========================================
// 职责: 源列名 → 标准字段映射 + 销量类型转换
// 列名匹配: 忽略大小写与分隔符（空格/下划线/连字符）
// ==========================================

use crate::domain::sales::{RawSalesRecord, RowError};
use crate::importer::sales_importer_trait::FieldMapper;
use std::collections::HashMap;

// ===== 标准列名 =====
pub const COL_MONTH: &str = "Mth-yr";
pub const COL_PRODUCT: &str = "Product";
pub const COL_CUSTOMER_TYPE: &str = "Customer Type";
pub const COL_TOWNSHIP: &str = "Township";
pub const COL_REGION: &str = "Region";
pub const COL_SALES_QTY: &str = "Sales Qty";

pub const REQUIRED_COLUMNS: [&str; 6] = [
    COL_MONTH,
    COL_PRODUCT,
    COL_CUSTOMER_TYPE,
    COL_TOWNSHIP,
    COL_REGION,
    COL_SALES_QTY,
];

/// 列名归一化：仅保留字母数字并转小写
fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// 标准列的可接受别名（已归一化）
fn aliases_of(column: &str) -> &'static [&'static str] {
    match column {
        COL_MONTH => &["mthyr", "month", "monthyear", "mthyear", "period"],
        COL_PRODUCT => &["product", "productname"],
        COL_CUSTOMER_TYPE => &["customertype", "customer", "custtype"],
        COL_TOWNSHIP => &["township", "town"],
        COL_REGION => &["region"],
        COL_SALES_QTY => &["salesqty", "qty", "quantity", "salesquantity"],
        _ => &[],
    }
}

fn matches_column(header: &str, column: &str) -> bool {
    let normalized = normalize_header(header);
    aliases_of(column).iter().any(|alias| *alias == normalized)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FieldMapperImpl;

impl FieldMapperImpl {
    /// 按标准列名取值（已 trim；空串视为缺失）
    fn get_string(&self, row: &HashMap<String, String>, column: &str) -> Option<String> {
        row.iter()
            .filter(|(header, _)| matches_column(header, column))
            .map(|(_, value)| value.trim())
            .find(|value| !value.is_empty())
            .map(str::to_string)
    }

    fn require_string(
        &self,
        row: &HashMap<String, String>,
        column: &str,
        row_number: usize,
    ) -> Result<String, RowError> {
        self.get_string(row, column).ok_or_else(|| RowError {
            row_number,
            field: column.to_string(),
            value: String::new(),
            message: "必填字段为空".to_string(),
        })
    }

    /// 解析销量：非负整数；允许整数值的小数写法（如 12.0）
    fn parse_quantity(
        &self,
        row: &HashMap<String, String>,
        row_number: usize,
    ) -> Result<u64, RowError> {
        let value = self.require_string(row, COL_SALES_QTY, row_number)?;
        let cleaned = value.replace(',', "");

        if let Ok(qty) = cleaned.parse::<u64>() {
            return Ok(qty);
        }

        let error = |message: &str| RowError {
            row_number,
            field: COL_SALES_QTY.to_string(),
            value: value.clone(),
            message: message.to_string(),
        };

        match cleaned.parse::<f64>() {
            Ok(qty) if !qty.is_finite() => Err(error("销量不是有限数值")),
            Ok(qty) if qty < 0.0 => Err(error("销量不能为负数")),
            Ok(qty) if qty.fract() != 0.0 => Err(error("销量必须为整数")),
            Ok(qty) if qty > u64::MAX as f64 => Err(error("销量超出范围")),
            Ok(qty) => Ok(qty as u64),
            Err(_) => Err(error("无法解析为整数")),
        }
    }
}

impl FieldMapper for FieldMapperImpl {
    fn missing_columns(&self, headers: &[String]) -> Vec<String> {
        REQUIRED_COLUMNS
            .iter()
            .filter(|column| !headers.iter().any(|h| matches_column(h, column)))
            .map(|column| column.to_string())
            .collect()
    }

    fn map_to_raw_sales(
        &self,
        row: &HashMap<String, String>,
        row_number: usize,
    ) -> Result<RawSalesRecord, RowError> {
        Ok(RawSalesRecord {
            month_raw: self.get_string(row, COL_MONTH),
            product: self.require_string(row, COL_PRODUCT, row_number)?,
            customer_type: self.require_string(row, COL_CUSTOMER_TYPE, row_number)?,
            township: self.require_string(row, COL_TOWNSHIP, row_number)?,
            region: self.require_string(row, COL_REGION, row_number)?,
            sales_qty: self.parse_quantity(row, row_number)?,
            row_number,
        })
    }
}
