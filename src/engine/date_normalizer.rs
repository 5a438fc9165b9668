// ==========================================
// 销售目标测算 - 月份规范化引擎
// ==========================================
// 职责: 将各种来源的日期表示规范化为自然月 (CalendarMonth)
// 红线: 规则顺序固定，命中即返回；同一输入永远得到同一结果
// ==========================================
// 规则顺序:
// 1) 结构化日期/时间 → 截断到月
// 2) 空值 → 无值（由调用方决定是否报错）
// 3) "月份名-年"（Jan-2024 / February-24）
// 4) 两段数字，总长 ≤ 7（01/2024、2024/1）
// 5) 两段数字，总长 = 7 且首段 4 位（yyyy-mm）
// 6) 通用日期格式
// 7) 电子表格日期序列号（基准 1899-12-30）
// 8) 均不命中 → DateParse 错误
// ==========================================

use crate::domain::types::{CalendarMonth, MONTH_ABBRS, MONTH_NAMES};
use crate::engine::error::{EngineError, EngineResult};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// 电子表格序列号换算后允许的最大年份
const MAX_SERIAL_YEAR: i32 = 9999;

/// 通用格式解析出的年份下限（须为 4 位年份）
const MIN_FREE_FORM_YEAR: i32 = 1000;

/// 单独的 4 位年份视为该年 1 月
const BARE_YEAR_RANGE: std::ops::RangeInclusive<i32> = 1678..=2261;

/// 通用日期时间格式（规则 6）
const FREE_FORM_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// 通用日期格式（规则 6），月在前优先；月份越界时回退为日在前
const FREE_FORM_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%b %d %Y",
];

// ==========================================
// RawDateValue - 原始月份值
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum RawDateValue {
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Number(f64),
    Text(String),
    Missing,
}

impl From<&str> for RawDateValue {
    fn from(value: &str) -> Self {
        RawDateValue::Text(value.to_string())
    }
}

impl From<String> for RawDateValue {
    fn from(value: String) -> Self {
        RawDateValue::Text(value)
    }
}

impl From<Option<String>> for RawDateValue {
    fn from(value: Option<String>) -> Self {
        value.map(RawDateValue::Text).unwrap_or(RawDateValue::Missing)
    }
}

impl From<NaiveDate> for RawDateValue {
    fn from(value: NaiveDate) -> Self {
        RawDateValue::Date(value)
    }
}

impl From<NaiveDateTime> for RawDateValue {
    fn from(value: NaiveDateTime) -> Self {
        RawDateValue::DateTime(value)
    }
}

impl fmt::Display for RawDateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawDateValue::DateTime(dt) => write!(f, "{}", dt),
            RawDateValue::Date(d) => write!(f, "{}", d),
            RawDateValue::Number(n) => write!(f, "{}", n),
            RawDateValue::Text(s) => write!(f, "{}", s),
            RawDateValue::Missing => Ok(()),
        }
    }
}

// ==========================================
// DateRule - 命中规则（可解释性）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DateRule {
    Structured,
    MonthNameYear,
    NumericMonthYear,
    IsoYearMonth,
    FreeForm,
    SpreadsheetSerial,
}

// ==========================================
// DateNormalizer - 月份规范化引擎
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct DateNormalizer;

impl DateNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// 规范化单个值
    ///
    /// # 返回
    /// - Ok(Some(month)): 命中某条规则
    /// - Ok(None): 空值
    /// - Err(DateParse): 所有规则均不命中
    pub fn normalize(&self, raw: &RawDateValue) -> EngineResult<Option<CalendarMonth>> {
        Ok(self.explain(raw)?.map(|(month, _)| month))
    }

    /// 规范化文本值（导入层入口）
    pub fn normalize_str(&self, raw: &str) -> EngineResult<Option<CalendarMonth>> {
        Ok(self.explain_str(raw)?.map(|(month, _)| month))
    }

    /// 规范化并返回命中的规则
    pub fn explain(&self, raw: &RawDateValue) -> EngineResult<Option<(CalendarMonth, DateRule)>> {
        match raw {
            // 规则 1: 结构化值
            RawDateValue::DateTime(dt) => {
                Ok(Some((CalendarMonth::from_date(dt.date()), DateRule::Structured)))
            }
            RawDateValue::Date(d) => Ok(Some((CalendarMonth::from_date(*d), DateRule::Structured))),

            // 规则 2: 空值
            RawDateValue::Missing => Ok(None),
            RawDateValue::Number(n) if n.is_nan() => Ok(None),

            // 数值按文本形式走后续规则
            RawDateValue::Number(n) => self.explain_str(&n.to_string()),
            RawDateValue::Text(s) => self.explain_str(s),
        }
    }

    /// 文本规范化（规则 2-8）
    pub fn explain_str(&self, raw: &str) -> EngineResult<Option<(CalendarMonth, DateRule)>> {
        let value = raw.trim();
        if is_missing_sentinel(value) {
            return Ok(None);
        }

        let matched = parse_month_name_year(value)
            .map(|m| (m, DateRule::MonthNameYear))
            .or_else(|| parse_numeric_month_year(value).map(|m| (m, DateRule::NumericMonthYear)))
            .or_else(|| parse_iso_year_month(value).map(|m| (m, DateRule::IsoYearMonth)))
            .or_else(|| parse_free_form(value).map(|m| (m, DateRule::FreeForm)))
            .or_else(|| parse_spreadsheet_serial(value).map(|m| (m, DateRule::SpreadsheetSerial)));

        match matched {
            Some((month, rule)) => {
                trace!(value = %value, month = %month, rule = ?rule, "月份规范化命中");
                Ok(Some((month, rule)))
            }
            None => Err(EngineError::DateParse {
                value: raw.to_string(),
            }),
        }
    }
}

fn is_missing_sentinel(value: &str) -> bool {
    value.is_empty()
        || value.eq_ignore_ascii_case("nan")
        || value.eq_ignore_ascii_case("nat")
        || value.eq_ignore_ascii_case("null")
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// 月份名（全称或缩写，大小写不敏感）→ 1..=12
fn lookup_month_name(name: &str) -> Option<u32> {
    MONTH_ABBRS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
        .or_else(|| MONTH_NAMES.iter().position(|m| m.eq_ignore_ascii_case(name)))
        .map(|idx| idx as u32 + 1)
}

/// 按 '-' 或 '/' 拆成恰好两段
fn split_two_numeric_parts(value: &str) -> Option<(&str, &str)> {
    if !value.contains('-') && !value.contains('/') {
        return None;
    }
    let mut parts = value.split(|c: char| c == '-' || c == '/');
    let first = parts.next()?.trim();
    let second = parts.next()?.trim();
    if parts.next().is_some() || !is_digits(first) || !is_digits(second) {
        return None;
    }
    Some((first, second))
}

// 规则 3: "Jan-2024" / "February-24"
fn parse_month_name_year(value: &str) -> Option<CalendarMonth> {
    let mut parts = value.split('-');
    let month_part = parts.next()?.trim();
    let year_part = parts.next()?.trim();
    if parts.next().is_some() {
        return None;
    }

    let month = lookup_month_name(month_part)?;
    let mut year: i32 = year_part.parse().ok()?;
    // 两位年份一律视为 20xx
    if (0..=99).contains(&year) {
        year += 2000;
    }
    CalendarMonth::new(year, month)
}

// 规则 4: "01/2024" / "12-2024" / "2024/1"
fn parse_numeric_month_year(value: &str) -> Option<CalendarMonth> {
    if value.chars().count() > 7 {
        return None;
    }
    let (first, second) = split_two_numeric_parts(value)?;
    let first_val: u32 = first.parse().ok()?;
    let second_val: u32 = second.parse().ok()?;

    if (1..=12).contains(&first_val) && second.len() == 4 {
        CalendarMonth::new(second_val as i32, first_val)
    } else if (1..=12).contains(&second_val) && first.len() == 4 {
        CalendarMonth::new(first_val as i32, second_val)
    } else {
        None
    }
}

// 规则 5: "2024-01" / "2024/01"
fn parse_iso_year_month(value: &str) -> Option<CalendarMonth> {
    if value.chars().count() != 7 {
        return None;
    }
    let (first, second) = split_two_numeric_parts(value)?;
    if first.len() != 4 {
        return None;
    }
    CalendarMonth::new(first.parse().ok()?, second.parse().ok()?)
}

// 规则 6: 通用日期格式
fn parse_free_form(value: &str) -> Option<CalendarMonth> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(CalendarMonth::from_date(dt.date_naive()));
    }

    // 月份名 + 4 位年份须先于 chrono 格式匹配
    if let Some(month) = parse_month_name_with_year(value) {
        return Some(month);
    }
    if let Some(month) = parse_bare_year(value) {
        return Some(month);
    }

    let datetime = FREE_FORM_DATETIME_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
        .find(|d| d.year() >= MIN_FREE_FORM_YEAR);
    if let Some(date) = datetime {
        return Some(CalendarMonth::from_date(date));
    }

    FREE_FORM_DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .find(|d| d.year() >= MIN_FREE_FORM_YEAR)
        .map(CalendarMonth::from_date)
}

// "January 2024" / "Jan, 2024" / "Jan/2024" / "2024-Jan" / "2024 January"（年份必须 4 位）
fn parse_month_name_with_year(value: &str) -> Option<CalendarMonth> {
    let tokens: Vec<&str> = value
        .split(|c: char| c.is_whitespace() || c == ',' || c == '/' || c == '-')
        .filter(|t| !t.is_empty())
        .collect();
    let (name, year) = match tokens.as_slice() {
        [name, year] if is_four_digit_year(year) => (*name, *year),
        [year, name] if is_four_digit_year(year) => (*name, *year),
        _ => return None,
    };
    let month = lookup_month_name(name)?;
    CalendarMonth::new(year.parse().ok()?, month)
}

fn is_four_digit_year(token: &str) -> bool {
    token.len() == 4 && is_digits(token)
}

// "2024" → 2024 年 1 月
fn parse_bare_year(value: &str) -> Option<CalendarMonth> {
    if !is_four_digit_year(value) {
        return None;
    }
    let year: i32 = value.parse().ok()?;
    if !BARE_YEAR_RANGE.contains(&year) {
        return None;
    }
    CalendarMonth::new(year, 1)
}

// 规则 7: 电子表格日期序列号
fn parse_spreadsheet_serial(value: &str) -> Option<CalendarMonth> {
    if !is_digits(&value.replace('.', "")) {
        return None;
    }
    let serial: f64 = value.parse().ok()?;
    if !serial.is_finite() {
        return None;
    }

    // 基准日 1899-12-30：保留 1900 年闰年兼容偏移
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let days = Duration::try_days(serial.floor() as i64)?;
    let date = base.checked_add_signed(days)?;
    if CalendarMonth::from_date(date).year() > MAX_SERIAL_YEAR {
        return None;
    }
    Some(CalendarMonth::from_date(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, m: u32) -> CalendarMonth {
        CalendarMonth::new(year, m).unwrap()
    }

    fn norm(value: &str) -> CalendarMonth {
        DateNormalizer::new()
            .normalize_str(value)
            .unwrap()
            .unwrap_or_else(|| panic!("{} 应解析为月份", value))
    }

    #[test]
    fn test_structured_values_truncate_to_month() {
        let normalizer = DateNormalizer::new();
        let dt = NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(13, 45, 0)
            .unwrap();

        assert_eq!(
            normalizer.explain(&RawDateValue::DateTime(dt)).unwrap(),
            Some((month(2024, 5), DateRule::Structured))
        );
        assert_eq!(
            normalizer
                .normalize(&RawDateValue::Date(NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()))
                .unwrap(),
            Some(month(2023, 2))
        );
    }

    #[test]
    fn test_missing_values_are_not_errors() {
        let normalizer = DateNormalizer::new();
        assert_eq!(normalizer.normalize(&RawDateValue::Missing).unwrap(), None);
        assert_eq!(normalizer.normalize_str("   ").unwrap(), None);
        assert_eq!(normalizer.normalize_str("NaN").unwrap(), None);
        assert_eq!(normalizer.normalize(&RawDateValue::Number(f64::NAN)).unwrap(), None);
    }

    #[test]
    fn test_month_name_year() {
        assert_eq!(norm("Jan-2024"), month(2024, 1));
        assert_eq!(norm("february-24"), month(2024, 2));
        assert_eq!(norm("SEP-2023"), month(2023, 9));
        assert_eq!(norm("December-0"), month(2000, 12));
        assert_eq!(norm("Mar-99"), month(2099, 3));
    }

    #[test]
    fn test_numeric_month_year() {
        assert_eq!(norm("01/2024"), month(2024, 1));
        assert_eq!(norm("12-2024"), month(2024, 12));
        assert_eq!(norm("3/2025"), month(2025, 3));
        assert_eq!(norm("2024/1"), month(2024, 1));
    }

    #[test]
    fn test_iso_year_month_length_seven() {
        let normalizer = DateNormalizer::new();
        assert_eq!(norm("2024-01"), month(2024, 1));
        assert_eq!(norm("2024/11"), month(2024, 11));
        // 月份越界：规则 4/5 均不命中，最终失败
        assert!(normalizer.normalize_str("2024-13").is_err());
    }

    #[test]
    fn test_free_form_dates() {
        assert_eq!(norm("2024-01-15"), month(2024, 1));
        assert_eq!(norm("2024/03/31"), month(2024, 3));
        assert_eq!(norm("20250120"), month(2025, 1));
        assert_eq!(norm("2024-06-30 08:15:00"), month(2024, 6));
        assert_eq!(norm("2024-07-01T00:00:00Z"), month(2024, 7));
        assert_eq!(norm("January 2024"), month(2024, 1));
        assert_eq!(norm("Aug 2023"), month(2023, 8));
        assert_eq!(norm("15-Mar-2024"), month(2024, 3));
        assert_eq!(norm("04/05/2024"), month(2024, 4));
    }

    #[test]
    fn test_month_name_space_four_digit_year() {
        for (idx, (abbr, name)) in MONTH_ABBRS.iter().zip(MONTH_NAMES.iter()).enumerate() {
            let expected = month(2024, idx as u32 + 1);
            assert_eq!(norm(&format!("{} 2024", abbr)), expected, "{}", abbr);
            assert_eq!(norm(&format!("{} 2024", name)), expected, "{}", name);
            assert_eq!(
                DateNormalizer::new()
                    .explain_str(&format!("{} 2024", abbr))
                    .unwrap()
                    .map(|(_, rule)| rule),
                Some(DateRule::FreeForm)
            );
        }
        assert_eq!(norm("Jan, 2024"), month(2024, 1));
    }

    #[test]
    fn test_free_form_month_first_then_day_first() {
        // 月在前
        assert_eq!(norm("04.05.2024"), month(2024, 4));
        assert_eq!(norm("04-05-2024"), month(2024, 4));
        // 月份越界时回退为日在前
        assert_eq!(norm("25/01/2024"), month(2024, 1));
        assert_eq!(norm("13/05/2024"), month(2024, 5));
        assert_eq!(norm("25-01-2024"), month(2024, 1));
        assert_eq!(norm("25.12.2023"), month(2023, 12));
    }

    #[test]
    fn test_year_before_month_name_and_bare_year() {
        assert_eq!(norm("2024-Jan"), month(2024, 1));
        assert_eq!(norm("2024 January"), month(2024, 1));
        assert_eq!(norm("2023 sep"), month(2023, 9));
        assert_eq!(norm("2024"), month(2024, 1));
        assert_eq!(
            DateNormalizer::new().explain_str("2024").unwrap(),
            Some((month(2024, 1), DateRule::FreeForm))
        );
        // 5 位数字仍按序列号处理
        assert_eq!(
            DateNormalizer::new().explain_str("45292").unwrap(),
            Some((month(2024, 1), DateRule::SpreadsheetSerial))
        );
        assert!(DateNormalizer::new().normalize_str("2024-Foo").is_err());
    }

    #[test]
    fn test_spreadsheet_serial() {
        let normalizer = DateNormalizer::new();
        // 45292 = 2024-01-01
        assert_eq!(norm("45292"), month(2024, 1));
        assert_eq!(norm("45322.75"), month(2024, 1));
        assert_eq!(norm("45323"), month(2024, 2));
        assert_eq!(
            normalizer.explain(&RawDateValue::Number(45292.0)).unwrap(),
            Some((month(2024, 1), DateRule::SpreadsheetSerial))
        );
    }

    #[test]
    fn test_unparseable_value_keeps_original() {
        let normalizer = DateNormalizer::new();
        let err = normalizer.normalize_str("not a month").unwrap_err();
        assert_eq!(
            err,
            EngineError::DateParse {
                value: "not a month".to_string()
            }
        );
        assert!(normalizer.normalize_str("Foo-2024").is_err());
        assert!(normalizer.normalize_str("13/45/x").is_err());
    }

    #[test]
    fn test_display_output_is_fixed_point() {
        let normalizer = DateNormalizer::new();
        for input in ["Jan-24", "2024-02", "11/2023", "2024-05-20", "45292"] {
            let first = norm(input);
            let second = normalizer.normalize_str(&first.to_string()).unwrap().unwrap();
            assert_eq!(first, second, "输入 {}", input);
        }
    }
}
