// ==========================================
// 销售目标测算 - 领域类型定义
// ==========================================
// 职责: 自然月 (CalendarMonth)、分段键 (SegmentKey)、分析维度
// 红线: CalendarMonth 只表示 (年, 月)，日固定为 1
// ==========================================

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 月份英文缩写（展示格式 "Jan-2024"）
pub const MONTH_ABBRS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// 月份英文全称
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// ==========================================
// CalendarMonth - 自然月
// ==========================================
// 排序: (year, month) 字典序
// 序列化格式: "Jan-2024"（与导出表一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CalendarMonth {
    year: i32,
    month: u32,
}

impl CalendarMonth {
    /// 创建自然月（month 必须在 1..=12）
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) && NaiveDate::from_ymd_opt(year, month, 1).is_some() {
            Some(Self { year, month })
        } else {
            None
        }
    }

    /// 截断到月（丢弃日）
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// 当月 1 日
    pub fn first_day(&self) -> NaiveDate {
        // new() / from_date() 已保证日期有效
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// 向前推 n 个自然月
    pub fn minus_months(&self, n: u32) -> Self {
        self.shift(-(n as i64))
    }

    /// 向后推 n 个自然月
    pub fn plus_months(&self, n: u32) -> Self {
        self.shift(n as i64)
    }

    fn shift(&self, delta: i64) -> Self {
        let index = self.year as i64 * 12 + (self.month as i64 - 1) + delta;
        Self {
            year: index.div_euclid(12) as i32,
            month: (index.rem_euclid(12) + 1) as u32,
        }
    }

    /// 月份缩写（"Jan" .. "Dec"）
    pub fn month_abbr(&self) -> &'static str {
        MONTH_ABBRS[(self.month - 1) as usize]
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:04}", self.month_abbr(), self.year)
    }
}

impl From<CalendarMonth> for String {
    fn from(value: CalendarMonth) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for CalendarMonth {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl FromStr for CalendarMonth {
    type Err = String;

    /// 仅接受展示格式 "Mmm-yyyy"；宽松解析请使用 DateNormalizer
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (month_part, year_part) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("月份格式错误: {}", s))?;

        let month = MONTH_ABBRS
            .iter()
            .position(|m| m.eq_ignore_ascii_case(month_part))
            .ok_or_else(|| format!("未知月份: {}", month_part))? as u32
            + 1;
        let year: i32 = year_part
            .parse()
            .map_err(|_| format!("年份格式错误: {}", year_part))?;

        CalendarMonth::new(year, month).ok_or_else(|| format!("月份超出范围: {}", s))
    }
}

// ==========================================
// SegmentKey - 分段键
// ==========================================
// 粒度: (产品, 客户类型, 镇区, 区域)
// 排序: 按字段顺序字典序（AMS 输出顺序）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SegmentKey {
    pub product: String,
    pub customer_type: String,
    pub township: String,
    pub region: String,
}

impl SegmentKey {
    pub fn new(
        product: impl Into<String>,
        customer_type: impl Into<String>,
        township: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            product: product.into(),
            customer_type: customer_type.into(),
            township: township.into(),
            region: region.into(),
        }
    }

    /// 取某一维度的值
    pub fn value_of(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Product => &self.product,
            Dimension::CustomerType => &self.customer_type,
            Dimension::Township => &self.township,
            Dimension::Region => &self.region,
        }
    }
}

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} / {} / {}",
            self.product, self.customer_type, self.township, self.region
        )
    }
}

// ==========================================
// Dimension - 分析/筛选维度
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dimension {
    Product,
    CustomerType,
    Township,
    Region,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Product => write!(f, "PRODUCT"),
            Dimension::CustomerType => write!(f, "CUSTOMER_TYPE"),
            Dimension::Township => write!(f, "TOWNSHIP"),
            Dimension::Region => write!(f, "REGION"),
        }
    }
}
