use crate::series::error::AnalyticsError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;
use tracing::warn;

/// # Summary
/// 可按字段名读取数值的观测数据。
///
/// # Invariants
/// - 字段缺失必须返回 `AnalyticsError::MissingField`，不得返回默认值。
pub trait FieldSource {
    /// # Summary
    /// 读取指定字段的数值。
    ///
    /// # Arguments
    /// * `field`: 字段名，例如 `Close`、`CMP`。
    ///
    /// # Returns
    /// 字段存在返回数值，否则返回 `MissingField`。
    fn value(&self, field: &str) -> Result<f64, AnalyticsError>;
}

/// 带有不可变时间戳的观测数据。
pub trait Timestamped {
    fn time(&self) -> DateTime<Utc>;
}

/// # Summary
/// 单条时间序列观测记录（例如某个交易日的指数行情）。
///
/// # Invariants
/// - `date` 与 `time` 在构造后不可变。
/// - 同一序列内时间戳唯一。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    // 原始日期文本，例如 "2020-01-01"
    date: String,
    // 解析后的时间点
    time: DateTime<Utc>,
    // 字段名到数值的映射
    fields: BTreeMap<String, f64>,
}

impl Record {
    pub fn new(date: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            date: date.into(),
            time,
            fields: BTreeMap::new(),
        }
    }

    /// 追加一个数值字段，便于链式构造。
    pub fn with_field(mut self, name: impl Into<String>, value: f64) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn fields(&self) -> &BTreeMap<String, f64> {
        &self.fields
    }
}

impl FieldSource for Record {
    fn value(&self, field: &str) -> Result<f64, AnalyticsError> {
        self.fields
            .get(field)
            .copied()
            .ok_or_else(|| AnalyticsError::MissingField {
                field: field.to_string(),
                record: self.date.clone(),
            })
    }
}

impl Timestamped for Record {
    fn time(&self) -> DateTime<Utc> {
        self.time
    }
}

/// # Summary
/// 公司截面数据（公司视图使用），以名称标识，没有时间戳。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    // 公司名称
    name: String,
    // 指标名到数值的映射，例如 CMP、PE、MarketCap
    fields: BTreeMap<String, f64>,
}

impl Company {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: f64) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &BTreeMap<String, f64> {
        &self.fields
    }
}

impl FieldSource for Company {
    fn value(&self, field: &str) -> Result<f64, AnalyticsError> {
        self.fields
            .get(field)
            .copied()
            .ok_or_else(|| AnalyticsError::MissingField {
                field: field.to_string(),
                record: self.name.clone(),
            })
    }
}

/// # Summary
/// 与源序列等长、按相同下标对齐的派生序列（例如移动平均线）。
///
/// # Invariants
/// - `values.len()` 等于源序列长度。
/// - 未定义的位置为 `None`，绝不用 0 填充。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSeries {
    // 计算所基于的源字段
    field: String,
    // 窗口长度
    window: usize,
    // 对齐的派生值
    values: Vec<Option<f64>>,
}

impl DerivedSeries {
    pub fn new(field: impl Into<String>, window: usize, values: Vec<Option<f64>>) -> Self {
        Self {
            field: field.into(),
            window,
            values,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 读取下标 `index` 处的派生值，越界或未定义均返回 `None`。
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    /// # Summary
    /// 遍历所有已定义的 `(下标, 值)`。
    ///
    /// # Logic
    /// 过滤掉 `None`，保留原始下标，便于绘制趋势线时只使用已定义的后缀。
    pub fn defined(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i, v)))
    }

    /// 第一个已定义值的下标。
    pub fn first_defined(&self) -> Option<usize> {
        self.values.iter().position(Option::is_some)
    }

    /// 按下标区间截取对齐的派生值切片，越界部分被截断。
    pub fn slice(&self, range: Range<usize>) -> &[Option<f64>] {
        let end = range.end.min(self.values.len());
        let start = range.start.min(end);
        &self.values[start..end]
    }
}

/// # Summary
/// 单个视图会话独占的有序时间序列存储。
///
/// # Invariants
/// - `records` 始终按时间戳严格升序排列，且时间戳唯一。
/// - 派生序列与 `records` 等长并按下标对齐。
#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    // 按时间升序排列的记录
    records: Vec<Record>,
    // 伴随的移动平均派生序列
    average: Option<DerivedSeries>,
}

impl SeriesStore {
    /// # Summary
    /// 由加载完成的记录构造存储。
    ///
    /// # Logic
    /// 1. 按时间戳稳定排序。
    /// 2. 对重复时间戳仅保留第一次出现的记录，并记录告警日志。
    ///
    /// # Arguments
    /// * `records`: 原始记录集合。
    ///
    /// # Returns
    /// 有序且时间戳唯一的序列存储。
    pub fn new(mut records: Vec<Record>) -> Self {
        records.sort_by_key(|r| r.time);
        let before = records.len();
        records.dedup_by(|later, earlier| later.time == earlier.time);
        if records.len() < before {
            warn!(
                "Dropped {} records with duplicate timestamps",
                before - records.len()
            );
        }
        Self {
            records,
            average: None,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// # Summary
    /// 挂载移动平均派生序列，替换旧值。
    ///
    /// # Arguments
    /// * `derived`: 基于本存储记录计算出的派生序列。
    pub fn attach_average(&mut self, derived: DerivedSeries) {
        debug_assert_eq!(derived.len(), self.records.len());
        self.average = Some(derived);
    }

    pub fn average(&self) -> Option<&DerivedSeries> {
        self.average.as_ref()
    }

    /// 清除派生序列（窗口或源字段变化时调用）。
    pub fn clear_average(&mut self) {
        self.average = None;
    }

    /// 以 "增强记录" 的形式遍历：记录与同下标的派生值。
    pub fn enriched(&self) -> impl Iterator<Item = (&Record, Option<f64>)> + '_ {
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| (r, self.average.as_ref().and_then(|a| a.get(i))))
    }

    /// # Summary
    /// 生成趋势线的绘制点。
    ///
    /// # Logic
    /// 只取派生值已定义的后缀，未挂载派生序列时返回空集合。
    ///
    /// # Returns
    /// `(时间, 派生值)` 列表。
    pub fn trend_points(&self) -> Vec<(DateTime<Utc>, f64)> {
        match &self.average {
            Some(avg) => avg
                .defined()
                .filter_map(|(i, v)| self.records.get(i).map(|r| (r.time, v)))
                .collect(),
            None => Vec::new(),
        }
    }
}

/// # Summary
/// 字段取值范围，用于坐标轴缩放。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min: f64,
    pub max: f64,
}

impl Extent {
    /// 将下界扩展到 0（柱状图基线）。
    pub fn from_zero(self) -> Self {
        Self {
            min: self.min.min(0.0),
            max: self.max.max(0.0),
        }
    }
}

/// # Summary
/// 收盘价相对移动平均线的买卖分类结果（记录下标）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transactions {
    // 均线低于收盘价的记录
    pub buys: Vec<usize>,
    // 收盘价低于均线的记录
    pub sells: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(d: u32, close: f64) -> Record {
        Record::new(
            format!("2020-01-{:02}", d),
            Utc.with_ymd_and_hms(2020, 1, d, 0, 0, 0).unwrap(),
        )
        .with_field("Close", close)
    }

    #[test]
    fn test_store_sorts_and_dedups_by_time() {
        let store = SeriesStore::new(vec![
            record(3, 30.0),
            record(1, 10.0),
            record(2, 20.0),
            record(1, 99.0),
        ]);
        let closes: Vec<f64> = store
            .records()
            .iter()
            .map(|r| r.value("Close").unwrap())
            .collect();
        assert_eq!(closes, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_missing_field_reports_record() {
        let r = record(1, 10.0);
        let err = r.value("Volume").unwrap_err();
        assert_eq!(
            err,
            AnalyticsError::MissingField {
                field: "Volume".to_string(),
                record: "2020-01-01".to_string(),
            }
        );
    }

    #[test]
    fn test_trend_points_skip_undefined_prefix() {
        let mut store = SeriesStore::new(vec![record(1, 10.0), record(2, 20.0), record(3, 30.0)]);
        assert!(store.trend_points().is_empty());

        store.attach_average(DerivedSeries::new("Close", 2, vec![None, Some(15.0), Some(25.0)]));
        let points = store.trend_points();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].1, 15.0);
        assert_eq!(points[0].0, store.records()[1].time());

        let enriched: Vec<Option<f64>> = store.enriched().map(|(_, v)| v).collect();
        assert_eq!(enriched, vec![None, Some(15.0), Some(25.0)]);
    }

    #[test]
    fn test_derived_slice_clamps_bounds() {
        let derived = DerivedSeries::new("Close", 1, vec![Some(1.0), Some(2.0), Some(3.0)]);
        assert_eq!(derived.slice(1..10), &[Some(2.0), Some(3.0)]);
        assert!(derived.slice(5..10).is_empty());
        assert_eq!(derived.first_defined(), Some(0));
    }

    #[test]
    fn test_extent_from_zero() {
        let extent = Extent { min: 5.0, max: 10.0 }.from_zero();
        assert_eq!(extent, Extent { min: 0.0, max: 10.0 });
    }
}
