use chrono::{DateTime, Utc};
use thiserror::Error;

/// # Summary
/// 序列分析域错误枚举。
///
/// # Invariants
/// - 所有错误在操作入口处被立即检测并返回，绝不以 0 等默认值静默替代。
/// - 均属于调用方输入错误，不做重试。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    // 窗口长度为 0 或超过序列长度
    #[error("Invalid window {window} for series of length {len}")]
    InvalidWindow { window: usize, len: usize },
    // 输入序列为空
    #[error("Series is empty")]
    EmptySeries,
    // 区间起点不早于终点
    #[error("Invalid range: begin {begin} is not before end {end}")]
    InvalidRange {
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    // 滑块毫秒时间戳超出可表示的时间范围
    #[error("Timestamp out of range: begin {begin_ms} ms, end {end_ms} ms")]
    TimestampOutOfRange { begin_ms: i64, end_ms: i64 },
    // 记录中缺少所请求的字段，record 为记录的日期或名称
    #[error("Field {field} missing on record {record}")]
    MissingField { field: String, record: String },
    // 数值无法精确参与十进制运算（非有限值或超出范围）
    #[error("Value {value} of field {field} cannot be represented exactly")]
    UnrepresentableValue { field: String, value: f64 },
}
