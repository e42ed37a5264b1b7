use crate::series::error::AnalyticsError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// # Summary
/// 开区间时间范围 `(begin, end)`，通常由前端滑块组件给出。
///
/// # Invariants
/// - `begin` 严格小于 `end`，构造时校验。
/// - 两端边界均不包含：相邻的两次区间查询不会重复统计边界上的记录。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    // 区间起点（不包含）
    begin: DateTime<Utc>,
    // 区间终点（不包含）
    end: DateTime<Utc>,
}

impl TimeRange {
    /// # Summary
    /// 构造一个开区间。
    ///
    /// # Logic
    /// 1. 校验 `begin < end`。
    ///
    /// # Arguments
    /// * `begin`: 区间起点。
    /// * `end`: 区间终点。
    ///
    /// # Returns
    /// 成功返回区间，`begin >= end` 时返回 `AnalyticsError::InvalidRange`。
    pub fn new(begin: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, AnalyticsError> {
        if begin >= end {
            return Err(AnalyticsError::InvalidRange { begin, end });
        }
        Ok(Self { begin, end })
    }

    /// # Summary
    /// 将滑块给出的毫秒级时间戳归一化为开区间。
    ///
    /// # Logic
    /// 1. 将两端毫秒时间戳转换为 UTC 时间，任一端超出 chrono 表示范围时
    ///    返回携带原始毫秒值的 `TimestampOutOfRange`。
    /// 2. 复用 `new` 的边界校验。
    ///
    /// # Arguments
    /// * `begin_ms`: 起点 (Unix 毫秒)。
    /// * `end_ms`: 终点 (Unix 毫秒)。
    ///
    /// # Returns
    /// 归一化后的区间，或 `TimestampOutOfRange` / `InvalidRange`。
    pub fn from_epoch_millis(begin_ms: i64, end_ms: i64) -> Result<Self, AnalyticsError> {
        let (Some(begin), Some(end)) = (
            DateTime::from_timestamp_millis(begin_ms),
            DateTime::from_timestamp_millis(end_ms),
        ) else {
            return Err(AnalyticsError::TimestampOutOfRange { begin_ms, end_ms });
        };
        Self::new(begin, end)
    }

    pub fn begin(&self) -> DateTime<Utc> {
        self.begin
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// 判断时间点是否严格落在区间内部。
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        self.begin < time && time < self.end
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.begin.to_rfc3339(), self.end.to_rfc3339())
    }
}
