use chrono::{DateTime, Utc};
use quoteview_core::common::TimeRange;
use quoteview_core::series::entity::Timestamped;
use quoteview_core::series::error::AnalyticsError;
use std::ops::Range;

/// # Summary
/// 返回开区间 `(begin, end)` 内的记录子序列。
///
/// # Logic
/// 1. 校验 `begin < end`，否则返回 `InvalidRange`。
/// 2. 委托给 `filter_range`。
///
/// # Arguments
/// * `records`: 按时间升序排列的记录。
/// * `begin`: 区间起点（不包含）。
/// * `end`: 区间终点（不包含）。
///
/// # Returns
/// 只读的借用切片，保持原始顺序。
pub fn filter_between<R: Timestamped>(
    records: &[R],
    begin: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<&[R], AnalyticsError> {
    let range = TimeRange::new(begin, end)?;
    Ok(filter_range(records, &range))
}

/// 按已校验的区间过滤，结果是输入的连续子切片。
pub fn filter_range<'a, R: Timestamped>(records: &'a [R], range: &TimeRange) -> &'a [R] {
    &records[window_indices(records, range)]
}

/// # Summary
/// 计算开区间在记录中对应的下标范围。
///
/// # Logic
/// 输入已按时间升序排列，因此区间内的记录一定连续：
/// 1. 起点下标 = 第一个时间严格大于 `begin` 的位置。
/// 2. 终点下标 = 第一个时间不小于 `end` 的位置。
/// 两次二分查找，O(log n)。
///
/// # Arguments
/// * `records`: 按时间升序排列的记录。
/// * `range`: 开区间。
///
/// # Returns
/// 下标范围，可用于同步截取对齐的派生序列。
pub fn window_indices<R: Timestamped>(records: &[R], range: &TimeRange) -> Range<usize> {
    let start = records.partition_point(|r| r.time() <= range.begin());
    let end = records.partition_point(|r| r.time() < range.end());
    start..end.max(start)
}
