use quoteview_core::series::entity::{Extent, FieldSource};
use quoteview_core::series::error::AnalyticsError;

/// # Summary
/// 计算字段在记录集合上的取值范围，用于坐标轴缩放。
///
/// # Logic
/// 1. 空集合返回 `EmptySeries`。
/// 2. 任一记录缺字段立即返回 `MissingField`，不会用 0 代替缺失的最大值。
///
/// # Arguments
/// * `records`: 记录集合，顺序无关。
/// * `field`: 字段名。
///
/// # Returns
/// 最小值与最大值。
pub fn field_extent<R: FieldSource>(records: &[R], field: &str) -> Result<Extent, AnalyticsError> {
    let mut iter = records.iter();
    let first = iter.next().ok_or(AnalyticsError::EmptySeries)?.value(field)?;
    iter.try_fold(
        Extent {
            min: first,
            max: first,
        },
        |acc, r| {
            let v = r.value(field)?;
            Ok(Extent {
                min: acc.min.min(v),
                max: acc.max.max(v),
            })
        },
    )
}
