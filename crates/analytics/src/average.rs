use quoteview_core::series::entity::{DerivedSeries, FieldSource, SeriesStore};
use quoteview_core::series::error::AnalyticsError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

/// # Summary
/// 固定窗口的尾随移动平均计算器。
///
/// # Invariants
/// - 窗口长度在构造后不变；更换窗口或字段需要新建实例并重新计算。
/// - 计算结果与源序列按下标对齐，前 `window - 1` 个位置为 `None`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowAverager {
    // 源字段，例如 "Close"
    field: String,
    // 窗口长度
    window: usize,
}

impl WindowAverager {
    pub fn new(field: impl Into<String>, window: usize) -> Self {
        Self {
            field: field.into(),
            window,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// # Summary
    /// 纯函数版本：计算派生序列而不修改输入。
    ///
    /// # Arguments
    /// * `records`: 按时间升序排列的记录。
    ///
    /// # Returns
    /// 对齐的派生序列，或输入错误。
    pub fn compute<R: FieldSource>(&self, records: &[R]) -> Result<DerivedSeries, AnalyticsError> {
        moving_average(records, &self.field, self.window)
    }

    /// # Summary
    /// 存储版本：计算后挂载到 `SeriesStore` 的伴随派生序列上。
    ///
    /// # Logic
    /// 1. 调用 `compute` 计算。
    /// 2. 成功后替换存储中的旧派生序列；失败时存储保持不变。
    pub fn apply(&self, store: &mut SeriesStore) -> Result<(), AnalyticsError> {
        let derived = self.compute(store.records())?;
        debug!(
            "Attached SMA({}) over {} for {} records",
            self.window,
            self.field,
            store.len()
        );
        store.attach_average(derived);
        Ok(())
    }
}

/// # Summary
/// 计算 `field` 字段的固定窗口移动平均。
///
/// # Logic
/// 1. 依次校验：空序列 -> `EmptySeries`，窗口为 0 或超过长度 -> `InvalidWindow`，
///    任一记录缺字段 -> `MissingField`。
/// 2. 把每个值按其最短十进制表示转换为 `Decimal`，滑动和全程精确。
/// 3. 维护滑动和：进入窗口的值加上，离开窗口的值减去，整体 O(n)。
/// 4. 下标 `i >= window - 1` 处取 `round(sum / window)`，四舍五入且 .5 远离 0。
///
/// # Arguments
/// * `records`: 按时间升序排列的记录。
/// * `field`: 源字段名。
/// * `window`: 窗口长度。
///
/// # Returns
/// 与输入等长的派生序列。
pub fn moving_average<R: FieldSource>(
    records: &[R],
    field: &str,
    window: usize,
) -> Result<DerivedSeries, AnalyticsError> {
    if records.is_empty() {
        return Err(AnalyticsError::EmptySeries);
    }
    let len = records.len();
    if window == 0 || window > len {
        return Err(AnalyticsError::InvalidWindow { window, len });
    }
    let values = records
        .iter()
        .map(|r| r.value(field))
        .collect::<Result<Vec<f64>, _>>()?
        .into_iter()
        .map(|v| exact(field, v))
        .collect::<Result<Vec<Decimal>, _>>()?;
    let divisor = Decimal::from(window);

    let mut averages = vec![None; len];
    let mut sum = Decimal::ZERO;
    for (i, value) in values.iter().enumerate() {
        sum = sum
            .checked_add(*value)
            .ok_or_else(|| unrepresentable(field, *value))?;
        if i >= window {
            sum -= values[i - window];
        }
        if i + 1 >= window {
            let mean = (sum / divisor)
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
            averages[i] = Some(mean.to_f64().ok_or_else(|| unrepresentable(field, mean))?);
        }
    }

    Ok(DerivedSeries::new(field, window, averages))
}

/// 按 `f64` 的最短十进制表示转换，`13074.49` 得到精确的 `13074.49`。
fn exact(field: &str, value: f64) -> Result<Decimal, AnalyticsError> {
    value
        .to_string()
        .parse::<Decimal>()
        .map_err(|_| AnalyticsError::UnrepresentableValue {
            field: field.to_string(),
            value,
        })
}

fn unrepresentable(field: &str, value: Decimal) -> AnalyticsError {
    AnalyticsError::UnrepresentableValue {
        field: field.to_string(),
        value: value.to_f64().unwrap_or(f64::NAN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use quoteview_core::series::entity::Record;

    fn series(values: &[f64]) -> Vec<Record> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let time = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
                    + chrono::Duration::days(i64::try_from(i).unwrap());
                Record::new(time.format("%Y-%m-%d").to_string(), time).with_field("Close", *v)
            })
            .collect()
    }

    #[test]
    fn test_sma_window_three() {
        let records = series(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let derived = moving_average(&records, "Close", 3).unwrap();
        assert_eq!(
            derived.values(),
            &[None, None, Some(20.0), Some(30.0), Some(40.0)]
        );
        assert_eq!(derived.first_defined(), Some(2));
        assert_eq!(derived.window(), 3);
        assert_eq!(derived.field(), "Close");
    }

    #[test]
    fn test_sma_rounds_half_away_from_zero() {
        let up = moving_average(&series(&[1.0, 2.0]), "Close", 2).unwrap();
        assert_eq!(up.get(1), Some(2.0));

        let down = moving_average(&series(&[-1.0, -2.0]), "Close", 2).unwrap();
        assert_eq!(down.get(1), Some(-2.0));

        let fractional = moving_average(&series(&[10.2, 10.4, 10.1]), "Close", 3).unwrap();
        assert_eq!(fractional.get(2), Some(10.0));
    }

    #[test]
    fn test_sma_sum_does_not_drift_on_fractional_prices() {
        // 0.3 + 0.6 在 f64 中为 0.8999999999999999，精确和下 (0.6 + 0.4) / 2 = 0.5
        let derived = moving_average(&series(&[0.3, 0.6, 0.4]), "Close", 2).unwrap();
        assert_eq!(derived.values(), &[None, Some(0.0), Some(1.0)]);
    }

    /// 以分为单位的整数参考：对非负值 round(S / (100w)) = floor((2S + 100w) / (200w))
    fn exact_reference(cents: &[u32], window: usize) -> Vec<Option<f64>> {
        let w = u64::try_from(window).unwrap();
        (0..cents.len())
            .map(|i| {
                if i + 1 < window {
                    return None;
                }
                let sum: u64 = cents[i + 1 - window..=i].iter().map(|c| u64::from(*c)).sum();
                let rounded = (2 * sum + 100 * w) / (200 * w);
                Some(f64::from(u32::try_from(rounded).unwrap()))
            })
            .collect()
    }

    #[test]
    fn test_sma_matches_exact_reference_on_long_price_series() {
        // 20000 个两位小数价格，范围 5000.00 ..= 20000.00
        let mut state: u64 = 42;
        let cents: Vec<u32> = (0..20_000)
            .map(|_| {
                state = state
                    .wrapping_mul(6_364_136_223_846_793_005)
                    .wrapping_add(1_442_695_040_888_963_407);
                500_000 + u32::try_from((state >> 33) % 1_500_001).unwrap()
            })
            .collect();
        let prices: Vec<f64> = cents.iter().map(|c| f64::from(*c) / 100.0).collect();
        let records = series(&prices);

        for window in [2, 4, 100] {
            let derived = moving_average(&records, "Close", window).unwrap();
            let expected = exact_reference(&cents, window);
            let mismatches = derived
                .values()
                .iter()
                .zip(&expected)
                .filter(|(a, b)| a != b)
                .count();
            assert_eq!(mismatches, 0, "window {}", window);
        }
    }

    #[test]
    fn test_sma_rejects_non_finite_values() {
        let err = moving_average(&series(&[1.0, f64::INFINITY]), "Close", 2).unwrap_err();
        assert!(matches!(
            err,
            AnalyticsError::UnrepresentableValue { ref field, .. } if field == "Close"
        ));
    }

    #[test]
    fn test_sma_window_equal_to_length() {
        let derived = moving_average(&series(&[1.0, 2.0, 3.0, 4.0]), "Close", 4).unwrap();
        assert_eq!(derived.defined().collect::<Vec<_>>(), vec![(3, 3.0)]);
    }

    #[test]
    fn test_sma_rejects_bad_input() {
        let records = series(&[1.0, 2.0, 3.0]);
        assert_eq!(
            moving_average(&records, "Close", 0).unwrap_err(),
            AnalyticsError::InvalidWindow { window: 0, len: 3 }
        );
        assert_eq!(
            moving_average(&records, "Close", 4).unwrap_err(),
            AnalyticsError::InvalidWindow { window: 4, len: 3 }
        );
        assert_eq!(
            moving_average::<Record>(&[], "Close", 1).unwrap_err(),
            AnalyticsError::EmptySeries
        );
        assert!(matches!(
            moving_average(&records, "Volume", 2).unwrap_err(),
            AnalyticsError::MissingField { field, .. } if field == "Volume"
        ));
    }

    #[test]
    fn test_apply_attaches_to_store_and_keeps_it_on_failure() {
        let mut store = SeriesStore::new(series(&[10.0, 20.0, 30.0]));
        WindowAverager::new("Close", 2).apply(&mut store).unwrap();
        assert_eq!(store.average().and_then(|a| a.get(2)), Some(25.0));

        let err = WindowAverager::new("Close", 9).apply(&mut store);
        assert!(err.is_err());
        assert_eq!(store.average().map(|a| a.window()), Some(2));
    }
}
