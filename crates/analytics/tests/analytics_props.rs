use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use quoteview_analytics::average::moving_average;
use quoteview_analytics::range::filter_between;
use quoteview_core::series::entity::{Record, Timestamped};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
}

/// 以天为单位递增的时间序列
fn series(values: &[i32]) -> Vec<Record> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let time = base() + Duration::days(i64::try_from(i).unwrap());
            Record::new(time.format("%Y-%m-%d").to_string(), time).with_field("Close", f64::from(*v))
        })
        .collect()
}

/// 以分为单位的两位小数价格序列
fn priced(cents: &[u32]) -> Vec<Record> {
    cents
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let time = base() + Duration::days(i64::try_from(i).unwrap());
            Record::new(time.format("%Y-%m-%d").to_string(), time)
                .with_field("Close", f64::from(*c) / 100.0)
        })
        .collect()
}

/// 整数运算的逐窗口参考实现：非负值 round(S / (100w)) = floor((2S + 100w) / (200w))
fn exact_cents(cents: &[u32], window: usize) -> Vec<Option<f64>> {
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

/// O(n·w) 逐窗口重新求和的参考实现
fn naive(values: &[i32], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let sum: f64 = values[i + 1 - window..=i].iter().map(|v| f64::from(*v)).sum();
            Some((sum / f64::from(u32::try_from(window).unwrap())).round())
        })
        .collect()
}

proptest! {
    #[test]
    fn sma_matches_naive_resummation(
        (values, window) in prop::collection::vec(-100_000i32..100_000, 1..200)
            .prop_flat_map(|v| {
                let len = v.len();
                (Just(v), 1..=len)
            })
    ) {
        let derived = moving_average(&series(&values), "Close", window).unwrap();
        let expected = naive(&values, window);
        prop_assert_eq!(derived.values(), expected.as_slice());
        for i in 0..window - 1 {
            prop_assert!(derived.get(i).is_none());
        }
    }

    #[test]
    fn sma_is_exact_on_two_decimal_prices(
        (cents, window) in prop::collection::vec(0u32..2_000_000, 1..400)
            .prop_flat_map(|v| {
                let max = v.len().min(100);
                (Just(v), 1..=max)
            })
    ) {
        let derived = moving_average(&priced(&cents), "Close", window).unwrap();
        let expected = exact_cents(&cents, window);
        prop_assert_eq!(derived.values(), expected.as_slice());
    }

    #[test]
    fn sma_resolves_exact_half_ties_away_from_zero(
        base_cents in 500_000u32..2_000_000,
        window in 1usize..=100,
    ) {
        // 整元价格，最后一个值多出 50 * window 分，使均值恰为 x.50
        let w = u32::try_from(window).unwrap();
        let mut cents = vec![base_cents - base_cents % 100; window];
        cents[window - 1] += 50 * w;
        let derived = moving_average(&priced(&cents), "Close", window).unwrap();
        let expected = exact_cents(&cents, window);
        prop_assert_eq!(derived.get(window - 1), expected[window - 1]);
    }

    #[test]
    fn filter_returns_exact_open_interval_and_is_idempotent(
        len in 0usize..60,
        a in 0i64..70,
        b in 0i64..70,
    ) {
        prop_assume!(a < b);
        let records = series(&vec![1; len]);
        let begin = base() + Duration::days(a);
        let end = base() + Duration::days(b);

        let once = filter_between(&records, begin, end).unwrap();
        let expected: Vec<&Record> = records
            .iter()
            .filter(|r| begin < r.time() && r.time() < end)
            .collect();
        prop_assert_eq!(once.iter().collect::<Vec<_>>(), expected);

        let twice = filter_between(once, begin, end).unwrap();
        prop_assert_eq!(once, twice);
    }
}
