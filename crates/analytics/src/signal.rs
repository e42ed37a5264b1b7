use quoteview_core::series::entity::{FieldSource, Transactions};
use quoteview_core::series::error::AnalyticsError;

/// # Summary
/// 依据收盘价与移动平均线的相对位置划分买卖点。
///
/// # Logic
/// 1. 逐条比较 `field` 值与同下标的均线值。
/// 2. 均线低于价格记为买入，价格低于均线记为卖出，相等或均线未定义则两者皆非。
///
/// # Arguments
/// * `records`: 记录集合。
/// * `average`: 与 `records` 对齐的均线值。
/// * `field`: 价格字段，通常为 "Close"。
///
/// # Returns
/// 买卖点下标（相对于 `records`）。
pub fn classify_transactions<R: FieldSource>(
    records: &[R],
    average: &[Option<f64>],
    field: &str,
) -> Result<Transactions, AnalyticsError> {
    let mut transactions = Transactions::default();
    for (i, (record, avg)) in records.iter().zip(average).enumerate() {
        let Some(avg) = avg else {
            continue;
        };
        let price = record.value(field)?;
        if *avg < price {
            transactions.buys.push(i);
        } else if price < *avg {
            transactions.sells.push(i);
        }
    }
    Ok(transactions)
}
