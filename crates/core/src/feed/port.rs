use crate::feed::error::FeedError;
use crate::series::entity::{Company, Record};

/// # Summary
/// 原始记录来源接口 (Port)，负责把外部文本数据转换为强类型记录。
///
/// # Invariants
/// - 返回的行情记录无需预先排序，由 `SeriesStore` 负责排序。
/// - 数值字段必须全部解析成功，否则整体失败。
pub trait RecordSource: Send + Sync {
    /// # Summary
    /// 加载时间序列行情记录。
    ///
    /// # Returns
    /// 成功返回记录列表，失败返回 `FeedError`。
    fn load_quotes(&self) -> Result<Vec<Record>, FeedError>;

    /// # Summary
    /// 加载公司截面数据。
    ///
    /// # Returns
    /// 成功返回公司列表（保持文件中的顺序），失败返回 `FeedError`。
    fn load_companies(&self) -> Result<Vec<Company>, FeedError>;
}
