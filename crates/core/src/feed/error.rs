use thiserror::Error;

/// # Summary
/// 原始记录来源错误枚举，处理文件读取与字段解析失败。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - 数值解析失败必须报告，不得像 `+""` 那样静默变成 0。
#[derive(Error, Debug)]
pub enum FeedError {
    // 底层文件读取失败
    #[error("IO error: {0}")]
    Io(String),
    // CSV 格式错误
    #[error("CSV error: {0}")]
    Csv(String),
    // 缺少必需的列（日期列或名称列）
    #[error("Missing column: {0}")]
    MissingColumn(String),
    // 数值列无法解析
    #[error("Invalid number {value:?} in column {column} at line {line}")]
    InvalidNumber {
        column: String,
        value: String,
        line: u64,
    },
    // 日期列无法解析
    #[error("Invalid date {value:?} at line {line}")]
    InvalidDate { value: String, line: u64 },
}
