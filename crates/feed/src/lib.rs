//! # `quoteview-feed` - 记录来源适配器
//!
//! 实现 `RecordSource` 端口，把 CSV 文本转换为强类型的行情与公司记录。

pub mod csv;
