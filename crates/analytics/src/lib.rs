//! # `quoteview-analytics` - 序列分析
//!
//! 纯函数式的序列计算，全部在调用线程内同步完成：
//! - `average`: 固定窗口移动平均 (SMA)
//! - `range`: 开区间时间过滤
//! - `extent`: 字段取值范围
//! - `signal`: 基于均线的买卖点分类

pub mod average;
pub mod extent;
pub mod range;
pub mod signal;
