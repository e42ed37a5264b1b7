//! # `quoteview-live` - 实时刷新引擎
//!
//! 以定时器驱动的闭环演示时钟：
//! - `buffer`: 双分区轮转缓冲区，模拟持续滚动的数据集
//! - `cycle`: 可回绕的字段轮换序列
//! - `scheduler`: 互相独立的周期调度器，支持幂等停止
//! - `equity` / `companies`: 两个视图会话，持有各自的数据并注入调度器

pub mod buffer;
pub mod companies;
pub mod cycle;
pub mod equity;
pub mod error;
pub mod scheduler;
