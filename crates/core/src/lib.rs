//! # `quoteview-core` - 领域核心
//!
//! 定义行情序列实体、领域错误以及对外协作端口 (Port)。
//! 本 crate 不包含任何计算或调度逻辑，只描述数据与契约：
//! - `series`: 记录、序列存储与派生序列
//! - `feed`: 原始记录来源端口
//! - `render`: 渲染协作者端口与帧结构
//! - `config`: 应用配置

pub mod common;
pub mod config;
pub mod feed;
pub mod render;
pub mod series;
