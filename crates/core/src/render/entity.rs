use crate::common::TimeRange;
use crate::series::entity::{Company, Extent, Record, Transactions};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// # Summary
/// 一次调度 tick 产出的渲染帧，交给外部渲染协作者。
#[derive(Debug, Clone, Serialize)]
pub struct RenderFrame {
    // 产出该帧的调度器名称
    pub scheduler: String,
    // 调度器内的 tick 序号，从 1 开始
    pub tick: u64,
    // 帧内容
    pub payload: FramePayload,
}

/// 各视图的帧内容。
#[derive(Debug, Clone, Serialize)]
pub enum FramePayload {
    Equity(EquityFrame),
    Companies(CompaniesFrame),
}

/// # Summary
/// 指数视图帧：区间内的行情、对齐的均线切片与买卖点。
///
/// # Invariants
/// - `average` 与 `records` 等长且按下标对齐。
/// - `trend` 只包含均线已定义的点。
#[derive(Debug, Clone, Serialize)]
pub struct EquityFrame {
    // 当前展示的字段
    pub field: String,
    // 生效的滑块区间，None 表示全量
    pub range: Option<TimeRange>,
    pub records: Vec<Record>,
    pub average: Vec<Option<f64>>,
    pub trend: Vec<(DateTime<Utc>, f64)>,
    // 纵轴取值范围
    pub extent: Extent,
    // 下标相对于 `records`
    pub transactions: Transactions,
}

/// # Summary
/// 公司视图帧：当前活跃分区内的公司与展示字段。
#[derive(Debug, Clone, Serialize)]
pub struct CompaniesFrame {
    pub field: String,
    pub companies: Vec<Company>,
    // 以 0 为基线的纵轴取值范围
    pub extent: Extent,
}
