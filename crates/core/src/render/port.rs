use crate::render::entity::RenderFrame;
use crate::series::error::AnalyticsError;
use tracing::warn;

/// # Summary
/// 渲染协作者接口 (Port)。图表绘制由外部实现，核心只负责推送数据。
///
/// # Invariants
/// - 调用是 fire-and-forget 的，核心不依赖任何返回值。
/// - 实现类必须保证线程安全 (`Send` + `Sync`)。
pub trait RenderSink: Send + Sync {
    /// # Summary
    /// 接收一帧新数据并重绘。
    ///
    /// # Arguments
    /// * `frame`: 本次 tick 计算出的渲染帧。
    fn render(&self, frame: RenderFrame);

    /// # Summary
    /// 错误通道：接收单次 tick 的计算失败。
    ///
    /// # Logic
    /// 默认实现仅记录告警日志。
    ///
    /// # Arguments
    /// * `scheduler`: 出错的调度器名称。
    /// * `error`: 失败原因。
    fn render_error(&self, scheduler: &str, error: &AnalyticsError) {
        warn!("Tick of scheduler {} failed: {}", scheduler, error);
    }
}
