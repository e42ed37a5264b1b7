use quoteview_core::render::entity::{FramePayload, RenderFrame};
use quoteview_core::render::port::RenderSink;
use quoteview_core::series::error::AnalyticsError;
use tracing::{Level, error, info, trace, warn};

/// # Summary
/// 以日志形式输出渲染帧的渲染协作者。
/// 真正的图表绘制由前端完成，这里只输出每帧摘要，TRACE 级别下输出完整 JSON。
pub struct LogSink;

impl RenderSink for LogSink {
    fn render(&self, frame: RenderFrame) {
        match &frame.payload {
            FramePayload::Equity(f) => info!(
                "[{}#{}] equity {} records={} trend={} buys={} sells={} axis=[{}, {}]",
                frame.scheduler,
                frame.tick,
                f.field,
                f.records.len(),
                f.trend.len(),
                f.transactions.buys.len(),
                f.transactions.sells.len(),
                f.extent.min,
                f.extent.max
            ),
            FramePayload::Companies(f) => info!(
                "[{}#{}] companies {} count={} axis=[{}, {}]",
                frame.scheduler,
                frame.tick,
                f.field,
                f.companies.len(),
                f.extent.min,
                f.extent.max
            ),
        }

        if tracing::enabled!(Level::TRACE) {
            match serde_json::to_string(&frame) {
                Ok(json) => trace!("{}", json),
                Err(e) => warn!("Failed to serialize frame: {}", e),
            }
        }
    }

    fn render_error(&self, scheduler: &str, error: &AnalyticsError) {
        error!("[{}] render skipped: {}", scheduler, error);
    }
}
