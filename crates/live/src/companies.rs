use crate::buffer::{RotationBuffer, RotationOutcome};
use crate::error::SchedulerError;
use crate::scheduler::{SchedulerOptions, SchedulerRegistry};
use quoteview_analytics::extent::field_extent;
use quoteview_core::render::entity::{CompaniesFrame, FramePayload, RenderFrame};
use quoteview_core::render::port::RenderSink;
use quoteview_core::series::entity::Company;
use quoteview_core::series::error::AnalyticsError;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

pub const FIELDS_SCHEDULER: &str = "companies-fields";
pub const ROTATION_SCHEDULER: &str = "companies-rotation";

/// 根据活跃分区构建一帧公司视图数据，纵轴以 0 为基线。
fn build_frame(
    buffer: &RotationBuffer<Company>,
    field: &str,
) -> Result<CompaniesFrame, AnalyticsError> {
    let companies = buffer.active_vec();
    let extent = field_extent(&companies, field)?.from_zero();
    Ok(CompaniesFrame {
        field: field.to_string(),
        companies,
        extent,
    })
}

/// # Summary
/// 公司视图会话：两个互相独立的调度器共享同一个轮转缓冲区。
///
/// # Invariants
/// - 字段调度器只读缓冲区，轮转调度器只推进缓冲区，两者各自计时。
/// - 每次 tick 在持锁期间完成，两个调度器只在 tick 边界交错。
/// - 会话被丢弃时停止全部调度器。
pub struct CompaniesSession {
    buffer: Arc<Mutex<RotationBuffer<Company>>>,
    schedulers: SchedulerRegistry,
}

impl CompaniesSession {
    pub fn new(companies: Vec<Company>) -> Self {
        Self {
            buffer: Arc::new(Mutex::new(RotationBuffer::new(companies))),
            schedulers: SchedulerRegistry::new(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RotationBuffer<Company>> {
        self.buffer.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 立即计算一帧（不经过调度器）。
    pub fn frame(&self, field: &str) -> Result<CompaniesFrame, AnalyticsError> {
        build_frame(&self.lock(), field)
    }

    /// 立即渲染一帧，序号为 0，失败时进入错误通道。
    pub fn render_now(&self, scheduler: &str, field: &str, sink: &dyn RenderSink) {
        match self.frame(field) {
            Ok(frame) => sink.render(RenderFrame {
                scheduler: scheduler.to_string(),
                tick: 0,
                payload: FramePayload::Companies(frame),
            }),
            Err(e) => sink.render_error(scheduler, &e),
        }
    }

    /// 手动推进一步轮转。
    pub fn rotate(&self) -> RotationOutcome {
        self.lock().tick()
    }

    /// 活跃分区中的公司名称，按顺序。
    pub fn active_names(&self) -> Vec<String> {
        self.lock().active().map(|c| c.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// # Summary
    /// 启动字段轮换调度器。
    ///
    /// # Logic
    /// 每次 tick 取下一个字段，对当前活跃分区计算一帧。字段序列为空时不渲染。
    pub fn start_fields(
        &self,
        options: SchedulerOptions,
        sink: Arc<dyn RenderSink>,
    ) -> Result<(), SchedulerError> {
        let buffer = self.buffer.clone();
        self.schedulers.spawn(options, sink, move |tick| {
            let Some(field) = tick.field.as_deref() else {
                return Ok(None);
            };
            let buffer = buffer.lock().unwrap_or_else(|e| e.into_inner());
            build_frame(&buffer, field).map(|f| Some(FramePayload::Companies(f)))
        })
    }

    /// # Summary
    /// 启动分区轮转调度器。
    ///
    /// # Logic
    /// 每次 tick 推进一步轮转，不直接渲染，变化在下一次字段 tick 时呈现。
    pub fn start_rotation(
        &self,
        options: SchedulerOptions,
        sink: Arc<dyn RenderSink>,
    ) -> Result<(), SchedulerError> {
        let buffer = self.buffer.clone();
        self.schedulers.spawn(options, sink, move |tick| {
            let mut buffer = buffer.lock().unwrap_or_else(|e| e.into_inner());
            let outcome = buffer.tick();
            debug!(
                "Rotation tick {}: {:?}, {} active",
                tick.seq,
                outcome,
                buffer.active().len()
            );
            Ok(None)
        })
    }

    /// # Summary
    /// 以默认名称同时启动字段调度器与轮转调度器。
    ///
    /// # Arguments
    /// * `fields`: 字段序列。
    /// * `field_interval_ms`: 字段轮换间隔。
    /// * `rotation_interval_ms`: 分区轮转间隔。
    /// * `sink`: 渲染协作者。
    ///
    /// # Returns
    /// 轮转调度器启动失败时停止已启动的字段调度器，两者要么都运行，要么都不运行。
    pub fn start(
        &self,
        fields: Vec<String>,
        field_interval_ms: u64,
        rotation_interval_ms: u64,
        sink: Arc<dyn RenderSink>,
    ) -> Result<(), SchedulerError> {
        self.start_fields(
            SchedulerOptions::new(FIELDS_SCHEDULER, field_interval_ms, fields),
            sink.clone(),
        )?;
        let rotation = self.start_rotation(
            SchedulerOptions::new(ROTATION_SCHEDULER, rotation_interval_ms, Vec::new()),
            sink,
        );
        if let Err(e) = &rotation {
            warn!("Rotation scheduler failed to start: {}. Stopping field scheduler", e);
            self.schedulers.stop(FIELDS_SCHEDULER);
        }
        rotation
    }

    /// # Summary
    /// 打开视图：立即渲染第一个字段，随后由调度器从第二个字段继续轮换。
    ///
    /// # Logic
    /// 1. 字段序列左移一位后调用 `start`，失败则不渲染。
    /// 2. 以 tick 0 渲染原序列的第一个字段。
    pub fn open(
        &self,
        mut fields: Vec<String>,
        field_interval_ms: u64,
        rotation_interval_ms: u64,
        sink: Arc<dyn RenderSink>,
    ) -> Result<(), SchedulerError> {
        let first = fields.first().cloned();
        if !fields.is_empty() {
            fields.rotate_left(1);
        }
        self.start(fields, field_interval_ms, rotation_interval_ms, sink.clone())?;
        if let Some(field) = first {
            self.render_now(FIELDS_SCHEDULER, &field, sink.as_ref());
        }
        Ok(())
    }

    pub fn stop(&self, name: &str) -> bool {
        self.schedulers.stop(name)
    }

    pub fn stop_all(&self) {
        self.schedulers.stop_all();
    }

    pub fn running(&self) -> Vec<String> {
        self.schedulers.names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> CompaniesSession {
        CompaniesSession::new(vec![
            Company::new("Alpha").with_field("CMP", 100.0).with_field("PE", 20.0),
            Company::new("Beta").with_field("CMP", 250.0).with_field("PE", 35.0),
            Company::new("Gamma").with_field("CMP", 50.0).with_field("PE", 12.0),
        ])
    }

    #[test]
    fn test_frame_uses_active_partition_and_zero_baseline() {
        let session = session();
        let frame = session.frame("CMP").unwrap();
        assert_eq!(frame.companies.len(), 3);
        assert_eq!(frame.extent.min, 0.0);
        assert_eq!(frame.extent.max, 250.0);

        assert_eq!(session.rotate(), RotationOutcome::Moved);
        let frame = session.frame("PE").unwrap();
        let names: Vec<&str> = frame.companies.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["Beta", "Gamma"]);
        assert_eq!(frame.extent.max, 35.0);
    }

    #[test]
    fn test_exhausted_partition_reports_empty_then_refills() {
        let session = session();
        for _ in 0..3 {
            session.rotate();
        }
        assert_eq!(session.frame("CMP").unwrap_err(), AnalyticsError::EmptySeries);
        assert_eq!(session.rotate(), RotationOutcome::Swapped);
        assert_eq!(session.active_names(), vec!["Alpha", "Beta", "Gamma"]);
        assert_eq!(session.len(), 3);
    }

    #[test]
    fn test_missing_field_is_not_defaulted() {
        let session = session();
        assert!(matches!(
            session.frame("ROCE"),
            Err(AnalyticsError::MissingField { .. })
        ));
    }
}
