use crate::error::SchedulerError;
use crate::scheduler::{SchedulerOptions, SchedulerRegistry};
use chrono::{DateTime, Utc};
use quoteview_analytics::average::WindowAverager;
use quoteview_analytics::extent::field_extent;
use quoteview_analytics::range::{filter_range, window_indices};
use quoteview_analytics::signal::classify_transactions;
use quoteview_core::common::TimeRange;
use quoteview_core::render::entity::{EquityFrame, FramePayload, RenderFrame};
use quoteview_core::render::port::RenderSink;
use quoteview_core::series::entity::{Record, SeriesStore, Timestamped};
use quoteview_core::series::error::AnalyticsError;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// 字段序列为空时展示的字段
pub const DEFAULT_FIELD: &str = "Close";

/// # Summary
/// 指数视图会话内部状态。
///
/// # Invariants
/// - 派生均线只在字段或窗口变化后重新计算。
struct EquityState {
    store: SeriesStore,
    window: usize,
    // 滑块给出的开区间
    range: Option<TimeRange>,
}

impl EquityState {
    /// # Summary
    /// 计算一帧指数视图数据。
    ///
    /// # Logic
    /// 1. 若均线缺失或其字段/窗口与当前不一致，重新计算并挂载。
    /// 2. 按滑块区间求出下标范围，同步截取记录与均线。
    /// 3. 计算纵轴范围、趋势线点与买卖点。
    fn frame(&mut self, field: &str) -> Result<EquityFrame, AnalyticsError> {
        let stale = self
            .store
            .average()
            .map(|a| a.field() != field || a.window() != self.window)
            .unwrap_or(true);
        if stale {
            WindowAverager::new(field, self.window).apply(&mut self.store)?;
        }

        let records = self.store.records();
        let indices = match &self.range {
            Some(range) => window_indices(records, range),
            None => 0..records.len(),
        };
        let visible = match &self.range {
            Some(range) => filter_range(records, range),
            None => records,
        };
        let average = self
            .store
            .average()
            .map(|a| a.slice(indices).to_vec())
            .unwrap_or_default();

        let extent = field_extent(visible, field)?;
        let transactions = classify_transactions(visible, &average, field)?;
        let trend: Vec<(DateTime<Utc>, f64)> = visible
            .iter()
            .zip(&average)
            .filter_map(|(r, a)| a.map(|v| (r.time(), v)))
            .collect();

        Ok(EquityFrame {
            field: field.to_string(),
            range: self.range,
            records: visible.to_vec(),
            average,
            trend,
            extent,
            transactions,
        })
    }
}

/// # Summary
/// 指数视图会话：独占一条行情序列，并驱动其刷新调度器。
///
/// # Invariants
/// - 每个会话只有一个 `SeriesStore`，由 tick 处理函数通过 `Arc<Mutex>` 共享。
/// - 每次 tick 在持锁期间完成全部计算，不同调度器只在 tick 边界交错。
/// - 会话被丢弃时停止全部调度器。
pub struct EquitySession {
    state: Arc<Mutex<EquityState>>,
    schedulers: SchedulerRegistry,
}

impl EquitySession {
    /// # Summary
    /// 创建会话。
    ///
    /// # Arguments
    /// * `records`: 加载完成的行情记录，无需预先排序。
    /// * `window`: 移动平均窗口，首次计算时校验。
    pub fn new(records: Vec<Record>, window: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(EquityState {
                store: SeriesStore::new(records),
                window,
                range: None,
            })),
            schedulers: SchedulerRegistry::new(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EquityState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// 应用滑块给出的区间。
    pub fn set_range(&self, range: TimeRange) {
        debug!("Equity range set to {}", range);
        self.lock().range = Some(range);
    }

    /// # Summary
    /// 以毫秒时间戳应用滑块区间。
    ///
    /// # Returns
    /// 区间非法时返回 `InvalidRange`，时间戳超出范围时返回 `TimestampOutOfRange`，
    /// 两种情况下当前区间都保持不变。
    pub fn set_range_millis(&self, begin_ms: i64, end_ms: i64) -> Result<(), AnalyticsError> {
        let range = TimeRange::from_epoch_millis(begin_ms, end_ms)?;
        self.set_range(range);
        Ok(())
    }

    pub fn clear_range(&self) {
        self.lock().range = None;
    }

    pub fn range(&self) -> Option<TimeRange> {
        self.lock().range
    }

    /// # Summary
    /// 更换移动平均窗口。
    ///
    /// # Logic
    /// 1. 先按新窗口计算，失败则保留旧窗口与旧均线。
    /// 2. 成功后替换窗口与派生序列。
    pub fn set_window(&self, window: usize) -> Result<(), AnalyticsError> {
        let mut state = self.lock();
        let field = state
            .store
            .average()
            .map(|a| a.field().to_string())
            .unwrap_or_else(|| DEFAULT_FIELD.to_string());
        WindowAverager::new(field, window).apply(&mut state.store)?;
        state.window = window;
        Ok(())
    }

    pub fn window(&self) -> usize {
        self.lock().window
    }

    /// 立即计算一帧（不经过调度器）。
    pub fn frame(&self, field: &str) -> Result<EquityFrame, AnalyticsError> {
        self.lock().frame(field)
    }

    /// 立即渲染一帧，序号为 0，失败时进入错误通道。
    pub fn render_now(&self, scheduler: &str, field: &str, sink: &dyn RenderSink) {
        match self.frame(field) {
            Ok(frame) => sink.render(RenderFrame {
                scheduler: scheduler.to_string(),
                tick: 0,
                payload: FramePayload::Equity(frame),
            }),
            Err(e) => sink.render_error(scheduler, &e),
        }
    }

    /// # Summary
    /// 打开视图：立即渲染一帧，再启动刷新调度器从下一个字段继续。
    ///
    /// # Logic
    /// 1. 取字段序列的第一个字段（为空时为 `Close`），序列左移一位后调用 `start`。
    /// 2. 启动成功后以 tick 0 渲染该字段。
    pub fn open(
        &self,
        mut options: SchedulerOptions,
        sink: Arc<dyn RenderSink>,
    ) -> Result<(), SchedulerError> {
        let first = options
            .cycle
            .first()
            .cloned()
            .unwrap_or_else(|| DEFAULT_FIELD.to_string());
        if !options.cycle.is_empty() {
            options.cycle.rotate_left(1);
        }
        let name = options.name.clone();
        self.start(options, sink.clone())?;
        self.render_now(&name, &first, sink.as_ref());
        Ok(())
    }

    /// # Summary
    /// 启动刷新调度器。
    ///
    /// # Logic
    /// 每次 tick 取字段序列中的下一个字段（序列为空时使用 `Close`）并重算整帧。
    ///
    /// # Arguments
    /// * `options`: 调度参数。
    /// * `sink`: 渲染协作者。
    pub fn start(
        &self,
        options: SchedulerOptions,
        sink: Arc<dyn RenderSink>,
    ) -> Result<(), SchedulerError> {
        let state = self.state.clone();
        self.schedulers.spawn(options, sink, move |tick| {
            let field = tick.field.as_deref().unwrap_or(DEFAULT_FIELD);
            let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
            state.frame(field).map(|f| Some(FramePayload::Equity(f)))
        })
    }

    /// 停止指定调度器，返回其是否存在。
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
