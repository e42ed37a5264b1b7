use crate::cycle::FieldCycle;
use crate::error::SchedulerError;
use dashmap::DashMap;
use quoteview_core::render::entity::{FramePayload, RenderFrame};
use quoteview_core::render::port::RenderSink;
use quoteview_core::series::error::AnalyticsError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::AbortHandle;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// # Summary
/// 调度器构造参数。
#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    // 调度器名称，在同一会话内唯一
    pub name: String,
    // 每次 tick 之间的间隔（毫秒）
    pub interval_ms: u64,
    // 轮换的字段序列，可为空
    pub cycle: Vec<String>,
}

impl SchedulerOptions {
    pub fn new(name: impl Into<String>, interval_ms: u64, cycle: Vec<String>) -> Self {
        Self {
            name: name.into(),
            interval_ms,
            cycle,
        }
    }
}

/// # Summary
/// 单次 tick 的上下文，传给 tick 处理函数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    // 所属调度器
    pub scheduler: String,
    // 序号，从 1 开始
    pub seq: u64,
    // 本次轮换到的字段，字段序列为空时为 None
    pub field: Option<String>,
}

/// # Summary
/// 周期调度器：以固定间隔驱动 tick 处理函数，并把结果推送给渲染协作者。
///
/// # Invariants
/// - 每个调度器拥有独立的 tokio 协程与定时器，不共享全局 tick。
/// - 同一调度器的 tick 严格按顺序执行，前一次完成后才会开始下一次。
/// - 单次 tick 失败只会进入渲染错误通道，调度器继续运行。
/// - 不做补偿或合并：错过的 tick 按 tokio 默认的 Burst 语义依次补发。
pub struct UpdateScheduler;

impl UpdateScheduler {
    /// # Summary
    /// 启动一个调度器。
    ///
    /// # Logic
    /// 1. 校验间隔大于 0。
    /// 2. 在当前 tokio 运行时上 spawn 协程，第一次 tick 在一个间隔之后触发。
    /// 3. 每次 tick：检查停止标记，推进字段序列，调用 `on_tick`。
    /// 4. `Ok(Some(payload))` 推送渲染帧，`Ok(None)` 不渲染，`Err` 推送到错误通道。
    ///
    /// # Arguments
    /// * `options`: 名称、间隔与字段序列。
    /// * `sink`: 渲染协作者。
    /// * `on_tick`: tick 处理函数，在 tick 内同步运行到结束。
    ///
    /// # Returns
    /// 成功返回可停止的句柄。必须在 tokio 运行时上下文中调用。
    pub fn spawn<F>(
        options: SchedulerOptions,
        sink: Arc<dyn RenderSink>,
        mut on_tick: F,
    ) -> Result<SchedulerHandle, SchedulerError>
    where
        F: FnMut(&Tick) -> Result<Option<FramePayload>, AnalyticsError> + Send + 'static,
    {
        if options.interval_ms == 0 {
            return Err(SchedulerError::InvalidInterval(options.name));
        }
        let period = Duration::from_millis(options.interval_ms);
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = stopped.clone();
        let name = options.name.clone();
        let mut cycle = FieldCycle::new(options.cycle);

        let task = tokio::spawn(async move {
            info!("Scheduler {} started with interval {:?}", name, period);
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            let mut seq: u64 = 0;
            loop {
                interval.tick().await;
                if flag.load(Ordering::Acquire) {
                    break;
                }
                seq += 1;
                let tick = Tick {
                    scheduler: name.clone(),
                    seq,
                    field: cycle.advance().map(str::to_string),
                };
                match on_tick(&tick) {
                    Ok(Some(payload)) => sink.render(RenderFrame {
                        scheduler: name.clone(),
                        tick: seq,
                        payload,
                    }),
                    Ok(None) => debug!("Scheduler {} tick {} rendered nothing", name, seq),
                    Err(e) => {
                        warn!("Scheduler {} tick {} failed: {}", name, seq, e);
                        sink.render_error(&name, &e);
                    }
                }
            }
            debug!("Scheduler {} loop exited", name);
        });

        Ok(SchedulerHandle {
            name: options.name,
            stopped,
            abort: task.abort_handle(),
        })
    }
}

/// # Summary
/// 运行中调度器的控制句柄。
///
/// # Invariants
/// - `stop` 幂等，重复调用不会报错。
/// - 停止后不会再产生任何渲染，最迟在下一个 tick 边界生效。
/// - 丢弃句柄不会停止调度器，生命周期由持有它的会话管理。
#[derive(Debug)]
pub struct SchedulerHandle {
    name: String,
    // 停止标记，tick 开始前检查
    stopped: Arc<AtomicBool>,
    // 协程中止句柄
    abort: AbortHandle,
}

impl SchedulerHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// # Summary
    /// 停止调度器。
    ///
    /// # Logic
    /// 1. 置位停止标记，已停止则直接返回。
    /// 2. 中止后台协程，使其在下一个 await 点退出。
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }
        self.abort.abort();
        info!("Scheduler {} stopped", self.name);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire) || self.abort.is_finished()
    }
}

/// # Summary
/// 视图会话持有的调度器注册表。
///
/// # Invariants
/// - 同名调度器同一时刻最多运行一个。
/// - 注册表被丢弃时停止其中所有调度器。
#[derive(Default)]
pub struct SchedulerRegistry {
    // Key 为调度器名称
    running: DashMap<String, SchedulerHandle>,
}

impl SchedulerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Summary
    /// 启动调度器并登记。
    ///
    /// # Logic
    /// 1. 若同名调度器仍在运行，返回 `AlreadyRunning`。
    /// 2. 否则通过 `UpdateScheduler::spawn` 启动，替换掉已停止的旧句柄。
    pub fn spawn<F>(
        &self,
        options: SchedulerOptions,
        sink: Arc<dyn RenderSink>,
        on_tick: F,
    ) -> Result<(), SchedulerError>
    where
        F: FnMut(&Tick) -> Result<Option<FramePayload>, AnalyticsError> + Send + 'static,
    {
        if let Some(existing) = self.running.get(&options.name)
            && !existing.is_stopped()
        {
            return Err(SchedulerError::AlreadyRunning(options.name));
        }
        let handle = UpdateScheduler::spawn(options, sink, on_tick)?;
        self.running.insert(handle.name().to_string(), handle);
        Ok(())
    }

    /// 停止指定调度器，返回该名称是否存在。
    pub fn stop(&self, name: &str) -> bool {
        match self.running.remove(name) {
            Some((_, handle)) => {
                handle.stop();
                true
            }
            None => false,
        }
    }

    pub fn stop_all(&self) {
        for entry in self.running.iter() {
            entry.value().stop();
        }
        self.running.clear();
    }

    pub fn is_running(&self, name: &str) -> bool {
        self.running
            .get(name)
            .map(|h| !h.is_stopped())
            .unwrap_or(false)
    }

    /// 运行中调度器的名称，按字母序。
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .running
            .iter()
            .filter(|e| !e.value().is_stopped())
            .map(|e| e.key().clone())
            .collect();
        names.sort();
        names
    }
}

impl Drop for SchedulerRegistry {
    fn drop(&mut self) {
        self.stop_all();
    }
}
