use thiserror::Error;

/// # Summary
/// 调度层错误类型。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    // 间隔必须为正数
    #[error("Invalid interval for scheduler {0}: must be greater than zero")]
    InvalidInterval(String),
    // 同名调度器仍在运行
    #[error("Scheduler already running: {0}")]
    AlreadyRunning(String),
}
