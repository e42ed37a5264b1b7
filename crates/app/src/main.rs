mod settings;
mod sink;
mod telemetry;

use std::sync::Arc;

use quoteview_core::feed::port::RecordSource;
use quoteview_core::render::port::RenderSink;
use quoteview_feed::csv::CsvSource;
use quoteview_live::companies::CompaniesSession;
use quoteview_live::equity::EquitySession;
use quoteview_live::scheduler::SchedulerOptions;
use tracing::info;

use crate::sink::LogSink;

/// # Summary
/// 应用启动入口，纯粹的装配容器。
/// 每个视图一个会话对象，数据与调度器都归会话所有。
///
/// # Logic
/// 1. 加载配置（可选的 TOML 文件 + `QUOTEVIEW__*` 环境变量）。
/// 2. 初始化日志。
/// 3. 通过 CSV 来源加载行情与公司数据。
/// 4. 构造两个视图会话，立即渲染首帧并启动各自的调度器。
/// 5. 单线程运行时上挂起，等待外部信号后停止全部调度器。
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 加载配置
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| settings::DEFAULT_CONFIG_FILE.to_string());
    let config = settings::load(&path)?;

    // 2. 初始化日志，guard 需存活到进程结束
    let _guard = telemetry::init(&config.log);
    info!("Quoteview starting with config {}", path);

    // 3. 加载数据
    let source = CsvSource::from_config(&config);
    let quotes = source.load_quotes()?;
    let companies = source.load_companies()?;

    // 4. 构造会话，渲染首帧并启动调度器
    let sink: Arc<dyn RenderSink> = Arc::new(LogSink);

    let equity = EquitySession::new(quotes, config.equity.window);
    equity.open(
        SchedulerOptions::new(
            "equity-refresh",
            config.equity.refresh_interval_ms,
            config.equity.fields.clone(),
        ),
        sink.clone(),
    )?;

    let companies = CompaniesSession::new(companies);
    companies.open(
        config.companies.fields.clone(),
        config.companies.field_interval_ms,
        config.companies.rotation_interval_ms,
        sink,
    )?;

    info!(
        "Schedulers running: {:?} {:?}. Waiting for signals...",
        equity.running(),
        companies.running()
    );

    // 5. 挂起等待退出信号
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Stopping schedulers...");
    equity.stop_all();
    companies.stop_all();

    Ok(())
}
