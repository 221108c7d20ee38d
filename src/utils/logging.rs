//! 日志工具模块
//!
//! 初始化控制台 + 文件双通道日志，并提供启动、结束时的横幅输出

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::AppConfig;

/// 文件日志的后台写入线程，进程结束前必须保持存活
static GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// 初始化日志
///
/// # 参数
/// - `log_dir`: 日志目录，每次运行写入一个 `run_<时间戳>.log`
///
/// # 返回
/// 返回本次运行的日志文件路径
pub fn init(log_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let log_dir = log_dir.as_ref();
    std::fs::create_dir_all(log_dir)?;

    let file_name = format!("run_{}.log", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let file_appender = tracing_appender::rolling::never(log_dir, &file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .try_init()?;

    Ok(log_dir.join(file_name))
}

/// 记录程序启动信息
pub fn log_startup(config: &AppConfig, log_file: &Path) {
    info!("{}", "=".repeat(60));
    info!("🚀 评教助手启动");
    info!("📋 课程列表: {}", config.list_url);
    info!(
        "📊 提交方式: {}",
        if config.auto_submit { "自动" } else { "手动" }
    );
    info!(
        "⏱️ 随机延迟: {}-{}ms",
        config.delays_ms.min, config.delays_ms.max
    );
    info!("📝 日志文件: {}", log_file.display());
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `submitted`: 提交的课程数
/// - `pages`: 访问的页数
/// - `log_file`: 日志文件路径
pub fn print_final_stats(submitted: usize, pages: usize, log_file: &Path) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 已提交: {} 门课程", submitted);
    info!("📄 访问页数: {}", pages);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file.display());
}
