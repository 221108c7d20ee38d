use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pj_assistant::utils::logging::{self, log_startup, print_final_stats};
use pj_assistant::{App, AppConfig};

/// 课程评教自动填写
#[derive(Debug, Parser)]
#[command(name = "pj-assist", version, about)]
struct Cli {
    /// 配置文件路径
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// 登录态文件路径（由 pj-login 生成）
    #[arg(long, default_value = "storage_state.json")]
    storage: PathBuf,

    /// 日志目录
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 先校验配置，再做任何浏览器操作
    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("加载配置失败: {}", cli.config.display()))?;

    let log_file = logging::init(&cli.log_dir).context("初始化日志失败")?;
    log_startup(&config, &log_file);

    let app = App::initialize(config, &cli.storage, &cli.log_dir)
        .await
        .context("初始化浏览器失败")?;

    let result = app.run().await;
    app.shutdown().await;

    let stats = result.context("评教流程失败")?;
    print_final_stats(stats.submitted, stats.pages, &log_file);

    Ok(())
}
