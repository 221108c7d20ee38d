//! 手动登录并保存登录态
//!
//! 打开登录页，等操作者在浏览器中完成登录后按回车，把 cookie 和 localStorage
//! 写入登录态文件，供 pj-assist 复用。

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pj_assistant::browser::{self, BrowserOrigin};
use pj_assistant::{AppConfig, StorageState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pj-login", version, about = "手动登录并保存登录态")]
struct Cli {
    /// 配置文件路径
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// 登录态输出路径
    #[arg(long, default_value = "storage_state.json")]
    storage: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)
        .with_context(|| format!("加载配置失败: {}", cli.config.display()))?;

    let (mut browser, page, origin) = browser::open_browser(&config.browser)
        .await
        .context("获取浏览器失败")?;

    page.goto(config.login_url.as_str())
        .await
        .with_context(|| format!("打开登录页失败: {}", config.login_url))?;
    info!("🌐 已打开登录页: {}", config.login_url);
    info!("👉 请在浏览器中完成登录，然后回到这里按回车");

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("读取输入失败")?;

    let state = StorageState::capture(&page).await.context("读取登录态失败")?;
    state.save(&cli.storage).context("保存登录态失败")?;
    info!("✅ 登录态已保存: {}", cli.storage.display());

    if origin == BrowserOrigin::Launched {
        let _ = browser.close().await;
        let _ = browser.wait().await;
    }
    Ok(())
}
