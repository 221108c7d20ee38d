use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, error, info};

use crate::config::BrowserSettings;
use crate::error::{BrowserError, BrowserResult};

/// 启动新的浏览器并打开一个空白页面
pub async fn launch_browser(settings: &BrowserSettings) -> BrowserResult<(Browser, Page)> {
    if settings.headless {
        info!("🚀 启动无头浏览器...");
    } else {
        info!("🚀 启动浏览器...");
    }

    let mut builder = BrowserConfig::builder();
    builder = if settings.headless {
        builder.new_headless_mode()
    } else {
        builder.with_head()
    };
    if let Some(executable) = &settings.executable {
        debug!("浏览器路径: {}", executable);
        builder = builder.chrome_executable(executable);
    }

    let config = builder
        .args(vec![
            "--disable-dev-shm-usage", // 防止共享内存不足
            "--no-first-run",
            // 跨域 iframe 留在同一进程，才能出现在页面的帧树和执行上下文里
            "--disable-site-isolation-trials",
            "--disable-features=IsolateOrigins,site-per-process",
        ])
        .build()
        .map_err(|message| {
            error!("配置浏览器失败: {}", message);
            BrowserError::LaunchFailed { message }
        })?;

    let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
        error!("启动浏览器失败: {}", e);
        BrowserError::LaunchFailed {
            message: e.to_string(),
        }
    })?;
    debug!("浏览器启动成功");

    // 在后台处理浏览器事件
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    // 添加短暂延迟以等待浏览器状态同步
    sleep(tokio::time::Duration::from_millis(300)).await;

    let page = browser.new_page("about:blank").await.map_err(|e| {
        error!("创建页面失败: {}", e);
        e
    })?;

    Ok((browser, page))
}
