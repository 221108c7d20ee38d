//! 评教助手 - 编排层
//!
//! ## 职责
//!
//! 1. **资源管理**：唯一持有 Browser 和 JsExecutor 的模块
//! 2. **登录态恢复**：把 pj-login 保存的 cookie 和 localStorage 写回浏览器
//! 3. **失败现场**：出错时保存整页截图并记录当前地址
//! 4. **向下委托**：具体流程交给 list_processor

use std::path::{Path, PathBuf};
use std::time::Duration;

use chromiumoxide::Browser;
use tracing::{debug, error, info, warn};

use crate::browser::{self, BrowserOrigin, StorageState};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{Dom, JsExecutor};
use crate::orchestrator::list_processor::{assist_all_pages, RunStats};
use crate::workflow::Session;

/// 应用主结构
pub struct App {
    config: AppConfig,
    browser: Browser,
    origin: BrowserOrigin,
    executor: JsExecutor,
    screenshot_dir: PathBuf,
}

impl App {
    /// 初始化应用：获取浏览器并恢复登录态
    pub async fn initialize(
        config: AppConfig,
        storage_path: impl AsRef<Path>,
        log_dir: impl AsRef<Path>,
    ) -> AppResult<Self> {
        let (browser, page, origin) = browser::open_browser(&config.browser).await?;

        let storage_path = storage_path.as_ref();
        if storage_path.exists() {
            let state = StorageState::load(storage_path)?;
            state.apply(&page).await?;
            info!("✓ 已恢复登录态: {}", storage_path.display());
        } else {
            warn!(
                "⚠️ 未找到登录态文件 {}，请先运行 pj-login",
                storage_path.display()
            );
        }

        let executor = JsExecutor::new(page)
            .with_slow_mo(Duration::from_millis(config.browser.slow_mo_ms));

        Ok(Self {
            config,
            browser,
            origin,
            executor,
            screenshot_dir: log_dir.as_ref().join("screenshots"),
        })
    }

    /// 运行应用主逻辑，失败时保存现场
    pub async fn run(&self) -> AppResult<RunStats> {
        let session = Session::new(&self.executor, &self.config)?;
        let result = assist_all_pages(&session).await;
        if let Err(e) = &result {
            self.capture_failure(e).await;
        }
        result
    }

    async fn capture_failure(&self, err: &AppError) {
        let url = self.executor.current_url().await.unwrap_or_default();
        let path = self.screenshot_dir.join(format!(
            "error_{}.png",
            chrono::Local::now().format("%Y%m%d_%H%M%S")
        ));

        let saved = match std::fs::create_dir_all(&self.screenshot_dir) {
            Ok(()) => self.executor.screenshot(&path).await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match saved {
            Ok(()) => error!(
                "❌ 运行失败: {}\n   截图: {}\n   页面: {}",
                err,
                path.display(),
                url
            ),
            Err(reason) => error!(
                "❌ 运行失败: {}\n   截图保存失败: {}\n   页面: {}",
                err, reason, url
            ),
        }
    }

    /// 结束运行；连接的浏览器保持打开
    pub async fn shutdown(mut self) {
        if self.origin != BrowserOrigin::Launched {
            return;
        }
        if let Err(e) = self.browser.close().await {
            debug!("关闭浏览器失败: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("等待浏览器退出失败: {}", e);
        }
    }
}
