//! 等待引擎 - 业务能力层
//!
//! 目标站点没有可订阅的完成事件，所有“等页面变化”都归结为同一个有界轮询原语 [`Poll`]。
//! 轮询期间需要顺带做的事（例如关掉提示框）写在探测闭包里。

use std::cell::RefCell;
use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::{BrowserError, BrowserResult, FlowError};
use crate::infrastructure::{Dom, Locator, Scope};
use crate::services::dialogs::dismiss_success_dialog;
use crate::services::pacing::Pacer;
use crate::services::element_locator::{find_modal, find_table};
use crate::services::scope_resolver::resolve_scope_fast;
use crate::services::teacher_tabs::explicit_tab_selector;

/// 默认轮询间隔
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);
/// 心跳日志间隔
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);

/// 有界轮询
#[derive(Debug, Clone)]
pub struct Poll {
    timeout: Option<Duration>,
    interval: Duration,
    heartbeat: Duration,
    hint: Option<String>,
}

impl Poll {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            interval: POLL_INTERVAL,
            heartbeat: HEARTBEAT_INTERVAL,
            hint: None,
        }
    }

    /// 不设上限，一直等到条件成立
    pub fn unbounded() -> Self {
        Self {
            timeout: None,
            ..Self::new(Duration::ZERO)
        }
    }

    /// 0 秒表示不设上限
    pub fn from_secs_or_unbounded(secs: u64) -> Self {
        if secs == 0 {
            Self::unbounded()
        } else {
            Self::new(Duration::from_secs(secs))
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// 心跳日志里附带给操作者的提示
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// 反复执行 `probe` 直到返回 `Some`，超时返回 [`FlowError::WaitTimeout`]
    pub async fn until<T, F, Fut>(&self, what: &str, mut probe: F) -> Result<T, FlowError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Option<T>>,
    {
        let start = Instant::now();
        let mut last_beat = start;

        loop {
            if let Some(value) = probe().await {
                return Ok(value);
            }

            let elapsed = start.elapsed();
            if let Some(timeout) = self.timeout {
                if elapsed >= timeout {
                    return Err(FlowError::WaitTimeout {
                        what: what.to_string(),
                        waited_ms: elapsed.as_millis() as u64,
                    });
                }
            }

            if last_beat.elapsed() >= self.heartbeat {
                last_beat = Instant::now();
                match &self.hint {
                    Some(hint) => info!("⏳ 仍在等待{what} (已等待 {}s)... {hint}", elapsed.as_secs()),
                    None => info!("⏳ 仍在等待{what} (已等待 {}s)...", elapsed.as_secs()),
                }
            }

            sleep(self.interval).await;
        }
    }

    /// 尽力等待：超时不算错误，返回条件是否成立
    pub async fn settle<F, Fut>(&self, what: &str, mut probe: F) -> bool
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        self.until(what, || {
            let fut = probe();
            async move { fut.await.then_some(()) }
        })
        .await
        .is_ok()
    }
}

/// 要求元素在限定时间内可见
///
/// 失败时返回带定位器描述的 [`BrowserError::ActionTimeout`]，便于排查。
pub async fn expect_visible<D: Dom>(dom: &D, target: &Locator, timeout: Duration) -> BrowserResult<()> {
    let visible = Poll::new(timeout)
        .settle("元素可见", || async { dom.is_visible(target).await.unwrap_or(false) })
        .await;
    if visible {
        Ok(())
    } else {
        Err(BrowserError::timeout("等待可见", target, timeout.as_millis() as u64))
    }
}

/// 要求元素在限定时间内隐藏或消失
pub async fn expect_hidden<D: Dom>(
    dom: &D,
    target: &Locator,
    what: &str,
    timeout: Duration,
) -> Result<(), FlowError> {
    Poll::new(timeout)
        .until(what, || async {
            match dom.is_visible(target).await {
                Ok(true) => None,
                _ => Some(()),
            }
        })
        .await
}

/// 表格出现的等待时长
pub const TABLE_TIMEOUT: Duration = Duration::from_secs(30);
/// 弹窗出现的等待时长
pub const MODAL_TIMEOUT: Duration = Duration::from_secs(30);
/// 显式教师标签出现的等待时长
pub const EXPLICIT_TABS_TIMEOUT: Duration = Duration::from_secs(5);
/// 进度文字变化的等待时长
pub const PROGRESS_TIMEOUT: Duration = Duration::from_secs(5);
/// 表格可见性检查的时长
const TABLE_VISIBLE_TIMEOUT: Duration = Duration::from_secs(1);

/// 等待课程表格出现并可见
///
/// 轮询期间每次都重新解析作用域。超时后再做最后一次显式检查，
/// 失败时返回带定位器描述的浏览器错误。
pub async fn wait_for_table<D: Dom>(dom: &D, config: &AppConfig) -> BrowserResult<(Scope, Locator)> {
    let last_url = RefCell::new(String::new());

    let found = Poll::new(TABLE_TIMEOUT)
        .until("课程表格", || async {
            if let Ok(url) = dom.current_url().await {
                let mut last = last_url.borrow_mut();
                if *last != url {
                    info!("当前页面: {}", url);
                    *last = url;
                }
            }

            let scope = resolve_scope_fast(dom, config).await;
            let table = find_table(dom, &scope, config).await?;
            expect_visible(dom, &table, TABLE_VISIBLE_TIMEOUT)
                .await
                .ok()
                .map(|()| (scope, table))
        })
        .await;

    match found {
        Ok(hit) => Ok(hit),
        Err(e) => {
            debug!("{}，做最后一次检查", e);
            let scope = resolve_scope_fast(dom, config).await;
            let table = match find_table(dom, &scope, config).await {
                Some(table) => table,
                None => scope.locator(&config.selectors.table).first(),
            };
            expect_visible(dom, &table, TABLE_VISIBLE_TIMEOUT).await?;
            Ok((scope, table))
        }
    }
}

/// 等待评教弹窗出现，超时即失败
pub async fn wait_for_modal<D: Dom>(dom: &D, config: &AppConfig) -> Result<(Scope, Locator), FlowError> {
    Poll::new(MODAL_TIMEOUT)
        .until("评教弹窗", || find_modal(dom, config))
        .await
        .map_err(|_| FlowError::ModalNotFound {
            selector: config.selectors.modal.clone(),
        })
}

/// 尽力等待显式教师标签出现
pub async fn wait_explicit_tabs<D: Dom>(dom: &D, scope: &Scope, config: &AppConfig) -> bool {
    let tabs = scope.locator(explicit_tab_selector(
        &config.selectors.teacher_tabs,
        &config.heuristics.tab_id_attribute,
    ));
    Poll::new(EXPLICIT_TABS_TIMEOUT)
        .settle("显式教师标签", || async {
            matches!(dom.count(&tabs).await, Ok(n) if n > 0)
        })
        .await
}

/// 读取弹窗中的进度文字（如“已做：10/11”）
pub async fn read_progress<D: Dom>(dom: &D, modal: &Locator, config: &AppConfig) -> Option<String> {
    let done = modal.locator(&config.selectors.done_text).first();
    match dom.count(&done).await {
        Ok(n) if n > 0 => dom.inner_text(&done).await.ok().map(|t| t.trim().to_string()),
        _ => None,
    }
}

/// 尽力等待进度文字发生变化；`before` 为空时只要出现进度文字即可
pub async fn wait_progress_changed<D: Dom>(
    dom: &D,
    modal: &Locator,
    config: &AppConfig,
    before: Option<&str>,
) -> bool {
    Poll::new(PROGRESS_TIMEOUT)
        .settle("进度变化", || async {
            match read_progress(dom, modal, config).await {
                Some(now) => before.map_or(true, |b| b != now),
                None => false,
            }
        })
        .await
}

/// 手动提交模式：等待操作者提交后弹窗关闭
///
/// 每一轮顺带关掉提交成功提示框；查询出错视为弹窗已被销毁。
/// `manual_submit_max_wait_s` 为 0 时不设上限。
pub async fn wait_modal_closed<D: Dom>(
    dom: &D,
    config: &AppConfig,
    pacer: &Pacer,
    modal: &Locator,
) -> Result<(), FlowError> {
    let max_wait = config.manual_submit_max_wait_s;
    Poll::from_secs_or_unbounded(max_wait)
        .with_hint("请在页面里点【提交】并等待弹窗关闭")
        .until("弹窗关闭", || async {
            match dom.is_visible(modal).await {
                Ok(true) => {
                    dismiss_success_dialog(dom, config, pacer).await;
                    None
                }
                Ok(false) | Err(_) => Some(()),
            }
        })
        .await
        .map_err(|_| FlowError::ManualSubmitTimeout { waited_s: max_wait })
}
