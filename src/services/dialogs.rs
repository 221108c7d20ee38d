//! 提示框处理 - 业务能力层
//!
//! 提交之后门户会弹出“提交成功”之类的提示框，需要再点一次确认才会关闭评教弹窗。

use std::cell::Cell;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::infrastructure::{Dom, Locator, Scope, Selector, TextMatch};
use crate::services::element_locator::{first_match, Presence};
use crate::services::interaction;
use crate::services::pacing::Pacer;
use crate::services::wait::Poll;

/// 自动提交后处理确认框的时长
pub const CONFIRM_WINDOW: Duration = Duration::from_secs(5);
/// 确认框处理的轮询间隔
pub const CONFIRM_INTERVAL: Duration = Duration::from_millis(500);

/// 如果某个作用域里出现了提交成功提示框，点掉它
///
/// 提示框容器取提示文字所在元素本身或其最近的容器祖先。
/// 先找确认文字按钮，再找关闭按钮。返回是否点击了任何按钮。
pub async fn dismiss_success_dialog<D: Dom>(dom: &D, config: &AppConfig, pacer: &Pacer) -> bool {
    let heuristics = &config.heuristics;
    let scopes = dom.scopes().await.unwrap_or_else(|_| vec![Scope::page()]);

    for scope in &scopes {
        for keyword in &heuristics.success_keywords {
            let hit = scope.locator(Selector::parse("*").with_text(TextMatch::Exact(keyword.clone())));
            if !matches!(dom.count(&hit).await, Ok(n) if n > 0) {
                continue;
            }

            let container = hit.first().closest(&heuristics.dialog_containers);
            let root = match dom.count(&container).await {
                Ok(n) if n > 0 => Some(container.first()),
                _ => None,
            };
            let within = |selector: String| match &root {
                Some(root) => root.locator(selector.as_str()),
                None => scope.locator(selector.as_str()),
            };

            for text in &heuristics.confirm_texts {
                let buttons = within(format!(
                    r#"button:visible:has-text("{text}"), a:visible:has-text("{text}")"#
                ));
                if let Some(button) = first_match(dom, [buttons], Presence::Attached).await {
                    info!("关闭提交成功提示框 scope={} button={}", scope, text);
                    return click_quietly(dom, pacer, &button).await;
                }
            }

            for close in &heuristics.dialog_close_selectors {
                let buttons = within(format!("{close}:visible"));
                if let Some(button) = first_match(dom, [buttons], Presence::Attached).await {
                    info!("关闭提交成功提示框 scope={} close={}", scope, close);
                    return click_quietly(dom, pacer, &button).await;
                }
            }
        }
    }
    false
}

/// 点击并随机停顿，失败只记录不返回错误
async fn click_quietly<D: Dom>(dom: &D, pacer: &Pacer, target: &Locator) -> bool {
    match interaction::click(dom, target).await {
        Ok(()) => {
            pacer.pause().await;
            true
        }
        Err(e) => {
            debug!("点击提示框按钮失败: {}", e);
            false
        }
    }
}

/// 确认按钮的候选：配置的选择器加上按确认文字生成的通用按钮
pub fn confirm_selector(config: &AppConfig) -> String {
    let mut parts = vec![config.selectors.success_confirm_button.clone()];
    for text in &config.heuristics.confirm_texts {
        parts.push(format!(
            r#"button:visible:has-text("{text}"), a:visible:has-text("{text}"), span:visible:text-is("{text}")"#
        ));
    }
    parts.join(", ")
}

/// 自动提交后的确认循环
///
/// 每一轮先按回车，再在弹窗作用域和顶层页面中找确认按钮并点击第一个可见的；
/// 点到了或者弹窗已经消失就提前结束。返回是否点击了确认按钮。
pub async fn confirm_after_submit<D: Dom>(
    dom: &D,
    config: &AppConfig,
    pacer: &Pacer,
    modal_scope: &Scope,
    modal: &Locator,
) -> bool {
    let selector = confirm_selector(config);
    let mut check_scopes = vec![modal_scope.clone()];
    if !modal_scope.is_page() {
        check_scopes.push(Scope::page());
    }

    let start = Instant::now();
    let confirmed = Cell::new(false);

    Poll::new(CONFIRM_WINDOW)
        .with_interval(CONFIRM_INTERVAL)
        .settle("确认提示框", || {
            let selector = selector.as_str();
            let check_scopes = &check_scopes;
            let confirmed = &confirmed;
            async move {
                if let Err(e) = dom.press_key("Enter").await {
                    debug!("按回车失败，忽略: {}", e);
                }

                for scope in check_scopes {
                    let candidates = scope.locator(selector).first();
                    if matches!(dom.is_visible(&candidates).await, Ok(true)) {
                        info!("找到确认按钮，点击 scope={}", scope);
                        if click_quietly(dom, pacer, &candidates).await {
                            confirmed.set(true);
                            return true;
                        }
                    }
                }

                !matches!(dom.is_visible(modal).await, Ok(true))
            }
        })
        .await;

    debug!("确认循环结束，用时 {}ms", start.elapsed().as_millis());
    confirmed.get()
}
