//! 点击重试阶梯
//!
//! 1. 正常点击（等待可见、可用、未遮挡），2s
//! 2. 滚动 + 悬停后强制点击，2s
//! 3. 元素自身的 click()，失败时派发合成事件
//!
//! 只有上一级“超时”才升级，其他错误直接向上抛出。

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::BrowserResult;
use crate::infrastructure::{ClickMode, Dom, Locator};

/// 前两级点击各自的超时
pub const CLICK_TIMEOUT: Duration = Duration::from_millis(2_000);

/// 按重试阶梯点击元素
pub async fn click<D: Dom>(dom: &D, target: &Locator) -> BrowserResult<()> {
    match dom.click(target, ClickMode::Actionable, CLICK_TIMEOUT).await {
        Ok(()) => return Ok(()),
        Err(e) if e.is_timeout() => {
            warn!("点击重试: force ({})", target);
            debug!("正常点击失败: {}", e);
        }
        Err(e) => return Err(e),
    }

    // 两者都是尽力而为
    if let Err(e) = dom.scroll_into_view(target).await {
        debug!("滚动失败，忽略: {}", e);
    }
    if let Err(e) = dom.hover(target).await {
        debug!("悬停失败，忽略: {}", e);
    }

    match dom.click(target, ClickMode::Forced, CLICK_TIMEOUT).await {
        Ok(()) => return Ok(()),
        Err(e) if e.is_timeout() => {
            warn!("点击重试: js ({})", target);
            debug!("强制点击失败: {}", e);
        }
        Err(e) => return Err(e),
    }

    dom.dispatch_click(target).await
}
