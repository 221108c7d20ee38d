//! 元素定位 - 业务能力层
//!
//! 门户之间的标记并不统一，每类目标都是“首选选择器 + 若干兜底”的候选列表，
//! 统一交给 [`first_match`] 按顺序尝试。这里的函数都不报错：查询失败等同于没找到。

use tracing::{debug, info};

use crate::config::{AppConfig, Heuristics};
use crate::infrastructure::{Dom, Locator, Scope};

/// 候选命中的条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// 文档中存在即可
    Attached,
    /// 第一个匹配元素可见
    Visible,
}

/// 依次尝试候选定位器，返回第一个命中者（已收窄到第一个元素）
pub async fn first_match<D, I>(dom: &D, candidates: I, presence: Presence) -> Option<Locator>
where
    D: Dom,
    I: IntoIterator<Item = Locator>,
{
    for candidate in candidates {
        let first = candidate.first();
        let hit = match presence {
            Presence::Attached => dom.count(&candidate).await.map(|n| n > 0),
            Presence::Visible => dom.is_visible(&first).await,
        };
        match hit {
            Ok(true) => return Some(first),
            Ok(false) => {}
            Err(e) => debug!("候选查询失败，跳过: {} ({})", candidate, e),
        }
    }
    None
}

/// 带“评价”文字的按钮或链接
pub fn rate_affordance(keyword: &str) -> String {
    format!(r#"button:has-text("{keyword}"), a:has-text("{keyword}")"#)
}

/// 在作用域内找课程表格
///
/// 1. 配置的表格选择器
/// 2. 第一个“评价”按钮所在的表格
/// 3. 文字中含“评价”的任意表格
pub async fn find_table<D: Dom>(dom: &D, scope: &Scope, config: &AppConfig) -> Option<Locator> {
    let keyword = &config.heuristics.rate_keyword;
    let candidates = [
        scope.locator(&config.selectors.table),
        scope
            .locator(rate_affordance(keyword).as_str())
            .first()
            .ancestor("table"),
        scope.locator(format!(r#"table:has-text("{keyword}")"#).as_str()),
    ];
    first_match(dom, candidates, Presence::Attached).await
}

/// 在所有作用域中找第一个可见的评教弹窗
pub async fn find_modal<D: Dom>(dom: &D, config: &AppConfig) -> Option<(Scope, Locator)> {
    let scopes = match dom.scopes().await {
        Ok(scopes) => scopes,
        Err(e) => {
            debug!("读取 frame 列表失败: {}", e);
            vec![Scope::page()]
        }
    };

    let selectors: Vec<&String> = std::iter::once(&config.selectors.modal)
        .chain(config.heuristics.modal_candidates.iter())
        .collect();

    for scope in scopes {
        for selector in &selectors {
            let candidate = scope.locator(*selector);
            if let Some(modal) = first_match(dom, [candidate], Presence::Visible).await {
                info!("✓ 找到评教弹窗 scope={} selector={}", scope, selector);
                return Some((scope, modal));
            }
        }
    }
    None
}

/// 表格中第一个待评价按钮
pub async fn find_pending<D: Dom>(dom: &D, table: &Locator, config: &AppConfig) -> Option<Locator> {
    first_match(
        dom,
        [table.locator(&config.selectors.pending_button)],
        Presence::Attached,
    )
    .await
}

/// 表格中待评价按钮的数量，查询失败按 0 处理
pub async fn count_pending<D: Dom>(dom: &D, table: &Locator, config: &AppConfig) -> usize {
    dom.count(&table.locator(&config.selectors.pending_button))
        .await
        .unwrap_or(0)
}

/// 下一页按钮是否处于禁用状态
pub fn is_pager_disabled(class: &str, parent_class: &str, aria_disabled: &str) -> bool {
    class.contains("disabled")
        || parent_class.contains("disabled")
        || aria_disabled.eq_ignore_ascii_case("true")
}

/// 找到可用的下一页按钮；不存在或已禁用时返回 None（即最后一页）
pub async fn find_next_page<D: Dom>(
    dom: &D,
    scope: &Scope,
    heuristics: &Heuristics,
) -> Option<Locator> {
    let by_text = heuristics
        .next_page_texts
        .iter()
        .flat_map(|t| [format!(r#"a:has-text("{t}")"#), format!(r#"button:has-text("{t}")"#)])
        .collect::<Vec<_>>()
        .join(", ");

    let mut candidates = vec![scope.locator(&heuristics.next_page_selector)];
    if !by_text.is_empty() {
        candidates.push(scope.locator(by_text.as_str()));
    }
    let next = first_match(dom, candidates, Presence::Attached).await?;

    let class = dom.attribute(&next, "class").await.ok().flatten().unwrap_or_default();
    let aria = dom
        .attribute(&next, "aria-disabled")
        .await
        .ok()
        .flatten()
        .unwrap_or_default();
    let parent_class = dom
        .attribute(&next.parent(), "class")
        .await
        .ok()
        .flatten()
        .unwrap_or_default();

    if is_pager_disabled(&class, &parent_class, &aria) {
        info!("下一页按钮已禁用，已是最后一页");
        return None;
    }
    Some(next)
}
