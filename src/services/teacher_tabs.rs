//! 教师标签识别 - 业务能力层
//!
//! 一门课可能有多位任课教师，每位教师一组题目，通过弹窗顶部的标签切换。
//! 标签有两种来源：
//! - 显式：带唯一标识属性（默认 `data-gh`）的标签元素
//! - 启发式：弹窗顶部一排短中文名字样的按钮

use std::collections::HashSet;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, info};

use crate::config::Heuristics;
use crate::error::ConfigError;
use crate::infrastructure::{Dom, ElementSummary, Locator, Scope, Selector};
use crate::services::wait::Poll;

/// 一个教师标签
#[derive(Debug, Clone, PartialEq)]
pub struct TeacherTab {
    /// 显式标签的标识；启发式标签没有
    pub id: Option<String>,
    pub name: String,
    pub target: Locator,
}

/// 启发式标签的筛选规则（已编译）
#[derive(Debug, Clone)]
pub struct TabRules {
    pub pattern: Regex,
    pub skip_words: HashSet<String>,
    pub max_offset_px: f64,
}

impl TabRules {
    pub fn from_heuristics(heuristics: &Heuristics) -> Result<Self, ConfigError> {
        let pattern =
            Regex::new(&heuristics.tab_name_pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: heuristics.tab_name_pattern.clone(),
                source,
            })?;
        Ok(Self {
            pattern,
            skip_words: heuristics.tab_skip_words.iter().cloned().collect(),
            max_offset_px: heuristics.tab_max_offset_px,
        })
    }
}

/// 启发式候选的筛选结果
#[derive(Debug, Clone, PartialEq)]
pub struct TabCandidate {
    /// 在候选定位结果中的下标
    pub index: usize,
    pub name: String,
    pub x: f64,
}

/// 从候选元素中挑出教师标签
///
/// 文字需匹配模式且不在排除列表中；没有布局框的跳过，纵向位置超出弹窗顶部
/// `max_offset_px` 的视为题目选项。
/// 同名只保留第一个，最后按横坐标从左到右稳定排序。
pub fn select_heuristic_tabs(
    candidates: &[ElementSummary],
    container_top: f64,
    rules: &TabRules,
) -> Vec<TabCandidate> {
    let mut seen = HashSet::new();
    let mut selected = Vec::new();

    for candidate in candidates {
        let text = candidate.text.replace('\n', " ");
        let text = text.trim();
        if text.is_empty() || !rules.pattern.is_match(text) {
            continue;
        }
        if rules.skip_words.contains(text) || seen.contains(text) {
            continue;
        }
        // 没有布局框说明元素未渲染，不可能是可点击的标签
        let Some(bbox) = candidate.bbox else {
            continue;
        };
        if bbox.y > container_top + rules.max_offset_px {
            continue;
        }

        seen.insert(text.to_string());
        selected.push(TabCandidate {
            index: candidate.index,
            name: text.to_string(),
            x: bbox.x,
        });
    }

    selected.sort_by(|a, b| a.x.total_cmp(&b.x));
    selected
}

/// 显式标签选择器：配置的标签选择器加上标识属性
pub fn explicit_tab_selector(tabs: &str, id_attribute: &str) -> Selector {
    Selector::parse(tabs).refine(&format!("[{id_attribute}]"))
}

/// 读取显式标签
pub async fn explicit_tabs<D: Dom>(
    dom: &D,
    scope: &Scope,
    tabs_selector: &str,
    id_attribute: &str,
) -> Vec<TeacherTab> {
    let all = scope.locator(explicit_tab_selector(tabs_selector, id_attribute));
    let summaries = match dom.describe_all(&all, Some(id_attribute)).await {
        Ok(summaries) => summaries,
        Err(e) => {
            debug!("读取显式教师标签失败: {}", e);
            return Vec::new();
        }
    };

    summaries
        .into_iter()
        .filter_map(|s| {
            let id = s.attribute.filter(|id| !id.is_empty())?;
            let target = scope
                .locator(
                    Selector::parse(tabs_selector).refine(&format!(r#"[{id_attribute}="{id}"]"#)),
                )
                .first();
            Some(TeacherTab {
                id: Some(id),
                name: s.text.trim().to_string(),
                target,
            })
        })
        .collect()
}

/// 在弹窗所在作用域中按启发式规则找教师标签
///
/// 标签行可能渲染在弹窗元素之外，所以在整个作用域里找，以弹窗顶边为基准筛选。
pub async fn heuristic_tabs<D: Dom>(
    dom: &D,
    scope: &Scope,
    modal: &Locator,
    rules: &TabRules,
) -> Vec<TeacherTab> {
    let top = match dom.bounding_box(modal).await {
        Ok(Some(bbox)) => bbox.y,
        _ => 0.0,
    };

    let all = scope.locator("button, a, span");
    let summaries = match dom.describe_all(&all, None).await {
        Ok(summaries) => summaries,
        Err(e) => {
            debug!("读取候选标签失败: {}", e);
            return Vec::new();
        }
    };

    let selected = select_heuristic_tabs(&summaries, top, rules);
    if !selected.is_empty() {
        let names: Vec<&str> = selected.iter().map(|c| c.name.as_str()).collect();
        info!("教师标签(启发式) {} 个: {:?}", selected.len(), names);
    }

    selected
        .into_iter()
        .map(|c| TeacherTab {
            id: None,
            name: c.name,
            target: all.nth(c.index),
        })
        .collect()
}

/// class 是否带有“已选中”样式
pub fn tab_looks_active(class: &str) -> bool {
    let class = class.to_lowercase();
    ["active", "btn-primary", "btn-success", "btn-info", "selected"]
        .iter()
        .any(|token| class.contains(token))
}

/// 标签当前是否处于选中状态：aria-selected、自身 class 或最近的 li/div 祖先 class
pub async fn is_tab_active<D: Dom>(dom: &D, tab: &Locator) -> bool {
    if let Ok(Some(selected)) = dom.attribute(tab, "aria-selected").await {
        if selected.eq_ignore_ascii_case("true") {
            return true;
        }
    }
    if let Ok(Some(class)) = dom.attribute(tab, "class").await {
        if tab_looks_active(&class) {
            return true;
        }
    }
    let holder = tab.ancestor("li, div");
    matches!(dom.attribute(&holder, "class").await, Ok(Some(class)) if tab_looks_active(&class))
}

/// 尽力等待标签切换为选中状态
pub async fn wait_tab_active<D: Dom>(dom: &D, tab: &Locator, timeout: Duration) -> bool {
    Poll::new(timeout)
        .settle("教师标签激活", || is_tab_active(dom, tab))
        .await
}
