//! 题目填写 - 流程层
//!
//! 在当前激活的题目区域里为每道题选一个选项，再填写评语。

use std::sync::OnceLock;
use std::time::Duration;

use rand::seq::SliceRandom;
use regex::Regex;
use tracing::{debug, info};

use crate::error::BrowserResult;
use crate::infrastructure::{Dom, Locator};
use crate::services::wait::{expect_visible, read_progress};
use crate::workflow::session::Session;

/// 题目区域、评语框出现的等待时长
const BLOCK_VISIBLE_TIMEOUT: Duration = Duration::from_secs(5);

/// 一轮填写的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillReport {
    pub total: usize,
    pub filled: usize,
    /// 没有单选框而跳过的题目
    pub skipped: usize,
}

/// 一道题选哪个选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionChoice {
    /// 文字含首选评价的 label
    Preferred(usize),
    /// 没有首选时用最后一个 label
    LastLabel(usize),
    /// 没有 label 时直接勾选最后一个单选框
    LastRadio(usize),
    /// 没有单选框
    Skip,
}

/// 根据 label 文字和单选框数量决定选项
pub fn choose_option(labels: &[String], radio_count: usize, preferred: &str) -> OptionChoice {
    if radio_count == 0 {
        return OptionChoice::Skip;
    }
    let wanted = preferred.to_lowercase();
    if let Some(i) = labels
        .iter()
        .position(|label| label.to_lowercase().contains(&wanted))
    {
        return OptionChoice::Preferred(i);
    }
    if !labels.is_empty() {
        return OptionChoice::LastLabel(labels.len() - 1);
    }
    OptionChoice::LastRadio(radio_count - 1)
}

/// 解析“已做：10/11”之类的进度文字
pub fn parse_progress(text: &str) -> Option<(u32, u32)> {
    static PROGRESS: OnceLock<Option<Regex>> = OnceLock::new();
    let re = PROGRESS
        .get_or_init(|| Regex::new(r"(\d+)\s*/\s*(\d+)").ok())
        .as_ref()?;
    let caps = re.captures(text)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

/// 从评语模板中随机取一条
pub fn pick_comment(pool: &[String]) -> Option<&str> {
    pool.choose(&mut rand::thread_rng()).map(String::as_str)
}

/// 为每道题选一个选项
pub async fn fill_questions<D: Dom>(
    session: &Session<'_, D>,
    questions: &Locator,
) -> BrowserResult<FillReport> {
    let dom = session.dom;
    let total = dom.count(questions).await?;
    let mut report = FillReport {
        total,
        ..Default::default()
    };

    for i in 0..total {
        let question = questions.nth(i);
        let radios = question.locator("input[type=radio]");
        let radio_count = dom.count(&radios).await?;

        let labels = question.locator("label");
        let label_texts: Vec<String> = if radio_count > 0 {
            dom.describe_all(&labels, None)
                .await?
                .into_iter()
                .map(|s| s.text)
                .collect()
        } else {
            Vec::new()
        };

        match choose_option(&label_texts, radio_count, &session.config.rating_text) {
            OptionChoice::Preferred(j) | OptionChoice::LastLabel(j) => {
                session.click(&labels.nth(j)).await?;
            }
            OptionChoice::LastRadio(j) => {
                dom.check(&radios.nth(j)).await?;
                session.pause().await;
            }
            OptionChoice::Skip => {
                report.skipped += 1;
                continue;
            }
        }
        report.filled += 1;
    }

    info!(
        "题目 共 {} 道，已选 {} 道，跳过(无单选框) {} 道",
        report.total, report.filled, report.skipped
    );
    Ok(report)
}

/// 填写弹窗中当前激活的题目区域
///
/// 先按配置的题目选择器填写，再填评语。如果进度显示未做满，放宽选择器再填一遍。
pub async fn fill_active_block<D: Dom>(
    session: &Session<'_, D>,
    modal: &Locator,
) -> BrowserResult<FillReport> {
    let dom = session.dom;
    let config = session.config;

    let active = modal.locator(&config.selectors.active_block).first();
    expect_visible(dom, &active, BLOCK_VISIBLE_TIMEOUT).await?;

    let report = fill_questions(session, &active.locator(&config.selectors.question_block)).await?;

    let comment_box = active.locator(&config.selectors.comment_textarea).first();
    expect_visible(dom, &comment_box, BLOCK_VISIBLE_TIMEOUT).await?;
    // 配置校验保证评语模板非空
    if let Some(comment) = pick_comment(&config.comment_templates) {
        dom.fill(&comment_box, comment).await?;
        debug!("评语: {}", comment);
    }

    let Some(progress) = read_progress(dom, &active, config).await else {
        return Ok(report);
    };
    info!("进度: {}", progress);

    if let Some((done, total)) = parse_progress(&progress) {
        if done < total {
            let broader = active
                .locator(&config.heuristics.generic_question_block)
                .has("input[type=radio]");
            let count = dom.count(&broader).await.unwrap_or(0);
            if count > 0 {
                info!("⚠️ 进度未满，放宽选择器重新填写，共 {} 道", count);
                fill_questions(session, &broader).await?;
                if let Some(after) = read_progress(dom, &active, config).await {
                    info!("进度(重填后): {}", after);
                }
            }
        }
    }

    Ok(report)
}
