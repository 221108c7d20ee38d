//! 评教流程 - 流程层
//!
//! 核心职责：定义"一页待评价课程"的完整处理流程
//!
//! 单门课程的状态：
//! 1. 表格就绪 → 点击第一个待评价按钮
//! 2. 弹窗打开 → 按教师标签逐个填写题目和评语
//! 3. 提交 → 处理确认框 → 等待弹窗关闭
//!
//! 表格中没有待评价按钮时，本页结束。

use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::AppResult;
use crate::infrastructure::{Dom, Locator, Scope, Selector};
use crate::services::dialogs::confirm_after_submit;
use crate::services::element_locator::{count_pending, find_pending};
use crate::services::teacher_tabs::{explicit_tabs, heuristic_tabs, wait_tab_active, TeacherTab};
use crate::services::wait::{
    expect_hidden, expect_visible, read_progress, wait_explicit_tabs, wait_for_modal,
    wait_for_table, wait_modal_closed, wait_progress_changed,
};
use crate::workflow::block_filler::fill_active_block;
use crate::workflow::course_ctx::PendingItem;
use crate::workflow::session::Session;

/// 显式标签切换为选中状态的时长（超时即失败）
const EXPLICIT_TAB_ACTIVE_TIMEOUT: Duration = Duration::from_secs(5);
/// 启发式标签切换的等待时长（尽力而为）
const HEURISTIC_TAB_ACTIVE_TIMEOUT: Duration = Duration::from_secs(2);
/// 提交按钮出现的时长
const SUBMIT_VISIBLE_TIMEOUT: Duration = Duration::from_secs(5);
/// 提交后弹窗关闭的时长（超时即失败）
const MODAL_HIDDEN_TIMEOUT: Duration = Duration::from_secs(10);
/// 标签切换后给页面渲染的时间
const TAB_SETTLE: Duration = Duration::from_millis(50);

/// 评教流程
///
/// - 编排单页内所有课程的处理顺序
/// - 不持有浏览器资源，只通过 Session 使用页面能力
pub struct EvaluationFlow<'s, 'a, D: Dom> {
    session: &'s Session<'a, D>,
}

impl<'s, 'a, D: Dom> EvaluationFlow<'s, 'a, D> {
    pub fn new(session: &'s Session<'a, D>) -> Self {
        Self { session }
    }

    /// 处理当前页面上的所有待评价课程，返回提交的门数
    pub async fn assist_page(&self) -> AppResult<usize> {
        let dom = self.session.dom;
        let config = self.session.config;

        let (scope, table) = wait_for_table(dom, config).await?;
        let rows = dom.count(&table.locator("tbody tr")).await.unwrap_or(0);
        let pending = count_pending(dom, &table, config).await;
        info!("📋 表格就绪 scope={} 行数={} 待评价={}", scope, rows, pending);

        let mut submitted = 0;
        while let Some(button) = find_pending(dom, &table, config).await {
            let item = PendingItem::from_row(dom, &button, &config.columns).await;
            info!("📝 开始评价 {}", item);

            self.process_item(&item, &button).await?;
            submitted += 1;
            info!("✓ 完成评价 {}", item);
        }

        info!("本页没有待评价课程了，共提交 {} 门", submitted);
        Ok(submitted)
    }

    /// 处理单门课程：打开弹窗 → 填写 → 提交
    async fn process_item(&self, item: &PendingItem, button: &Locator) -> AppResult<()> {
        let dom = self.session.dom;
        let config = self.session.config;

        self.session.click(button).await?;
        let (modal_scope, modal) = wait_for_modal(dom, config).await?;

        // 标签行可能渲染在弹窗元素之外，所以从弹窗所在作用域找
        if wait_explicit_tabs(dom, &modal_scope, config).await {
            let tabs = explicit_tabs(
                dom,
                &modal_scope,
                &config.selectors.teacher_tabs,
                &config.heuristics.tab_id_attribute,
            )
            .await;
            info!("教师标签(显式) {} 个", tabs.len());
            for tab in &tabs {
                self.fill_explicit_tab(&modal_scope, &modal, tab).await?;
            }
        } else {
            let tabs = heuristic_tabs(dom, &modal_scope, &modal, &self.session.tab_rules).await;
            if tabs.len() > 1 {
                for tab in &tabs {
                    self.fill_heuristic_tab(&modal, tab).await?;
                }
            } else {
                fill_active_block(self.session, &modal).await?;
            }
        }

        self.finish(item, &modal_scope, &modal).await
    }

    async fn fill_explicit_tab(
        &self,
        scope: &Scope,
        modal: &Locator,
        tab: &TeacherTab,
    ) -> AppResult<()> {
        let dom = self.session.dom;
        let config = self.session.config;
        let Some(id) = tab.id.as_deref() else {
            return Ok(());
        };
        if !tab.name.is_empty() {
            info!("填写教师标签 {}", tab.name);
        }

        let id_attribute = &config.heuristics.tab_id_attribute;
        let by_id = format!(r#"[{id_attribute}="{id}"]"#);

        self.session.click(&tab.target).await?;
        let active_tab = scope
            .locator(Selector::parse(&config.selectors.teacher_tabs).refine(&format!(".active{by_id}")))
            .first();
        expect_visible(dom, &active_tab, EXPLICIT_TAB_ACTIVE_TIMEOUT).await?;

        let block = modal
            .locator(Selector::parse(&config.selectors.active_block).refine(&by_id))
            .first();
        if matches!(dom.count(&block).await, Ok(n) if n > 0) {
            // 内容区可能稍后才显示，不强求
            let _ = expect_visible(dom, &block, EXPLICIT_TAB_ACTIVE_TIMEOUT).await;
        }

        sleep(TAB_SETTLE).await;
        fill_active_block(self.session, modal).await?;
        Ok(())
    }

    async fn fill_heuristic_tab(&self, modal: &Locator, tab: &TeacherTab) -> AppResult<()> {
        let dom = self.session.dom;
        info!("填写教师标签 {}", tab.name);

        let before = read_progress(dom, modal, self.session.config).await;
        self.session.click(&tab.target).await?;
        if !wait_tab_active(dom, &tab.target, HEURISTIC_TAB_ACTIVE_TIMEOUT).await {
            wait_progress_changed(dom, modal, self.session.config, before.as_deref()).await;
        }

        sleep(TAB_SETTLE).await;
        fill_active_block(self.session, modal).await?;
        Ok(())
    }

    /// 提交并等待弹窗关闭
    async fn finish(&self, item: &PendingItem, modal_scope: &Scope, modal: &Locator) -> AppResult<()> {
        let dom = self.session.dom;
        let config = self.session.config;

        if config.auto_submit {
            let submit = modal.locator(&config.selectors.submit_button).first();
            expect_visible(dom, &submit, SUBMIT_VISIBLE_TIMEOUT).await?;
            info!("🚀 自动提交 {}", item);
            self.session.click(&submit).await?;

            if !confirm_after_submit(dom, config, &self.session.pacer, modal_scope, modal).await {
                warn!("⚠️ 未点击到确认按钮，等待弹窗自行关闭");
            }
            expect_hidden(dom, modal, "评教弹窗关闭", MODAL_HIDDEN_TIMEOUT).await?;
        } else {
            info!("✋ 已填写完毕，请在页面中手动提交 {}", item);
            wait_modal_closed(dom, config, &self.session.pacer, modal).await?;
        }

        self.session.pause().await;
        Ok(())
    }
}
