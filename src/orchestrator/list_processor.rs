//! 课程列表处理器 - 编排层
//!
//! 打开课程列表，逐页处理待评价课程，直到没有可用的下一页。

use std::time::Duration;

use tokio::time::sleep;
use tracing::info;

use crate::error::AppResult;
use crate::infrastructure::Dom;
use crate::services::{find_next_page, resolve_scope};
use crate::workflow::{EvaluationFlow, Session};

/// 翻页后给表格重新渲染的时间
const PAGE_TURN_PAUSE: Duration = Duration::from_millis(500);

/// 整次运行的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// 提交的课程数
    pub submitted: usize,
    /// 访问的页数
    pub pages: usize,
}

/// 处理课程列表的所有页面
pub async fn assist_all_pages<D: Dom>(session: &Session<'_, D>) -> AppResult<RunStats> {
    let dom = session.dom;
    let config = session.config;

    info!("🌐 打开课程列表: {}", config.list_url);
    dom.goto(&config.list_url).await?;

    let flow = EvaluationFlow::new(session);
    let mut stats = RunStats::default();

    loop {
        stats.pages += 1;
        info!("\n{}", "─".repeat(60));
        info!("📄 第 {} 页", stats.pages);

        stats.submitted += flow.assist_page().await?;

        // 本页处理完后表格一定已经加载，此时解析作用域最可靠
        let scope = resolve_scope(dom, config).await;
        let Some(next) = find_next_page(dom, &scope, &config.heuristics).await else {
            info!("没有下一页了");
            break;
        };

        info!("➡️ 翻到下一页");
        session.click(&next).await?;
        sleep(PAGE_TURN_PAUSE).await;
    }

    Ok(stats)
}
