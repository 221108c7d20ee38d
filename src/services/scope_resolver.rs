//! 作用域解析 - 业务能力层
//!
//! 课程表格可能在顶层页面，也可能嵌在某一层 iframe 里。按顺序检查所有文档，
//! 都找不到时退回顶层页面，从不失败。

use tracing::{debug, info};

use crate::config::AppConfig;
use crate::infrastructure::{Dom, Locator, Scope};
use crate::services::element_locator::rate_affordance;

/// 完整解析：三级兜底
pub async fn resolve_scope<D: Dom>(dom: &D, config: &AppConfig) -> Scope {
    resolve(dom, config, true).await
}

/// 快速解析：只走第一级兜底，供轮询调用
pub async fn resolve_scope_fast<D: Dom>(dom: &D, config: &AppConfig) -> Scope {
    resolve(dom, config, false).await
}

async fn resolve<D: Dom>(dom: &D, config: &AppConfig, full: bool) -> Scope {
    let scopes = match dom.scopes().await {
        Ok(scopes) => scopes,
        Err(e) => {
            debug!("读取 frame 列表失败: {}", e);
            return Scope::page();
        }
    };

    let table = config.selectors.table.as_str();
    if let Some(scope) = first_scope_with(dom, &scopes, |s| s.locator(table)).await {
        log_hit(full, &scope, table);
        return scope;
    }

    let rate = rate_affordance(&config.heuristics.rate_keyword);
    let table_with_rate = |s: &Scope| s.locator("table").has(rate.as_str());
    if let Some(scope) = first_scope_with(dom, &scopes, table_with_rate).await {
        log_hit(full, &scope, &format!("table:has({rate}) (fallback)"));
        return scope;
    }

    if full {
        if let Some(scope) = first_scope_with(dom, &scopes, |s| s.locator(rate.as_str())).await {
            log_hit(full, &scope, &format!("{rate} (fallback)"));
            return scope;
        }
    }

    debug!("未在任何 frame 中找到课程表格，使用顶层页面");
    Scope::page()
}

async fn first_scope_with<D, F>(dom: &D, scopes: &[Scope], build: F) -> Option<Scope>
where
    D: Dom,
    F: Fn(&Scope) -> Locator,
{
    for scope in scopes {
        match dom.count(&build(scope)).await {
            Ok(n) if n > 0 => return Some(scope.clone()),
            Ok(_) => {}
            Err(e) => debug!("查询 {} 失败，跳过: {}", scope, e),
        }
    }
    None
}

fn log_hit(full: bool, scope: &Scope, selector: &str) {
    if full {
        info!("表格所在作用域 scope={} selector={}", scope, selector);
    } else {
        debug!("表格所在作用域 scope={} selector={}", scope, selector);
    }
}
