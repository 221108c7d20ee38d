//! JS 执行器 - 基础设施层
//!
//! 持有唯一的 page 资源，对上只暴露 [`Dom`] 能力。所有查询都通过注入同一段页面脚本完成，
//! 脚本每次调用都重新解析定位器，不在页面里保留任何状态。
//!
//! 子文档按 CDP 帧树枚举，脚本直接在该帧自己的执行上下文里运行，跨域 iframe 也能访问。

use std::path::Path;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::dom::{GetBoxModelParams, GetFrameOwnerParams};
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::cdp::browser_protocol::page::{FrameId, FrameTree, GetFrameTreeParams};
use chromiumoxide::cdp::js_protocol::runtime::{EvaluateParams, ExecutionContextId};
use chromiumoxide::layout::Point;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tokio::time::{sleep, Instant};
use tracing::debug;

use super::dom::{BoundingBox, ClickMode, Dom, ElementSummary};
use super::locator::{Locator, Scope};
use crate::error::{BrowserError, BrowserResult};

const DOM_RUNTIME: &str = include_str!("dom_runtime.js");

/// 点击前可操作性检查的轮询间隔
const PROBE_INTERVAL: Duration = Duration::from_millis(100);

/// 页面脚本的统一返回结构
#[derive(Debug, Deserialize)]
struct Reply {
    ok: bool,
    #[serde(default)]
    value: JsonValue,
    #[serde(default)]
    detached: bool,
    #[serde(default)]
    error: Option<String>,
}

/// 点击前的探测结果
#[derive(Debug, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
enum ClickProbe {
    Ready { x: f64, y: f64 },
    Missing,
    Hidden,
    Disabled,
    Obscured { detail: String },
}

/// 需要把坐标换算到顶层视口的操作
const POSITIONED_OPS: [&str; 3] = ["box", "describe", "probe"];

/// 帧树中的一个子文档
#[derive(Debug, Clone, PartialEq)]
struct FrameEntry {
    id: String,
    url: String,
}

/// 按文档顺序展开帧树，不含顶层页面
fn flatten_frames(tree: &FrameTree, out: &mut Vec<FrameEntry>) {
    for child in tree.child_frames.iter().flatten() {
        out.push(FrameEntry {
            id: child.frame.id.inner().clone(),
            url: child.frame.url.clone(),
        });
        flatten_frames(child, out);
    }
}

/// JS 执行器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 把定位器交给页面脚本解析
/// - 用 CDP 输入事件完成真实的鼠标、键盘操作
pub struct JsExecutor {
    page: Page,
    slow_mo: Duration,
}

impl JsExecutor {
    /// 创建新的 JS 执行器
    pub fn new(page: Page) -> Self {
        Self {
            page,
            slow_mo: Duration::ZERO,
        }
    }

    /// 每次页面操作后额外停顿
    pub fn with_slow_mo(mut self, slow_mo: Duration) -> Self {
        self.slow_mo = slow_mo;
        self
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> BrowserResult<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        Ok(result.into_value()?)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> BrowserResult<T> {
        let json_value = self.eval(js_code).await?;
        Ok(serde_json::from_value(json_value)?)
    }

    /// 保存整页截图
    pub async fn screenshot(&self, path: impl AsRef<Path>) -> BrowserResult<()> {
        let params = ScreenshotParams::builder().full_page(true).build();
        self.page.save_screenshot(params, path).await?;
        Ok(())
    }

    /// 在指定执行上下文中执行脚本，`None` 为顶层页面
    async fn eval_in<T: DeserializeOwned>(
        &self,
        script: String,
        context: Option<ExecutionContextId>,
    ) -> BrowserResult<T> {
        let Some(context) = context else {
            return self.eval_as(script).await;
        };
        let params = EvaluateParams::builder()
            .expression(script)
            .context_id(context)
            .return_by_value(true)
            .await_promise(true)
            .build()
            .map_err(|message| BrowserError::ScriptFailed { message })?;
        let value: JsonValue = self.page.evaluate_expression(params).await?.into_value()?;
        Ok(serde_json::from_value(value)?)
    }

    /// 子文档左上角在顶层视口中的位置，取自 iframe 元素的内容框
    async fn frame_origin(&self, frame_id: &str) -> BrowserResult<(f64, f64)> {
        let owner = self
            .page
            .execute(GetFrameOwnerParams::new(FrameId::new(frame_id)))
            .await?;
        let model = self
            .page
            .execute(
                GetBoxModelParams::builder()
                    .backend_node_id(owner.result.backend_node_id.clone())
                    .build(),
            )
            .await?;
        match model.result.model.content.inner().as_slice() {
            [x, y, ..] => Ok((*x, *y)),
            _ => Err(BrowserError::ScriptFailed {
                message: format!("frame {frame_id} 没有布局框"),
            }),
        }
    }

    /// 调用页面脚本中的一个操作
    async fn call<T: DeserializeOwned>(
        &self,
        op: &str,
        target: &Locator,
        extra: JsonValue,
    ) -> BrowserResult<T> {
        let mut request = serde_json::Map::new();
        request.insert("op".to_string(), json!(op));
        request.insert("loc".to_string(), json!(target));
        if let JsonValue::Object(fields) = extra {
            request.extend(fields);
        }

        let mut context = None;
        if let Some(frame_id) = target.scope.frame_id.as_deref() {
            match self
                .page
                .frame_execution_context(FrameId::new(frame_id))
                .await?
            {
                Some(id) => {
                    context = Some(id);
                    if POSITIONED_OPS.contains(&op) {
                        let (x, y) = self.frame_origin(frame_id).await?;
                        request.insert("origin".to_string(), json!({ "x": x, "y": y }));
                    }
                }
                // 帧已销毁或尚未加载，按空文档处理
                None => {
                    debug!("frame {} 没有可用的执行上下文", frame_id);
                    request.insert("gone".to_string(), JsonValue::Bool(true));
                }
            }
        }

        let script = DOM_RUNTIME.replace("__REQUEST__", &JsonValue::Object(request).to_string());
        let reply: Reply = self.eval_in(script, context).await?;

        if reply.ok {
            return Ok(serde_json::from_value(reply.value)?);
        }
        let target = target.to_string();
        if reply.detached {
            return Err(BrowserError::ElementDetached { target });
        }
        Err(BrowserError::ScriptFailed {
            message: format!(
                "{op} ({target}): {}",
                reply.error.unwrap_or_else(|| "unknown".to_string())
            ),
        })
    }

    async fn probe(&self, target: &Locator, forced: bool) -> BrowserResult<ClickProbe> {
        self.call("probe", target, json!({ "forced": forced })).await
    }

    async fn settle(&self) {
        if !self.slow_mo.is_zero() {
            sleep(self.slow_mo).await;
        }
    }

    async fn key_event(&self, kind: DispatchKeyEventType, key: &str) -> BrowserResult<()> {
        let mut builder = DispatchKeyEventParams::builder()
            .r#type(kind.clone())
            .key(key)
            .code(key);
        if key == "Enter" {
            builder = builder.windows_virtual_key_code(13).native_virtual_key_code(13);
            if kind == DispatchKeyEventType::KeyDown {
                builder = builder.text("\r");
            }
        }
        let params = builder
            .build()
            .map_err(|message| BrowserError::ScriptFailed { message })?;
        self.page.execute(params).await?;
        Ok(())
    }
}

impl Dom for JsExecutor {
    async fn current_url(&self) -> BrowserResult<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn goto(&self, url: &str) -> BrowserResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|source| BrowserError::NavigationFailed {
                url: url.to_string(),
                source,
            })?;
        self.settle().await;
        Ok(())
    }

    async fn scopes(&self) -> BrowserResult<Vec<Scope>> {
        let tree = self
            .page
            .execute(GetFrameTreeParams::default())
            .await?
            .result
            .frame_tree;
        let mut frames = Vec::new();
        flatten_frames(&tree, &mut frames);

        let mut scopes = vec![Scope::page()];
        scopes.extend(
            frames
                .into_iter()
                .enumerate()
                .map(|(i, frame)| Scope::frame(i + 1, frame.id, &frame.url)),
        );
        Ok(scopes)
    }

    async fn count(&self, target: &Locator) -> BrowserResult<usize> {
        self.call("count", target, JsonValue::Null).await
    }

    async fn is_visible(&self, target: &Locator) -> BrowserResult<bool> {
        self.call("visible", target, JsonValue::Null).await
    }

    async fn inner_text(&self, target: &Locator) -> BrowserResult<String> {
        self.call("text", target, JsonValue::Null).await
    }

    async fn attribute(&self, target: &Locator, name: &str) -> BrowserResult<Option<String>> {
        self.call("attr", target, json!({ "attr": name })).await
    }

    async fn bounding_box(&self, target: &Locator) -> BrowserResult<Option<BoundingBox>> {
        self.call("box", target, JsonValue::Null).await
    }

    async fn describe_all(
        &self,
        target: &Locator,
        attribute: Option<&str>,
    ) -> BrowserResult<Vec<ElementSummary>> {
        self.call("describe", target, json!({ "attr": attribute }))
            .await
    }

    async fn click(
        &self,
        target: &Locator,
        mode: ClickMode,
        timeout: Duration,
    ) -> BrowserResult<()> {
        let deadline = Instant::now() + timeout;
        let forced = mode == ClickMode::Forced;
        let mut last_state = String::from("missing");

        loop {
            match self.probe(target, forced).await? {
                ClickProbe::Ready { x, y } => {
                    self.page.click(Point { x, y }).await?;
                    self.settle().await;
                    return Ok(());
                }
                ClickProbe::Obscured { detail } => last_state = format!("被 {detail} 遮挡"),
                ClickProbe::Hidden => last_state = "不可见".to_string(),
                ClickProbe::Disabled => last_state = "不可用".to_string(),
                ClickProbe::Missing => last_state = "不存在".to_string(),
            }

            if Instant::now() >= deadline {
                debug!("点击超时: {} ({})", target, last_state);
                return Err(BrowserError::timeout(
                    format!("点击({last_state})"),
                    target,
                    timeout.as_millis() as u64,
                ));
            }
            sleep(PROBE_INTERVAL).await;
        }
    }

    async fn scroll_into_view(&self, target: &Locator) -> BrowserResult<()> {
        self.call::<JsonValue>("scroll", target, JsonValue::Null)
            .await?;
        Ok(())
    }

    async fn hover(&self, target: &Locator) -> BrowserResult<()> {
        match self.probe(target, true).await? {
            ClickProbe::Ready { x, y } => {
                self.page.move_mouse(Point { x, y }).await?;
                Ok(())
            }
            _ => Err(BrowserError::ElementDetached {
                target: target.to_string(),
            }),
        }
    }

    async fn dispatch_click(&self, target: &Locator) -> BrowserResult<()> {
        self.call::<JsonValue>("dispatch_click", target, JsonValue::Null)
            .await?;
        self.settle().await;
        Ok(())
    }

    async fn fill(&self, target: &Locator, value: &str) -> BrowserResult<()> {
        self.call::<JsonValue>("fill", target, json!({ "value": value }))
            .await?;
        self.settle().await;
        Ok(())
    }

    async fn check(&self, target: &Locator) -> BrowserResult<()> {
        self.call::<JsonValue>("check", target, JsonValue::Null)
            .await?;
        self.settle().await;
        Ok(())
    }

    async fn press_key(&self, key: &str) -> BrowserResult<()> {
        self.key_event(DispatchKeyEventType::KeyDown, key).await?;
        self.key_event(DispatchKeyEventType::KeyUp, key).await?;
        self.settle().await;
        Ok(())
    }
}
