//! DOM 能力接口
//!
//! 上层只通过这个 trait 接触页面：查询、可见性、点击、填写。
//! 生产环境由 [`JsExecutor`](super::JsExecutor) 实现，测试中可以换成内存 DOM。

use std::time::Duration;

use serde::Deserialize;

use super::locator::{Locator, Scope};
use crate::error::BrowserResult;

/// 元素在顶层视口中的位置
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// 批量读取元素时的摘要
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ElementSummary {
    /// 在定位结果中的下标
    pub index: usize,
    pub text: String,
    #[serde(rename = "box")]
    pub bbox: Option<BoundingBox>,
    /// 请求读取的属性值
    pub attribute: Option<String>,
}

/// 点击方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickMode {
    /// 等待元素可见、可用且未被遮挡后点击
    Actionable,
    /// 跳过遮挡检查，直接在元素中心点击
    Forced,
}

/// 页面 DOM 能力
///
/// 除特别说明外，针对定位结果中的第一个元素操作。
#[allow(async_fn_in_trait)]
pub trait Dom {
    async fn current_url(&self) -> BrowserResult<String>;

    async fn goto(&self, url: &str) -> BrowserResult<()>;

    /// 顶层页面在前，随后按文档顺序列出所有可访问的子文档
    async fn scopes(&self) -> BrowserResult<Vec<Scope>>;

    async fn count(&self, target: &Locator) -> BrowserResult<usize>;

    /// 没有匹配元素时返回 false
    async fn is_visible(&self, target: &Locator) -> BrowserResult<bool>;

    async fn inner_text(&self, target: &Locator) -> BrowserResult<String>;

    async fn attribute(&self, target: &Locator, name: &str) -> BrowserResult<Option<String>>;

    async fn bounding_box(&self, target: &Locator) -> BrowserResult<Option<BoundingBox>>;

    /// 读取所有匹配元素的文本、位置以及可选属性
    async fn describe_all(
        &self,
        target: &Locator,
        attribute: Option<&str>,
    ) -> BrowserResult<Vec<ElementSummary>>;

    /// 在限定时间内完成一次真实鼠标点击，超时返回 `ActionTimeout`
    async fn click(&self, target: &Locator, mode: ClickMode, timeout: Duration)
        -> BrowserResult<()>;

    async fn scroll_into_view(&self, target: &Locator) -> BrowserResult<()>;

    async fn hover(&self, target: &Locator) -> BrowserResult<()>;

    /// 调用元素自身的 click()，失败时派发合成的 click 事件
    async fn dispatch_click(&self, target: &Locator) -> BrowserResult<()>;

    async fn fill(&self, target: &Locator, value: &str) -> BrowserResult<()>;

    /// 强制勾选单选框/复选框
    async fn check(&self, target: &Locator) -> BrowserResult<()>;

    async fn press_key(&self, key: &str) -> BrowserResult<()>;
}
