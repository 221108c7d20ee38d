//! 基础设施层
//!
//! 持有稀缺资源（Page），只暴露 DOM 能力；定位器与选择器是纯数据，可以自由复制。

pub mod dom;
pub mod js_executor;
pub mod locator;
pub mod selector;

pub use dom::{BoundingBox, ClickMode, Dom, ElementSummary};
pub use js_executor::JsExecutor;
pub use locator::{Locator, Scope, Step};
pub use selector::{Selector, SelectorPart, TextMatch};
