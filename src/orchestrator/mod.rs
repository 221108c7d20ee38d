//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `assistant` - 评教助手
//! - 管理应用生命周期（初始化、运行、清理）
//! - 管理浏览器资源（Browser、JsExecutor）
//! - 出错时保存截图
//!
//! ### `list_processor` - 课程列表处理器
//! - 打开课程列表，逐页处理
//! - 汇总提交数和页数
//!
//! ## 层次关系
//!
//! ```text
//! assistant (持有浏览器)
//!     ↓
//! list_processor (处理所有页)
//!     ↓
//! workflow::EvaluationFlow (处理单页、单门课程)
//!     ↓
//! services (能力层：作用域 / 定位 / 点击 / 等待)
//!     ↓
//! infrastructure (基础设施：Dom / JsExecutor)
//! ```

pub mod assistant;
pub mod list_processor;

// 重新导出主要类型
pub use assistant::App;
pub use list_processor::{assist_all_pages, RunStats};
