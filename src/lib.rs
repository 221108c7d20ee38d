//! # PJ Assistant
//!
//! 课程评教自动填写助手：驱动真实的 Chromium 浏览器，逐页打开待评价课程，
//! 按教师标签填写评价选项和评语，然后提交。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露 DOM 能力
//! - `Dom` - 页面能力接口，测试中可以换成内存实现
//! - `JsExecutor` - 唯一的 page owner，通过注入脚本解析定位器
//! - `Locator` / `Selector` - 惰性的元素描述，每次操作都重新解析
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程顺序
//! - 作用域解析、元素定位、点击重试、轮询等待、提示框处理、随机节奏
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一门课程"的完整处理流程
//! - `Session` - 运行会话（页面能力 + 配置 + 节奏 + 启发式规则）
//! - `EvaluationFlow` - 流程编排（打开弹窗 → 填写 → 提交 → 确认）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/assistant` - 管理浏览器资源和失败现场
//! - `orchestrator/list_processor` - 逐页处理课程列表
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use browser::StorageState;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use infrastructure::{Dom, JsExecutor, Locator, Scope};
pub use orchestrator::{assist_all_pages, App, RunStats};
pub use workflow::{EvaluationFlow, PendingItem, Session};
