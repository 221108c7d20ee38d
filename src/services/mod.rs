//! 业务能力层
//!
//! 每个模块提供一种与页面打交道的能力，不关心评教流程的先后顺序：
//! - `scope_resolver`：表格在哪个文档里
//! - `element_locator`：表格、弹窗、待评价按钮、下一页
//! - `teacher_tabs`：教师标签
//! - `interaction`：点击重试阶梯
//! - `wait`：轮询原语和各类等待
//! - `dialogs`：提交后的提示框
//! - `pacing`：随机停顿

pub mod dialogs;
pub mod element_locator;
pub mod interaction;
pub mod pacing;
pub mod scope_resolver;
pub mod teacher_tabs;
pub mod wait;

pub use element_locator::{find_modal, find_next_page, find_table, first_match, Presence};
pub use pacing::Pacer;
pub use scope_resolver::{resolve_scope, resolve_scope_fast};
pub use teacher_tabs::{TabRules, TeacherTab};
pub use wait::Poll;
