//! 流程层
//!
//! 定义"一门课程"和"一页课程"的处理顺序，只依赖业务能力层。

pub mod block_filler;
pub mod course_ctx;
pub mod evaluation_flow;
pub mod session;

pub use block_filler::FillReport;
pub use course_ctx::PendingItem;
pub use evaluation_flow::EvaluationFlow;
pub use session::Session;
