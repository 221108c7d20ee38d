//! 课程上下文
//!
//! 封装"我正在评哪门课、哪位老师"这一信息，用于日志

use std::fmt::Display;

use crate::config::Columns;
use crate::infrastructure::{Dom, Locator};

/// 待评价课程
///
/// 从待评价按钮所在行读取的快照，提交确认后即丢弃
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingItem {
    /// 课程代码
    pub course_code: String,

    /// 课程名称
    pub course_name: String,

    /// 教师姓名
    pub teacher_name: String,
}

impl PendingItem {
    /// 读取按钮所在行的各列，缺失的列为空字符串
    pub async fn from_row<D: Dom>(dom: &D, button: &Locator, columns: &Columns) -> Self {
        let cells = button.ancestor("tr").locator("td");
        Self {
            course_code: cell_text(dom, &cells, columns.course_code).await,
            course_name: cell_text(dom, &cells, columns.course_name).await,
            teacher_name: cell_text(dom, &cells, columns.teacher_name).await,
        }
    }
}

async fn cell_text<D: Dom>(dom: &D, cells: &Locator, index: usize) -> String {
    let count = dom.count(cells).await.unwrap_or(0);
    if index >= count {
        return String::new();
    }
    dom.inner_text(&cells.nth(index))
        .await
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

impl Display for PendingItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[课程 {}#{} 教师 {}]",
            self.course_name, self.course_code, self.teacher_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_for_logs() {
        let item = PendingItem {
            course_code: "CS101".to_string(),
            course_name: "数据结构".to_string(),
            teacher_name: "李明".to_string(),
        };
        assert_eq!(item.to_string(), "[课程 数据结构#CS101 教师 李明]");
    }
}
