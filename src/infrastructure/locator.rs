//! 作用域与定位器
//!
//! `Locator` 只描述“怎样找到元素”，不持有任何页面句柄。每次操作都会在当前文档上重新解析，
//! 页面跳转或弹窗重建之后依旧有效。

use std::fmt;

use serde::Serialize;

use super::selector::Selector;

/// 文档作用域：顶层页面，或帧树中的某个子文档
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scope {
    pub name: String,
    /// 子文档的 frame id，顶层页面为 `None`
    pub frame_id: Option<String>,
}

impl Scope {
    pub fn page() -> Self {
        Self {
            name: "page".to_string(),
            frame_id: None,
        }
    }

    pub fn frame(index: usize, frame_id: impl Into<String>, url: &str) -> Self {
        Self {
            name: format!("frame[{index}] {url}"),
            frame_id: Some(frame_id.into()),
        }
    }

    pub fn is_page(&self) -> bool {
        self.frame_id.is_none()
    }

    /// 作用域下匹配选择器的所有元素
    pub fn locator(&self, selector: impl Into<Selector>) -> Locator {
        Locator {
            scope: self.clone(),
            steps: vec![Step::Select {
                selector: selector.into(),
            }],
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// 定位链上的一步
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// 当前每个元素下匹配选择器的后代
    Select { selector: Selector },
    /// 只保留含有匹配后代的元素
    Has { selector: Selector },
    Nth { index: usize },
    /// 最近的指定标签祖先（不含自身）
    Ancestor { tag: String },
    /// 最近的匹配祖先（含自身）
    Closest { tag: String },
    Parent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Locator {
    pub scope: Scope,
    pub steps: Vec<Step>,
}

impl Locator {
    fn push(&self, step: Step) -> Self {
        let mut next = self.clone();
        next.steps.push(step);
        next
    }

    pub fn locator(&self, selector: impl Into<Selector>) -> Self {
        self.push(Step::Select {
            selector: selector.into(),
        })
    }

    pub fn has(&self, selector: impl Into<Selector>) -> Self {
        self.push(Step::Has {
            selector: selector.into(),
        })
    }

    pub fn first(&self) -> Self {
        self.nth(0)
    }

    pub fn nth(&self, index: usize) -> Self {
        self.push(Step::Nth { index })
    }

    pub fn ancestor(&self, tag: &str) -> Self {
        self.push(Step::Ancestor {
            tag: tag.to_string(),
        })
    }

    pub fn closest(&self, tag: &str) -> Self {
        self.push(Step::Closest {
            tag: tag.to_string(),
        })
    }

    pub fn parent(&self) -> Self {
        self.push(Step::Parent)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.scope)?;
        for step in &self.steps {
            match step {
                Step::Select { selector } => write!(f, " >> {selector}")?,
                Step::Has { selector } => write!(f, " >> has={selector}")?,
                Step::Nth { index } => write!(f, " >> nth={index}")?,
                Step::Ancestor { tag } => write!(f, " >> ancestor={tag}")?,
                Step::Closest { tag } => write!(f, " >> closest={tag}")?,
                Step::Parent => write!(f, " >> ..")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_display_for_diagnostics() {
        let loc = Scope::page()
            .locator("#kcpjDataTable")
            .first()
            .locator("button")
            .ancestor("tr");
        assert_eq!(
            loc.to_string(),
            "page >> #kcpjDataTable >> nth=0 >> button >> ancestor=tr"
        );
    }

    #[test]
    fn test_closest_includes_self_in_display() {
        let loc = Scope::page().locator("*").first().closest(".layui-layer");
        assert_eq!(loc.to_string(), "page >> * >> nth=0 >> closest=.layui-layer");
        assert!(matches!(loc.steps.last(), Some(Step::Closest { .. })));
    }

    #[test]
    fn test_chaining_does_not_mutate_parent() {
        let modal = Scope::page().locator(".modal").first();
        let submit = modal.locator("button.sure");
        assert_eq!(modal.steps.len(), 2);
        assert_eq!(submit.steps.len(), 3);
    }

    #[test]
    fn test_frame_scope_name() {
        let scope = Scope::frame(2, "9A4C1E", "https://jw.example.edu/pj");
        assert_eq!(scope.name, "frame[2] https://jw.example.edu/pj");
        assert_eq!(scope.frame_id.as_deref(), Some("9A4C1E"));
        assert!(!scope.is_page());
        assert!(Scope::page().is_page());
    }
}
