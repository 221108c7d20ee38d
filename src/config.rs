//! 程序配置
//!
//! 配置文件为 TOML，启动时加载一次并校验，运行期间不再修改。

use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::infrastructure::Selector;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    /// 登录页地址（仅 pj-login 使用）
    pub login_url: String,
    /// 待评教课程列表地址
    pub list_url: String,
    #[serde(default)]
    pub browser: BrowserSettings,
    /// 优先选择的评价选项文字
    #[serde(default = "default_rating_text")]
    pub rating_text: String,
    /// 评语模板，每门课随机选一条
    #[serde(default = "default_comment_templates")]
    pub comment_templates: Vec<String>,
    #[serde(default)]
    pub delays_ms: Delays,
    /// 手动提交模式下等待弹窗关闭的最长时间，0 表示一直等待
    #[serde(default)]
    pub manual_submit_max_wait_s: u64,
    /// 是否自动点击提交
    #[serde(default = "default_true")]
    pub auto_submit: bool,
    #[serde(default)]
    pub selectors: Selectors,
    #[serde(default)]
    pub heuristics: Heuristics,
    #[serde(default)]
    pub columns: Columns,
}

/// 浏览器启动参数
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BrowserSettings {
    #[serde(default)]
    pub headless: bool,
    /// 每次页面操作后的额外停顿
    #[serde(default)]
    pub slow_mo_ms: u64,
    /// 自定义浏览器可执行文件路径
    #[serde(default)]
    pub executable: Option<String>,
    /// 设置后连接到已打开的浏览器（远程调试端口），而不是启动新浏览器
    #[serde(default)]
    pub debug_port: Option<u16>,
}

/// 随机延迟区间（毫秒）
#[derive(Clone, Debug, Deserialize)]
pub struct Delays {
    #[serde(default = "default_delay_min")]
    pub min: i64,
    #[serde(default = "default_delay_max")]
    pub max: i64,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            min: default_delay_min(),
            max: default_delay_max(),
        }
    }
}

/// 页面各部分的选择器
///
/// 除标准 CSS 外，支持 `:has-text("x")`、`:text-is("x")`、`:visible` 扩展。
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub table: String,
    pub pending_button: String,
    pub modal: String,
    pub teacher_tabs: String,
    pub active_block: String,
    pub question_block: String,
    pub comment_textarea: String,
    pub done_text: String,
    pub submit_button: String,
    pub success_confirm_button: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            table: "#kcpjDataTable".to_string(),
            pending_button: r#"td:last-child button:text-is("评价")"#.to_string(),
            modal: ".modal:visible".to_string(),
            teacher_tabs: ".title .jsxx".to_string(),
            active_block: ".pjst .jslb.active".to_string(),
            question_block: r#".tm[data-fs="5"]"#.to_string(),
            comment_textarea: "textarea.form-control.da".to_string(),
            done_text: ".tmtj span".to_string(),
            submit_button: ".modal-footer button.sure".to_string(),
            success_confirm_button:
                ".layui-layer-btn0, .bootbox-accept, button:has-text('确定'), a:has-text('确定')"
                    .to_string(),
        }
    }
}

/// 与门户语言、布局相关的启发式数据
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    /// “评价”按钮上的文字
    pub rate_keyword: String,
    /// 启发式教师标签的文字模式
    pub tab_name_pattern: String,
    /// 永远不会被当作教师标签的文字
    pub tab_skip_words: Vec<String>,
    /// 教师标签距弹窗顶部的最大纵向距离
    pub tab_max_offset_px: f64,
    /// 显式教师标签上的唯一标识属性
    pub tab_id_attribute: String,
    /// 依次尝试的弹窗选择器
    pub modal_candidates: Vec<String>,
    /// 确认按钮文字
    pub confirm_texts: Vec<String>,
    /// 提交成功提示框中的文字
    pub success_keywords: Vec<String>,
    /// 提示框容器
    pub dialog_containers: String,
    /// 提示框关闭按钮
    pub dialog_close_selectors: Vec<String>,
    pub next_page_selector: String,
    pub next_page_texts: Vec<String>,
    /// 进度未满时放宽后的题目选择器
    pub generic_question_block: String,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            rate_keyword: "评价".to_string(),
            tab_name_pattern: r"^[一-龥·]{2,8}$".to_string(),
            tab_skip_words: ["提交", "取消", "关闭", "保存", "很满意", "满意", "一般", "不满意", "很不满意"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            tab_max_offset_px: 220.0,
            tab_id_attribute: "data-gh".to_string(),
            modal_candidates: [".modal.pjModal", ".pjModal", ".modal.in", ".modal"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            confirm_texts: vec!["确认".to_string(), "确定".to_string()],
            success_keywords: vec!["提交成功".to_string()],
            dialog_containers:
                ".modal, .layui-layer, .el-message-box, .swal2-popup, .bootbox, [role=dialog]"
                    .to_string(),
            dialog_close_selectors: [
                "button.close",
                ".layui-layer-close",
                ".layui-layer-ico",
                ".el-message-box__headerbtn",
                ".swal2-confirm",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            next_page_selector: "#kcpjDataTable_next".to_string(),
            next_page_texts: vec!["后一页".to_string(), "下一页".to_string()],
            generic_question_block: ".tm".to_string(),
        }
    }
}

/// 课程行中各字段所在的列（从 0 开始）
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Columns {
    pub course_code: usize,
    pub course_name: usize,
    pub teacher_name: usize,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            course_code: 0,
            course_name: 1,
            teacher_name: 7,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_rating_text() -> String {
    "很满意".to_string()
}

fn default_comment_templates() -> Vec<String> {
    Vec::new()
}

fn default_delay_min() -> i64 {
    100
}

fn default_delay_max() -> i64 {
    350
}

impl AppConfig {
    /// 从 TOML 文件加载并校验配置
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::ParseFailed { source, .. } => ConfigError::ParseFailed {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    /// 从 TOML 文本解析并校验配置
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig =
            toml::from_str(content).map_err(|source| ConfigError::ParseFailed {
                path: String::new(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// 校验配置，任何一项不合法都立即失败
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.comment_templates.is_empty() {
            return Err(ConfigError::EmptyCommentPool);
        }

        if self.delays_ms.min < 0 || self.delays_ms.max < self.delays_ms.min {
            return Err(ConfigError::InvalidDelays {
                min: self.delays_ms.min,
                max: self.delays_ms.max,
            });
        }

        Regex::new(&self.heuristics.tab_name_pattern).map_err(|source| {
            ConfigError::InvalidPattern {
                pattern: self.heuristics.tab_name_pattern.clone(),
                source,
            }
        })?;

        for selector in self.selector_sources() {
            Selector::try_parse(selector)?;
        }

        Ok(())
    }

    /// 所有会被当作选择器解析的配置项
    fn selector_sources(&self) -> impl Iterator<Item = &str> {
        let s = &self.selectors;
        let h = &self.heuristics;
        [
            &s.table,
            &s.pending_button,
            &s.modal,
            &s.teacher_tabs,
            &s.active_block,
            &s.question_block,
            &s.comment_textarea,
            &s.done_text,
            &s.submit_button,
            &s.success_confirm_button,
            &h.dialog_containers,
            &h.next_page_selector,
            &h.generic_question_block,
        ]
        .into_iter()
        .chain(&h.modal_candidates)
        .chain(&h.dialog_close_selectors)
        .map(String::as_str)
    }
}
