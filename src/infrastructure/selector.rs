//! 选择器
//!
//! 门户页面的选择器写法沿用 CSS，再加三个扩展伪类：
//! - `:has-text("x")` 元素文本（规范化空白后）包含 x，不区分大小写
//! - `:text-is("x")` 元素文本去除首尾空白后等于 x
//! - `:visible` 元素可见
//!
//! 扩展伪类作用于该分支最终匹配到的元素，只能写在顶层；写在 `:has(...)` 等括号里的
//! 不会被识别，配置校验时用 [`Selector::try_parse`] 拒绝。
//! 逗号分隔的多个分支取并集，按文档顺序去重。

use std::fmt;

use serde::Serialize;

use crate::error::ConfigError;

const EXTENSIONS: [&str; 3] = [":has-text(", ":text-is(", ":visible"];

/// 文本匹配方式
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TextMatch {
    Contains(String),
    Exact(String),
}

/// 选择器中的一个分支
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorPart {
    pub css: String,
    pub text: Option<TextMatch>,
    pub visible: bool,
}

/// 解析后的选择器
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selector {
    source: String,
    pub parts: Vec<SelectorPart>,
}

impl Selector {
    /// 解析选择器文本
    ///
    /// 不做 CSS 语法校验：非法 CSS 在页面中查询时才会报错，由调用方按“未找到”处理。
    pub fn parse(source: &str) -> Self {
        let parts = split_top_level(source)
            .into_iter()
            .map(|alt| parse_part(alt.trim()))
            .filter(|part| !part.css.is_empty())
            .collect();
        Self {
            source: source.trim().to_string(),
            parts,
        }
    }

    /// 解析并拒绝嵌套在括号里的扩展伪类
    pub fn try_parse(source: &str) -> Result<Self, ConfigError> {
        let selector = Self::parse(source);
        if let Some(pseudo) = selector.parts.iter().find_map(|p| nested_extension(&p.css)) {
            return Err(ConfigError::InvalidSelector {
                selector: selector.source,
                reason: format!("{pseudo} 只能用在顶层，不能嵌套在括号内"),
            });
        }
        Ok(selector)
    }

    /// 给每个分支追加文本条件
    pub fn with_text(mut self, text: TextMatch) -> Self {
        for part in &mut self.parts {
            part.text = Some(text.clone());
        }
        self.source = match &text {
            TextMatch::Contains(t) => format!("{} :has-text({t:?})", self.source),
            TextMatch::Exact(t) => format!("{} :text-is({t:?})", self.source),
        };
        self
    }

    /// 给每个分支的 CSS 末尾追加限定条件，如 `.active` 或 `[data-gh="1"]`
    pub fn refine(mut self, suffix: &str) -> Self {
        for part in &mut self.parts {
            part.css.push_str(suffix);
        }
        self.source = format!("{}{suffix}", self.source);
        self
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl From<&str> for Selector {
    fn from(value: &str) -> Self {
        Selector::parse(value)
    }
}

impl From<&String> for Selector {
    fn from(value: &String) -> Self {
        Selector::parse(value)
    }
}

/// 按顶层逗号切分（忽略引号、括号、方括号内的逗号）
fn split_top_level(source: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in source.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth -= 1,
            (None, ',') if depth == 0 => {
                parts.push(&source[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&source[start..]);
    parts
}

fn parse_part(alt: &str) -> SelectorPart {
    let mut css = String::with_capacity(alt.len());
    let mut text = None;
    let mut visible = false;
    let mut depth = 0i32;
    let mut rest = alt;

    while !rest.is_empty() {
        if depth > 0 {
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                if c == '"' || c == '\'' {
                    let end = rest[1..].find(c).map(|i| i + 2).unwrap_or(rest.len());
                    css.push_str(&rest[..end]);
                    rest = &rest[end..];
                    continue;
                }
                match c {
                    '(' | '[' => depth += 1,
                    ')' | ']' => depth -= 1,
                    _ => {}
                }
                css.push(c);
                rest = chars.as_str();
            }
            continue;
        }
        if let Some(after) = rest.strip_prefix(":visible") {
            if after.is_empty() || !after.starts_with(|c: char| c.is_alphanumeric() || c == '-') {
                visible = true;
                rest = after;
                continue;
            }
        }
        if let Some((value, after)) = take_pseudo_arg(rest, ":has-text(") {
            text = Some(TextMatch::Contains(value));
            rest = after;
            continue;
        }
        if let Some((value, after)) = take_pseudo_arg(rest, ":text-is(") {
            text = Some(TextMatch::Exact(value));
            rest = after;
            continue;
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            if c == '"' || c == '\'' {
                // 引号内原样保留，避免误识别其中的伪类
                let end = rest[1..].find(c).map(|i| i + 2).unwrap_or(rest.len());
                css.push_str(&rest[..end]);
                rest = &rest[end..];
                continue;
            }
            if c == '(' || c == '[' {
                depth += 1;
            }
            css.push(c);
            rest = chars.as_str();
        }
    }

    SelectorPart {
        css: css.trim().to_string(),
        text,
        visible,
    }
}

/// 引号以外残留的扩展伪类（只可能来自括号内部）
fn nested_extension(css: &str) -> Option<&'static str> {
    let mut quote: Option<char> = None;
    for (i, c) in css.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, ':') => {
                if let Some(pseudo) = EXTENSIONS.iter().find(|p| css[i..].starts_with(**p)) {
                    return Some(pseudo);
                }
            }
            _ => {}
        }
    }
    None
}

/// 取出 `:pseudo("value")` 的参数，返回 (value, 剩余部分)
fn take_pseudo_arg<'a>(input: &'a str, prefix: &str) -> Option<(String, &'a str)> {
    let inner = input.strip_prefix(prefix)?.trim_start();
    let quote = inner.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let body = &inner[1..];
    let close = body.find(quote)?;
    let value = body[..close].to_string();
    let after = body[close + 1..].trim_start().strip_prefix(')')?;
    Some((value, after))
}
