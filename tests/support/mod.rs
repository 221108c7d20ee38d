//! 测试用的内存 DOM
//!
//! 实现 `Dom` trait 所需的最小子集：CSS 只支持标签、#id、.class、[attr]、[attr="v"]、
//! `:last-child` 和后代组合符；子文档像浏览器帧树一样按 frame id 访问，与来源无关。
//! 点击行为由测试场景注册的回调决定。

#![allow(dead_code)]

use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::Duration;

use pj_assistant::config::AppConfig;
use pj_assistant::error::{BrowserError, BrowserResult};
use pj_assistant::infrastructure::{
    BoundingBox, ClickMode, Dom, ElementSummary, Locator, Scope, Selector, SelectorPart, Step,
    TextMatch,
};
use tokio::time::{sleep, Instant};

pub type NodeId = usize;
pub type Handler = Rc<dyn Fn(&mut World)>;

const DOCUMENT: &str = "#document";

#[derive(Clone)]
pub struct Node {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    pub text: String,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    pub visible: bool,
    pub obscured: bool,
    pub bbox: BoundingBox,
    pub checked: bool,
    pub value: String,
    on_click: Option<Handler>,
}

impl Node {
    fn new(tag: &str, bbox: BoundingBox) -> Self {
        Self {
            tag: tag.to_string(),
            id: None,
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            text: String::new(),
            children: Vec::new(),
            parent: None,
            visible: true,
            obscured: false,
            bbox,
            checked: false,
            value: String::new(),
            on_click: None,
        }
    }
}

struct Frame {
    id: String,
    url: String,
    root: NodeId,
}

/// 页面状态
pub struct World {
    nodes: Vec<Node>,
    frames: Vec<Frame>,
    scheduled: Vec<(Duration, Handler)>,
    started: Instant,
    pub url: String,
    /// 点击记录，格式为 `方式:描述`
    pub clicks: Vec<String>,
    pub keys: Vec<String>,
    pub visits: Vec<String>,
    pub on_enter: Option<Handler>,
}

pub fn bbox(x: f64, y: f64, width: f64, height: f64) -> BoundingBox {
    BoundingBox {
        x,
        y,
        width,
        height,
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(DOCUMENT, bbox(0.0, 0.0, 1280.0, 900.0))],
            frames: Vec::new(),
            scheduled: Vec::new(),
            started: Instant::now(),
            url: "about:blank".to_string(),
            clicks: Vec::new(),
            keys: Vec::new(),
            visits: Vec::new(),
            on_enter: None,
        }
    }

    /// 顶层文档
    pub fn page(&self) -> NodeId {
        0
    }

    /// 新增一个子文档，返回它的文档节点
    pub fn add_frame(&mut self, url: &str) -> NodeId {
        let root = self.nodes.len();
        self.nodes
            .push(Node::new(DOCUMENT, bbox(0.0, 0.0, 1280.0, 900.0)));
        self.frames.push(Frame {
            id: format!("FRAME-{}", self.frames.len() + 1),
            url: url.to_string(),
            root,
        });
        root
    }

    /// 子文档节点对应的 frame id
    pub fn frame_id(&self, root: NodeId) -> Option<String> {
        self.frames.iter().find(|f| f.root == root).map(|f| f.id.clone())
    }

    /// 在 `parent` 下追加元素，`markup` 形如 `div#id.a.b[k="v"]`；位置默认继承父元素
    pub fn el(&mut self, parent: NodeId, markup: &str, text: &str) -> NodeId {
        let compound = parse_compound(markup);
        let mut node = Node::new(
            compound.tag.as_deref().unwrap_or("div"),
            self.nodes[parent].bbox,
        );
        node.id = compound.id;
        node.classes = compound.classes;
        for (name, value) in compound.attrs {
            node.attrs.insert(name, value.unwrap_or_default());
        }
        node.text = text.to_string();
        node.parent = Some(parent);

        let id = self.nodes.len();
        self.nodes.push(node);
        self.nodes[parent].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn hide(&mut self, id: NodeId) {
        self.nodes[id].visible = false;
    }

    pub fn show(&mut self, id: NodeId) {
        self.nodes[id].visible = true;
    }

    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.nodes[id].text = text.to_string();
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if !self.nodes[id].classes.iter().any(|c| c == class) {
            self.nodes[id].classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        self.nodes[id].classes.retain(|c| c != class);
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        self.nodes[id].attrs.insert(name.to_string(), value.to_string());
    }

    pub fn set_box(&mut self, id: NodeId, b: BoundingBox) {
        self.nodes[id].bbox = b;
    }

    pub fn obscure(&mut self, id: NodeId, obscured: bool) {
        self.nodes[id].obscured = obscured;
    }

    pub fn on_click(&mut self, id: NodeId, handler: impl Fn(&mut World) + 'static) {
        self.nodes[id].on_click = Some(Rc::new(handler));
    }

    /// 从开始计时起 `after` 之后执行一次
    pub fn schedule(&mut self, after: Duration, handler: impl Fn(&mut World) + 'static) {
        self.scheduled.push((after, Rc::new(handler)));
    }

    pub fn is_checked(&self, id: NodeId) -> bool {
        self.nodes[id].checked
    }

    pub fn value(&self, id: NodeId) -> &str {
        &self.nodes[id].value
    }

    pub fn clicked(&self, needle: &str) -> usize {
        self.clicks.iter().filter(|c| c.contains(needle)).count()
    }

    fn is_element(&self, id: NodeId) -> bool {
        self.nodes[id].tag != DOCUMENT
    }

    /// 自身及所有祖先都可见，且仍挂在某个文档下
    fn is_rendered(&self, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(n) = cur {
            let node = &self.nodes[n];
            if node.tag == DOCUMENT {
                return true;
            }
            if !node.visible {
                return false;
            }
            cur = node.parent;
        }
        false
    }

    fn text_of(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        self.collect_text(id, &mut parts);
        parts
            .join(" ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn collect_text(&self, id: NodeId, out: &mut Vec<String>) {
        let node = &self.nodes[id];
        if !node.text.is_empty() {
            out.push(node.text.clone());
        }
        for &child in &node.children {
            self.collect_text(child, out);
        }
    }

    fn descendants(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for &child in &self.nodes[id].children {
            out.push(child);
            self.descendants(child, out);
        }
    }

    fn doc_order(&self) -> HashMap<NodeId, usize> {
        let mut order = Vec::new();
        let roots = std::iter::once(0).chain(self.frames.iter().map(|f| f.root));
        for root in roots {
            order.push(root);
            self.descendants(root, &mut order);
        }
        order.into_iter().enumerate().map(|(i, n)| (n, i)).collect()
    }

    fn sorted(&self, mut ids: Vec<NodeId>) -> Vec<NodeId> {
        let order = self.doc_order();
        ids.sort_by_key(|id| order.get(id).copied().unwrap_or(usize::MAX));
        ids.dedup();
        ids
    }

    fn attr(&self, id: NodeId, name: &str) -> Option<String> {
        let node = &self.nodes[id];
        match name {
            "id" => node.id.clone(),
            "class" if node.classes.is_empty() => None,
            "class" => Some(node.classes.join(" ")),
            _ => node.attrs.get(name).cloned(),
        }
    }

    fn matches_compound(&self, id: NodeId, c: &Compound) -> bool {
        if !self.is_element(id) {
            return false;
        }
        let node = &self.nodes[id];
        if let Some(tag) = &c.tag {
            if !tag.eq_ignore_ascii_case(&node.tag) {
                return false;
            }
        }
        if c.id.is_some() && node.id != c.id {
            return false;
        }
        if !c.classes.iter().all(|cls| node.classes.contains(cls)) {
            return false;
        }
        for (name, value) in &c.attrs {
            match (self.attr(id, name), value) {
                (None, _) => return false,
                (Some(actual), Some(wanted)) if &actual != wanted => return false,
                _ => {}
            }
        }
        if c.last_child {
            let Some(parent) = node.parent else {
                return false;
            };
            let last = self.nodes[parent]
                .children
                .iter()
                .rev()
                .find(|&&n| self.is_element(n));
            if last != Some(&id) {
                return false;
            }
        }
        true
    }

    fn matches_complex(&self, id: NodeId, compounds: &[Compound]) -> bool {
        let Some((last, rest)) = compounds.split_last() else {
            return false;
        };
        if !self.matches_compound(id, last) {
            return false;
        }
        if rest.is_empty() {
            return true;
        }
        let mut cur = self.nodes[id].parent;
        while let Some(p) = cur {
            if self.matches_complex(p, rest) {
                return true;
            }
            cur = self.nodes[p].parent;
        }
        false
    }

    fn matches_part(&self, id: NodeId, part: &SelectorPart) -> bool {
        if part.visible && !self.is_rendered(id) {
            return false;
        }
        match &part.text {
            Some(TextMatch::Contains(t)) => self
                .text_of(id)
                .to_lowercase()
                .contains(&t.to_lowercase()),
            Some(TextMatch::Exact(t)) => self.text_of(id) == t.trim(),
            None => true,
        }
    }

    fn select_in(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        let mut scope = Vec::new();
        self.descendants(root, &mut scope);
        let mut out = Vec::new();
        for part in &selector.parts {
            let compounds = parse_complex(&part.css);
            out.extend(
                scope
                    .iter()
                    .copied()
                    .filter(|&n| self.matches_complex(n, &compounds) && self.matches_part(n, part)),
            );
        }
        self.sorted(out)
    }

    fn closest(&self, from: NodeId, selector: &str) -> Option<NodeId> {
        let alternatives: Vec<Vec<Compound>> = selector.split(',').map(parse_complex).collect();
        let mut cur = Some(from);
        while let Some(n) = cur {
            if alternatives.iter().any(|c| self.matches_complex(n, c)) {
                return Some(n);
            }
            cur = self.nodes[n].parent;
        }
        None
    }

    fn scope_root(&self, scope: &Scope) -> Option<NodeId> {
        match &scope.frame_id {
            None => Some(0),
            Some(id) => self.frames.iter().find(|f| &f.id == id).map(|f| f.root),
        }
    }

    pub fn resolve(&self, loc: &Locator) -> Vec<NodeId> {
        let Some(root) = self.scope_root(&loc.scope) else {
            return Vec::new();
        };
        let mut els = vec![root];
        for step in &loc.steps {
            els = match step {
                Step::Select { selector } => {
                    let next = els.iter().flat_map(|&e| self.select_in(e, selector)).collect();
                    self.sorted(next)
                }
                Step::Has { selector } => els
                    .into_iter()
                    .filter(|&e| !self.select_in(e, selector).is_empty())
                    .collect(),
                Step::Nth { index } => els.get(*index).copied().into_iter().collect(),
                Step::Ancestor { tag } => {
                    let next = els
                        .iter()
                        .filter_map(|&e| self.nodes[e].parent)
                        .filter_map(|p| self.closest(p, tag))
                        .collect();
                    self.sorted(next)
                }
                Step::Closest { tag } => {
                    let next = els.iter().filter_map(|&e| self.closest(e, tag)).collect();
                    self.sorted(next)
                }
                Step::Parent => {
                    let next = els.iter().filter_map(|&e| self.nodes[e].parent).collect();
                    self.sorted(next)
                }
            };
        }
        els.into_iter().filter(|&e| self.is_element(e)).collect()
    }

    fn rendered_box(&self, id: NodeId) -> Option<BoundingBox> {
        self.is_rendered(id).then_some(self.nodes[id].bbox)
    }

    fn describe(&self, id: NodeId) -> String {
        let node = &self.nodes[id];
        let mut out = node.tag.clone();
        if let Some(i) = &node.id {
            out.push('#');
            out.push_str(i);
        }
        for c in &node.classes {
            out.push('.');
            out.push_str(c);
        }
        format!("{out} \"{}\"", self.text_of(id))
    }

    /// 浏览器对点击的默认反应：label 勾选其中的单选框
    fn activate(&mut self, id: NodeId) {
        let target = if self.nodes[id].tag == "label" {
            let mut inside = Vec::new();
            self.descendants(id, &mut inside);
            inside.into_iter().find(|&n| self.nodes[n].tag == "input")
        } else if self.nodes[id].tag == "input" {
            Some(id)
        } else {
            None
        };
        if let Some(input) = target {
            self.nodes[input].checked = true;
        }
    }

    fn take_due(&mut self) -> Vec<Handler> {
        let elapsed = self.started.elapsed();
        let (due, later): (Vec<_>, Vec<_>) = self
            .scheduled
            .drain(..)
            .partition(|(at, _)| *at <= elapsed);
        self.scheduled = later;
        due.into_iter().map(|(_, h)| h).collect()
    }
}

/// 内存 DOM
pub struct FakeDom {
    world: RefCell<World>,
}

impl FakeDom {
    pub fn new(world: World) -> Self {
        Self {
            world: RefCell::new(world),
        }
    }

    pub fn world(&self) -> Ref<'_, World> {
        self.world.borrow()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut World) -> R) -> R {
        f(&mut self.world.borrow_mut())
    }

    /// 执行到期的定时事件
    fn tick(&self) {
        let due = self.world.borrow_mut().take_due();
        for handler in due {
            handler(&mut self.world.borrow_mut());
        }
    }

    fn first(&self, target: &Locator) -> Option<NodeId> {
        self.tick();
        self.world.borrow().resolve(target).first().copied()
    }

    fn require(&self, target: &Locator) -> BrowserResult<NodeId> {
        self.first(target).ok_or_else(|| BrowserError::ElementDetached {
            target: target.to_string(),
        })
    }

    fn perform_click(&self, id: NodeId, how: &str) {
        let handler = {
            let mut world = self.world.borrow_mut();
            let desc = world.describe(id);
            world.clicks.push(format!("{how}:{desc}"));
            world.activate(id);
            world.nodes[id].on_click.clone()
        };
        if let Some(handler) = handler {
            handler(&mut self.world.borrow_mut());
        }
    }
}

impl Dom for FakeDom {
    async fn current_url(&self) -> BrowserResult<String> {
        self.tick();
        Ok(self.world.borrow().url.clone())
    }

    async fn goto(&self, url: &str) -> BrowserResult<()> {
        let mut world = self.world.borrow_mut();
        world.url = url.to_string();
        world.visits.push(url.to_string());
        Ok(())
    }

    async fn scopes(&self) -> BrowserResult<Vec<Scope>> {
        self.tick();
        let world = self.world.borrow();
        let mut scopes = vec![Scope::page()];
        for (i, frame) in world.frames.iter().enumerate() {
            scopes.push(Scope::frame(i + 1, frame.id.clone(), &frame.url));
        }
        Ok(scopes)
    }

    async fn count(&self, target: &Locator) -> BrowserResult<usize> {
        self.tick();
        Ok(self.world.borrow().resolve(target).len())
    }

    async fn is_visible(&self, target: &Locator) -> BrowserResult<bool> {
        Ok(self
            .first(target)
            .is_some_and(|id| self.world.borrow().is_rendered(id)))
    }

    async fn inner_text(&self, target: &Locator) -> BrowserResult<String> {
        let id = self.require(target)?;
        Ok(self.world.borrow().text_of(id))
    }

    async fn attribute(&self, target: &Locator, name: &str) -> BrowserResult<Option<String>> {
        let id = self.require(target)?;
        Ok(self.world.borrow().attr(id, name))
    }

    async fn bounding_box(&self, target: &Locator) -> BrowserResult<Option<BoundingBox>> {
        Ok(self
            .first(target)
            .and_then(|id| self.world.borrow().rendered_box(id)))
    }

    async fn describe_all(
        &self,
        target: &Locator,
        attribute: Option<&str>,
    ) -> BrowserResult<Vec<ElementSummary>> {
        self.tick();
        let world = self.world.borrow();
        Ok(world
            .resolve(target)
            .into_iter()
            .enumerate()
            .map(|(index, id)| ElementSummary {
                index,
                text: world.text_of(id),
                bbox: world.rendered_box(id),
                attribute: attribute.and_then(|name| world.attr(id, name)),
            })
            .collect())
    }

    async fn click(
        &self,
        target: &Locator,
        mode: ClickMode,
        timeout: Duration,
    ) -> BrowserResult<()> {
        let ready = self.first(target).filter(|&id| {
            let world = self.world.borrow();
            world.is_rendered(id) && (mode == ClickMode::Forced || !world.nodes[id].obscured)
        });
        match ready {
            Some(id) => {
                let how = match mode {
                    ClickMode::Actionable => "click",
                    ClickMode::Forced => "force",
                };
                self.perform_click(id, how);
                Ok(())
            }
            None => {
                sleep(timeout).await;
                Err(BrowserError::timeout(
                    "点击",
                    target,
                    timeout.as_millis() as u64,
                ))
            }
        }
    }

    async fn scroll_into_view(&self, target: &Locator) -> BrowserResult<()> {
        self.require(target).map(|_| ())
    }

    async fn hover(&self, target: &Locator) -> BrowserResult<()> {
        self.require(target).map(|_| ())
    }

    async fn dispatch_click(&self, target: &Locator) -> BrowserResult<()> {
        let id = self.require(target)?;
        self.perform_click(id, "js");
        Ok(())
    }

    async fn fill(&self, target: &Locator, value: &str) -> BrowserResult<()> {
        let id = self.require(target)?;
        self.world.borrow_mut().nodes[id].value = value.to_string();
        Ok(())
    }

    async fn check(&self, target: &Locator) -> BrowserResult<()> {
        let id = self.require(target)?;
        self.world.borrow_mut().nodes[id].checked = true;
        Ok(())
    }

    async fn press_key(&self, key: &str) -> BrowserResult<()> {
        let handler = {
            let mut world = self.world.borrow_mut();
            world.keys.push(key.to_string());
            if key == "Enter" {
                world.on_enter.clone()
            } else {
                None
            }
        };
        if let Some(handler) = handler {
            handler(&mut self.world.borrow_mut());
        }
        Ok(())
    }
}

/// 一个复合选择器，如 `td.a[k="v"]:last-child`
#[derive(Debug, Default, Clone)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
    last_child: bool,
}

fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(markup: &str) -> Compound {
    let chars: Vec<char> = markup.trim().chars().collect();
    let mut c = Compound::default();
    let mut i = 0;

    let read_ident = |i: &mut usize| {
        let start = *i;
        while *i < chars.len() && is_ident(chars[*i]) {
            *i += 1;
        }
        chars[start..*i].iter().collect::<String>()
    };

    if i < chars.len() && chars[i] == '*' {
        i += 1;
    } else {
        let tag = read_ident(&mut i);
        if !tag.is_empty() {
            c.tag = Some(tag);
        }
    }

    while i < chars.len() {
        let marker = chars[i];
        i += 1;
        match marker {
            '#' => c.id = Some(read_ident(&mut i)),
            '.' => c.classes.push(read_ident(&mut i)),
            ':' => {
                if read_ident(&mut i) == "last-child" {
                    c.last_child = true;
                }
            }
            '[' => {
                let start = i;
                while i < chars.len() && chars[i] != ']' {
                    i += 1;
                }
                let body: String = chars[start..i].iter().collect();
                i += 1;
                match body.split_once('=') {
                    Some((name, value)) => c.attrs.push((
                        name.trim().to_string(),
                        Some(value.trim().trim_matches(['"', '\'']).to_string()),
                    )),
                    None => c.attrs.push((body.trim().to_string(), None)),
                }
            }
            _ => {}
        }
    }
    c
}

/// 按空白拆分后代组合符，忽略方括号里的空白
fn parse_complex(css: &str) -> Vec<Compound> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0;
    for ch in css.trim().chars() {
        match ch {
            '[' => depth += 1,
            ']' => depth -= 1,
            _ => {}
        }
        if ch.is_whitespace() && depth == 0 {
            if !current.is_empty() {
                out.push(parse_compound(&current));
                current.clear();
            }
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        out.push(parse_compound(&current));
    }
    out
}

/// 测试配置：停顿为 0，其余取默认值
pub fn test_config(extra: &str) -> AppConfig {
    let toml = format!(
        r#"
login_url = "https://jw.example.edu/login"
list_url = "https://jw.example.edu/pj/list"
comment_templates = ["老师讲课认真", "课堂氛围好"]
{extra}

[delays_ms]
min = 0
max = 0
"#
    );
    match AppConfig::from_toml_str(&toml) {
        Ok(config) => config,
        Err(e) => panic!("测试配置不合法: {e}"),
    }
}

/// 课程列表页面上的关键节点
#[derive(Debug, Clone, Copy)]
pub struct Portal {
    pub table: NodeId,
    pub code_cell: NodeId,
    pub name_cell: NodeId,
    pub pending_button: NodeId,
    pub modal: NodeId,
    pub pjst: NodeId,
    pub block: NodeId,
    pub preferred_radio: NodeId,
    pub other_radio: NodeId,
    pub comment: NodeId,
    pub submit: NodeId,
    pub layer: NodeId,
    pub confirm: NodeId,
    pub next: NodeId,
}

/// 一道五分制题目，返回（“很满意”单选框，“满意”单选框）
pub fn add_question(world: &mut World, block: NodeId) -> (NodeId, NodeId) {
    let question = world.el(block, r#"div.tm[data-fs="5"]"#, "");
    let preferred_label = world.el(question, "label", "很满意");
    let preferred = world.el(preferred_label, "input[type=radio]", "");
    let other_label = world.el(question, "label", "满意");
    let other = world.el(other_label, "input[type=radio]", "");
    (preferred, other)
}

/// 题目区域：一道题、评语框和进度
pub fn add_block(world: &mut World, parent: NodeId, markup: &str) -> (NodeId, NodeId, NodeId, NodeId) {
    let block = world.el(parent, markup, "");
    let (preferred, other) = add_question(world, block);
    let comment = world.el(block, "textarea.form-control.da", "");
    let progress = world.el(block, "div.tmtj", "");
    world.el(progress, "span", "已做：1/1");
    (block, preferred, other, comment)
}

/// 在 `root` 下搭一个只有一门待评价课程的列表页
///
/// 布局：弹窗顶部 y=50，题目区域 y=300，表格 y=600，翻页按钮 y=850。
/// 翻页按钮默认禁用，弹窗和提示框默认隐藏。
pub fn build_portal(world: &mut World, root: NodeId) -> Portal {
    let table = world.el(root, "table#kcpjDataTable", "");
    world.set_box(table, bbox(0.0, 600.0, 1200.0, 200.0));
    let tbody = world.el(table, "tbody", "");
    let row = world.el(tbody, "tr", "");
    let code_cell = world.el(row, "td", "CS101");
    let name_cell = world.el(row, "td", "数据结构");
    for text in ["必修", "3.0", "48", "计算机学院", "2024-2025-1"] {
        world.el(row, "td", text);
    }
    world.el(row, "td", "李明");
    let action_cell = world.el(row, "td", "");
    let pending_button = world.el(action_cell, "button.btn", "评价");

    let modal = world.el(root, "div.modal.pjModal", "");
    world.set_box(modal, bbox(200.0, 50.0, 800.0, 600.0));
    world.hide(modal);
    let pjst = world.el(modal, "div.pjst", "");
    world.set_box(pjst, bbox(220.0, 300.0, 760.0, 200.0));
    let (block, preferred_radio, other_radio, comment) =
        add_block(world, pjst, "div.jslb.active");
    let footer = world.el(modal, "div.modal-footer", "");
    let submit = world.el(footer, "button.btn.sure", "提交");

    let layer = world.el(root, "div.layui-layer", "");
    world.set_box(layer, bbox(400.0, 200.0, 300.0, 150.0));
    world.hide(layer);
    world.el(layer, "span", "提交成功");
    let confirm = world.el(layer, "a.layui-layer-btn0", "确定");

    let pager = world.el(root, "div.dataTables_paginate", "");
    world.set_box(pager, bbox(900.0, 850.0, 200.0, 30.0));
    let next = world.el(pager, "a#kcpjDataTable_next.paginate_button.next.disabled", "下一页");

    Portal {
        table,
        code_cell,
        name_cell,
        pending_button,
        modal,
        pjst,
        block,
        preferred_radio,
        other_radio,
        comment,
        submit,
        layer,
        confirm,
        next,
    }
}

/// 门户的正常反应：点评价打开弹窗，提交后弹出成功提示，确认后关闭弹窗并把按钮改成“查看”
pub fn wire_happy_path(world: &mut World, p: Portal) {
    world.on_click(p.pending_button, move |w| w.show(p.modal));
    world.on_click(p.submit, move |w| w.show(p.layer));
    world.on_click(p.confirm, move |w| {
        w.hide(p.layer);
        w.hide(p.modal);
        w.set_text(p.pending_button, "查看");
    });
}
