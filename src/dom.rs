//! In-memory document model.
//!
//! The engine never talks to a browser directly. It works against this arena
//! of elements, which carries exactly what the gallery page logic reads and
//! writes: tag names, classes, attributes, inline style, text and the tree
//! structure.
//!
//! ## Mutation observation
//!
//! Any subtree can be observed with [`Document::observe`]. Child-list changes
//! (append, remove, clear) and attribute changes (including `class` and
//! `style`) inside an observed subtree queue a [`MutationRecord`] on that
//! observer. Nothing is delivered eagerly: the owner drains the queue with
//! [`Document::take_records`] when it is ready to react, which keeps all
//! reactions on the caller's single thread of control.
//!
//! Writes that do not change a value are not recorded. This matters for the
//! gallery index, which marks items it binds: marking an already-marked item
//! must not schedule another re-scan.
//!
//! ## Selectors
//!
//! [`Selector`] understands the three forms the page configuration uses:
//! `#id`, `.class` and a bare tag name.

use std::collections::BTreeMap;
use std::fmt;

/// Handle to an element in a [`Document`]. Handles stay valid for the life
/// of the document, even after the element is detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Handle to a registered mutation observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    /// Children were added to or removed from the target.
    ChildList,
    /// The named attribute of the target changed.
    Attribute(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub kind: MutationKind,
}

#[derive(Debug, Clone, Default)]
struct Element {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
struct Observer {
    root: NodeId,
    records: Vec<MutationRecord>,
    connected: bool,
}

/// A simple selector: `#id`, `.class` or `tag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Id(String),
    Class(String),
    Tag(String),
}

impl Selector {
    /// Parse a selector string. Returns `None` for empty input or forms
    /// other than `#id`, `.class` and `tag`.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        let valid = |s: &str| {
            !s.is_empty()
                && s
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        };
        if let Some(id) = input.strip_prefix('#') {
            valid(id).then(|| Selector::Id(id.to_string()))
        } else if let Some(class) = input.strip_prefix('.') {
            valid(class).then(|| Selector::Class(class.to_string()))
        } else {
            valid(input).then(|| Selector::Tag(input.to_ascii_lowercase()))
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Id(id) => write!(f, "#{id}"),
            Selector::Class(class) => write!(f, ".{class}"),
            Selector::Tag(tag) => write!(f, "{tag}"),
        }
    }
}

/// An arena of elements rooted at `body`.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Element>,
    body: NodeId,
    observers: Vec<Observer>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let body = Element {
            tag: "body".to_string(),
            ..Default::default()
        };
        Self {
            nodes: vec![body],
            body: NodeId(0),
            observers: Vec::new(),
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Element {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        });
        id
    }

    // =========================================================================
    // Tree structure
    // =========================================================================

    /// Append `child` as the last child of `parent`, detaching it from its
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.contains(child, parent) {
            tracing::warn!(?parent, ?child, "refusing to create a cycle");
            return;
        }
        self.remove(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        self.record(parent, MutationKind::ChildList);
    }

    /// Detach `node` from its parent. No-op for detached nodes.
    pub fn remove(&mut self, node: NodeId) {
        let Some(parent) = self.nodes[node.0].parent.take() else {
            return;
        };
        self.nodes[parent.0].children.retain(|&c| c != node);
        self.record(parent, MutationKind::ChildList);
    }

    /// Detach every child of `node`, recording a single child-list mutation.
    pub fn clear_children(&mut self, node: NodeId) {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        if children.is_empty() {
            return;
        }
        for child in children {
            self.nodes[child.0].parent = None;
        }
        self.record(node, MutationKind::ChildList);
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.nodes[current.0].parent;
        }
        false
    }

    /// Whether `node` is reachable from `body`.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.contains(self.body, node)
    }

    /// All descendants of `root` in document (pre-)order, excluding `root`.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[root.0].children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.nodes[node.0].children.iter().rev().copied());
        }
        out
    }

    // =========================================================================
    // Element data
    // =========================================================================

    pub fn tag(&self, node: NodeId) -> &str {
        &self.nodes[node.0].tag
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node.0].attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let attrs = &mut self.nodes[node.0].attributes;
        if attrs.get(name).map(String::as_str) == Some(value) {
            return;
        }
        attrs.insert(name.to_string(), value.to_string());
        self.record(node, MutationKind::Attribute(name.to_string()));
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        if self.nodes[node.0].attributes.remove(name).is_some() {
            self.record(node, MutationKind::Attribute(name.to_string()));
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes[node.0].classes.iter().any(|c| c == class)
    }

    pub fn classes(&self, node: NodeId) -> &[String] {
        &self.nodes[node.0].classes
    }

    /// Add or remove `class` depending on `on`.
    pub fn set_class(&mut self, node: NodeId, class: &str, on: bool) {
        if self.has_class(node, class) == on {
            return;
        }
        let classes = &mut self.nodes[node.0].classes;
        if on {
            classes.push(class.to_string());
        } else {
            classes.retain(|c| c != class);
        }
        self.record(node, MutationKind::Attribute("class".to_string()));
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        self.set_class(node, class, true);
    }

    /// Flip `class` and return whether it is now present.
    pub fn toggle_class(&mut self, node: NodeId, class: &str) -> bool {
        let on = !self.has_class(node, class);
        self.set_class(node, class, on);
        on
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes[node.0].style.get(property).map(String::as_str)
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        let style = &mut self.nodes[node.0].style;
        if style.get(property).map(String::as_str) == Some(value) {
            return;
        }
        style.insert(property.to_string(), value.to_string());
        self.record(node, MutationKind::Attribute("style".to_string()));
    }

    pub fn remove_style(&mut self, node: NodeId, property: &str) {
        if self.nodes[node.0].style.remove(property).is_some() {
            self.record(node, MutationKind::Attribute("style".to_string()));
        }
    }

    /// Whether the element is hidden by an inline `display: none`.
    pub fn is_hidden(&self, node: NodeId) -> bool {
        self.style(node, "display") == Some("none")
    }

    pub fn text(&self, node: NodeId) -> &str {
        &self.nodes[node.0].text
    }

    /// Replace the text content. Text changes are not observable mutations.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        self.nodes[node.0].text = text.to_string();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        match selector {
            Selector::Id(id) => self.attribute(node, "id") == Some(id.as_str()),
            Selector::Class(class) => self.has_class(node, class),
            Selector::Tag(tag) => self.tag(node) == tag,
        }
    }

    /// Every descendant of `root` matching `selector`, in document order.
    pub fn select(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|&n| self.matches(n, selector))
            .collect()
    }

    pub fn select_first(&self, root: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|&n| self.matches(n, selector))
    }

    /// Look an element up anywhere in the attached tree.
    pub fn find(&self, selector: &Selector) -> Option<NodeId> {
        if self.matches(self.body, selector) {
            return Some(self.body);
        }
        self.select_first(self.body, selector)
    }

    /// Nearest ancestor-or-self of `node` matching `selector`.
    pub fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if self.matches(current, selector) {
                return Some(current);
            }
            cursor = self.nodes[current.0].parent;
        }
        None
    }

    // =========================================================================
    // Observation
    // =========================================================================

    /// Start recording child-list and attribute mutations in the subtree
    /// rooted at `root`.
    pub fn observe(&mut self, root: NodeId) -> ObserverId {
        self.observers.push(Observer {
            root,
            records: Vec::new(),
            connected: true,
        });
        ObserverId(self.observers.len() - 1)
    }

    /// Stop recording for `observer` and drop its pending records.
    pub fn disconnect(&mut self, observer: ObserverId) {
        if let Some(obs) = self.observers.get_mut(observer.0) {
            obs.connected = false;
            obs.records.clear();
        }
    }

    /// Drain the records queued for `observer`.
    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .get_mut(observer.0)
            .map(|obs| std::mem::take(&mut obs.records))
            .unwrap_or_default()
    }

    fn record(&mut self, target: NodeId, kind: MutationKind) {
        let watching: Vec<usize> = self
            .observers
            .iter()
            .enumerate()
            .filter(|(_, obs)| obs.connected && self.contains(obs.root, target))
            .map(|(i, _)| i)
            .collect();
        for i in watching {
            self.observers[i].records.push(MutationRecord {
                target,
                kind: kind.clone(),
            });
        }
    }
}
