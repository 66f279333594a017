//! Minimal element tree for the simulated application.
//!
//! Resolves every [`Selector`] strategy the page objects use with the same
//! rules as the generated browser query: compound CSS selectors, implicit
//! and explicit ARIA roles, accessible names, `has-text` filters, and
//! descendant chains. Visibility is inherited: a node inside a hidden
//! ancestor is hidden.

use std::collections::BTreeMap;

use crate::driver::ElementHandle;
use crate::locator::{Role, Selector};
use crate::result::{AuthCheckError, AuthCheckResult};

/// Index of a node inside a [`Dom`]
pub type NodeId = usize;

/// Element description used to build a [`Dom`]
#[derive(Debug, Clone, Default)]
pub struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    visible: bool,
    children: Vec<Element>,
}

impl Element {
    /// Create a new visible element
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            visible: true,
            ..Self::default()
        }
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attrs.insert(name.into(), value.into());
        self
    }

    /// Add a class
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        let classes = self.attrs.entry("class".to_string()).or_default();
        if !classes.is_empty() {
            classes.push(' ');
        }
        classes.push_str(class);
        self
    }

    /// Set the element's own text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Render but hide (display: none)
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Append a child
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Append a child when present
    #[must_use]
    pub fn child_opt(self, child: Option<Self>) -> Self {
        match child {
            Some(c) => self.child(c),
            None => self,
        }
    }

    /// Append several children
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }
}

/// One node of a flattened tree
#[derive(Debug, Clone)]
pub struct Node {
    /// Lowercase tag name
    pub tag: String,
    /// Attributes
    pub attrs: BTreeMap<String, String>,
    /// Own text (children excluded)
    pub text: String,
    /// Own visibility flag (ancestors not considered)
    pub visible: bool,
    /// Child nodes in document order
    pub children: Vec<NodeId>,
    /// Parent node
    pub parent: Option<NodeId>,
}

impl Node {
    /// Attribute value
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_whitespace().any(|x| x == class))
    }
}

/// Flattened element tree; node 0 is the document root
#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Node>,
}

impl Dom {
    /// Flatten an element tree
    #[must_use]
    pub fn from_root(root: Element) -> Self {
        let mut dom = Self { nodes: Vec::new() };
        let _ = dom.push(root, None);
        dom
    }

    fn push(&mut self, el: Element, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            tag: el.tag.to_lowercase(),
            attrs: el.attrs,
            text: el.text,
            visible: el.visible,
            children: Vec::new(),
            parent,
        });
        for child in el.children {
            let cid = self.push(child, Some(id));
            self.nodes[id].children.push(cid);
        }
        id
    }

    /// Node by id
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Number of nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Visible when the node and all of its ancestors are
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if !self.nodes[n].visible {
                return false;
            }
            cur = self.nodes[n].parent;
        }
        true
    }

    /// Rendered text of the subtree, one line per text-bearing node.
    ///
    /// Hidden subtrees of a rendered node contribute nothing; a node that
    /// is not rendered itself reports all of its text.
    #[must_use]
    pub fn inner_text(&self, id: NodeId) -> String {
        let mut lines = Vec::new();
        self.collect_text(id, !self.is_visible(id), &mut lines);
        lines.join("\n")
    }

    fn collect_text(&self, id: NodeId, include_hidden: bool, lines: &mut Vec<String>) {
        let node = &self.nodes[id];
        if !node.visible && !include_hidden {
            return;
        }
        if !node.text.trim().is_empty() {
            lines.push(node.text.clone());
        }
        for &c in &node.children {
            self.collect_text(c, include_hidden, lines);
        }
    }

    /// Explicit `role` attribute, else the implicit role of the tag
    #[must_use]
    pub fn role(&self, id: NodeId) -> Option<Role> {
        let node = &self.nodes[id];
        if let Some(explicit) = node.attr("role") {
            return Role::from_name(explicit);
        }
        let ty = node.attr("type").unwrap_or("text").to_lowercase();
        match node.tag.as_str() {
            "button" => Some(Role::Button),
            "a" if node.attrs.contains_key("href") => Some(Role::Link),
            "input" => match ty.as_str() {
                "button" | "submit" | "reset" | "image" => Some(Role::Button),
                "text" | "email" | "tel" | "url" | "search" => Some(Role::Textbox),
                _ => None,
            },
            "textarea" => Some(Role::Textbox),
            "option" => Some(Role::Option),
            _ => None,
        }
    }

    /// `aria-label`, else rendered text, else value or placeholder
    #[must_use]
    pub fn accessible_name(&self, id: NodeId) -> String {
        let node = &self.nodes[id];
        let text = self.inner_text(id);
        let raw = node
            .attr("aria-label")
            .map(str::to_string)
            .or_else(|| (!text.trim().is_empty()).then_some(text))
            .or_else(|| node.attr("value").map(str::to_string))
            .or_else(|| node.attr("placeholder").map(str::to_string))
            .unwrap_or_default();
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Snapshot a node the way a browser query reports it
    #[must_use]
    pub fn handle(&self, id: NodeId) -> ElementHandle {
        ElementHandle::new(
            self.nodes[id].tag.clone(),
            self.inner_text(id),
            self.is_visible(id),
        )
    }

    /// Resolve a selector against the whole document
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unparsable CSS or name patterns.
    pub fn resolve(&self, selector: &Selector) -> AuthCheckResult<Vec<NodeId>> {
        self.resolve_in(0, selector)
    }

    fn resolve_in(&self, root: NodeId, selector: &Selector) -> AuthCheckResult<Vec<NodeId>> {
        match selector {
            Selector::Css(css) => {
                let compound = CompoundSelector::parse(css)?;
                Ok(self
                    .descendants(root)
                    .into_iter()
                    .filter(|&id| compound.matches(&self.nodes[id]))
                    .collect())
            }
            Selector::Role { role, name } => {
                let mut out = Vec::new();
                for id in self.descendants(root) {
                    if self.role(id) != Some(*role) {
                        continue;
                    }
                    let keep = match name {
                        Some(m) => m.matches(&self.accessible_name(id))?,
                        None => true,
                    };
                    if keep {
                        out.push(id);
                    }
                }
                Ok(out)
            }
            Selector::Filter { base, has_text } => {
                let needle = has_text.to_lowercase();
                Ok(self
                    .resolve_in(root, base)?
                    .into_iter()
                    .filter(|&id| {
                        self.inner_text(id)
                            .split_whitespace()
                            .collect::<Vec<_>>()
                            .join(" ")
                            .to_lowercase()
                            .contains(&needle)
                    })
                    .collect())
            }
            Selector::Descendant { parent, child } => {
                let mut out: Vec<NodeId> = Vec::new();
                for p in self.resolve_in(root, parent)? {
                    for c in self.resolve_in(p, child)? {
                        if !out.contains(&c) {
                            out.push(c);
                        }
                    }
                }
                Ok(out)
            }
        }
    }

    /// Every node below `root` in document order
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[root].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id].children.iter().rev().copied());
        }
        out
    }
}

/// `tag`, `.class`, `[attr]` and `[attr="value"]` parts of one compound selector
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct CompoundSelector {
    tag: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

impl CompoundSelector {
    fn parse(css: &str) -> AuthCheckResult<Self> {
        let bad = |why: &str| AuthCheckError::config(format!("unsupported selector '{css}': {why}"));
        let mut out = Self::default();
        let mut chars = css.trim().chars().peekable();
        if css.trim().is_empty() {
            return Err(bad("empty"));
        }

        if chars.peek() == Some(&'*') {
            let _ = chars.next();
        } else {
            let tag = read_ident(&mut chars);
            if !tag.is_empty() {
                out.tag = Some(tag.to_lowercase());
            }
        }

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    let class = read_ident(&mut chars);
                    if class.is_empty() {
                        return Err(bad("empty class"));
                    }
                    out.classes.push(class);
                }
                '[' => {
                    let name = read_ident(&mut chars);
                    if name.is_empty() {
                        return Err(bad("empty attribute name"));
                    }
                    let value = match chars.next() {
                        Some(']') => None,
                        Some('=') => {
                            let v = match chars.peek() {
                                Some(&q @ ('"' | '\'')) => {
                                    let _ = chars.next();
                                    let mut v = String::new();
                                    loop {
                                        match chars.next() {
                                            Some(ch) if ch == q => break,
                                            Some(ch) => v.push(ch),
                                            None => return Err(bad("unterminated string")),
                                        }
                                    }
                                    v
                                }
                                _ => read_ident(&mut chars),
                            };
                            if chars.next() != Some(']') {
                                return Err(bad("expected ']'"));
                            }
                            Some(v)
                        }
                        _ => return Err(bad("expected '=' or ']'")),
                    };
                    out.attrs.push((name, value));
                }
                other => return Err(bad(&format!("unexpected '{other}'"))),
            }
        }
        Ok(out)
    }

    fn matches(&self, node: &Node) -> bool {
        self.tag.as_ref().map_or(true, |t| *t == node.tag)
            && self.classes.iter().all(|c| node.has_class(c))
            && self.attrs.iter().all(|(name, value)| match value {
                Some(v) => node.attr(name) == Some(v.as_str()),
                None => node.attrs.contains_key(name),
            })
    }
}

fn read_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            ident.push(c);
            let _ = chars.next();
        } else {
            break;
        }
    }
    ident
}
