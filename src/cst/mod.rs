//! Arena-backed CSS tree.
//!
//! The tree the pipeline mutates: rules, at-rules, declarations and comments
//! stored in a flat arena with stable [`NodeId`]s. Detaching a node only
//! unlinks it from its parent's child list; the arena slot is never reused,
//! so side tables keyed by id stay valid for the tree's lifetime (and for
//! clones, which preserve ids).

pub mod lexer;
pub mod parser;

pub use parser::{parse_css, ParseOutput};

use smol_str::SmolStr;
use text_size::TextRange;

// ============================================================
// IDS AND NODES
// ============================================================

/// Stable index of a node within its [`CssTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn new(index: usize) -> Self {
        NodeId(index as u32)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssNodeKind {
    Root,
    Rule { selector: String },
    AtRule { name: SmolStr, params: String, has_block: bool },
    Decl { prop: SmolStr, value: String, important: bool },
    Comment { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssNode {
    pub kind: CssNodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub span: TextRange,
}

// ============================================================
// TREE
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssTree {
    nodes: Vec<CssNode>,
}

impl Default for CssTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CssTree {
    /// Create an empty tree holding only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![CssNode {
                kind: CssNodeKind::Root,
                parent: None,
                children: Vec::new(),
                span: TextRange::default(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &CssNode {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &CssNodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn span(&self, id: NodeId) -> TextRange {
        self.nodes[id.index()].span
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    // ============================================================
    // CONSTRUCTION
    // ============================================================

    fn alloc(&mut self, kind: CssNodeKind, span: TextRange) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(CssNode {
            kind,
            parent: None,
            children: Vec::new(),
            span,
        });
        id
    }

    /// Allocate a node and append it to `parent`'s children.
    pub fn append(&mut self, parent: NodeId, kind: CssNodeKind, span: TextRange) -> NodeId {
        let id = self.alloc(kind, span);
        self.nodes[id.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Allocate a node and insert it as a sibling right before `anchor`.
    pub fn insert_before(&mut self, anchor: NodeId, kind: CssNodeKind, span: TextRange) -> NodeId {
        let parent = self.nodes[anchor.index()]
            .parent
            .unwrap_or_else(|| self.root());
        let id = self.alloc(kind, span);
        self.nodes[id.index()].parent = Some(parent);
        let children = &mut self.nodes[parent.index()].children;
        let at = children.iter().position(|c| *c == anchor).unwrap_or(children.len());
        children.insert(at, id);
        id
    }

    /// Allocate a node and insert it as a sibling right after `anchor`.
    pub fn insert_after(&mut self, anchor: NodeId, kind: CssNodeKind, span: TextRange) -> NodeId {
        let parent = self.nodes[anchor.index()]
            .parent
            .unwrap_or_else(|| self.root());
        let id = self.alloc(kind, span);
        self.nodes[id.index()].parent = Some(parent);
        let children = &mut self.nodes[parent.index()].children;
        let at = children
            .iter()
            .position(|c| *c == anchor)
            .map(|i| i + 1)
            .unwrap_or(children.len());
        children.insert(at, id);
        id
    }

    /// Unlink a node from its parent. The arena slot stays allocated so ids
    /// held elsewhere keep pointing at valid (if detached) nodes.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.index()].parent.take() {
            self.nodes[parent.index()].children.retain(|c| *c != id);
        }
    }

    /// True when the node is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            match self.nodes[current.index()].parent {
                Some(parent) => current = parent,
                None => return current == self.root(),
            }
        }
    }

    // ============================================================
    // ACCESSORS
    // ============================================================

    pub fn rule_selector(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.index()].kind {
            CssNodeKind::Rule { selector } => Some(selector),
            _ => None,
        }
    }

    pub fn set_rule_selector(&mut self, id: NodeId, selector: String) {
        if let CssNodeKind::Rule { selector: s } = &mut self.nodes[id.index()].kind {
            *s = selector;
        }
    }

    pub fn as_decl(&self, id: NodeId) -> Option<(&SmolStr, &str, bool)> {
        match &self.nodes[id.index()].kind {
            CssNodeKind::Decl { prop, value, important } => Some((prop, value, *important)),
            _ => None,
        }
    }

    pub fn set_decl_value(&mut self, id: NodeId, new_value: String) {
        if let CssNodeKind::Decl { value, .. } = &mut self.nodes[id.index()].kind {
            *value = new_value;
        }
    }

    pub fn as_at_rule(&self, id: NodeId) -> Option<(&SmolStr, &str, bool)> {
        match &self.nodes[id.index()].kind {
            CssNodeKind::AtRule { name, params, has_block } => Some((name, params, *has_block)),
            _ => None,
        }
    }

    pub fn is_rule(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.index()].kind, CssNodeKind::Rule { .. })
    }

    pub fn is_decl(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.index()].kind, CssNodeKind::Decl { .. })
    }

    // ============================================================
    // WALKS (snapshot order: collected before the caller mutates)
    // ============================================================

    /// All rule nodes in document order, depth first.
    pub fn rules(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_rules(self.root(), &mut out);
        out
    }

    fn collect_rules(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for child in &self.nodes[id.index()].children {
            if self.is_rule(*child) {
                out.push(*child);
            }
            self.collect_rules(*child, out);
        }
    }

    /// All at-rule nodes in document order, depth first.
    pub fn at_rules(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            for child in self.nodes[id.index()].children.iter().rev() {
                if matches!(self.nodes[child.index()].kind, CssNodeKind::AtRule { .. }) {
                    out.push(*child);
                }
                stack.push(*child);
            }
        }
        out
    }

    /// All declaration nodes in the whole tree, document order.
    pub fn decls(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            for child in self.nodes[id.index()].children.iter().rev() {
                if self.is_decl(*child) {
                    out.push(*child);
                }
                stack.push(*child);
            }
        }
        out.reverse();
        out
    }

    /// Direct declaration children of one container, document order.
    pub fn decls_of(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes[id.index()]
            .children
            .iter()
            .copied()
            .filter(|c| self.is_decl(*c))
            .collect()
    }

    // ============================================================
    // CROSS-TREE COPIES
    // ============================================================

    /// Deep-copy a subtree out of another tree, appending it under
    /// `dst_parent`. Returns the id of the copied node in this tree.
    pub fn copy_subtree_from(&mut self, src: &CssTree, src_id: NodeId, dst_parent: NodeId) -> NodeId {
        let node = src.node(src_id);
        let id = self.append(dst_parent, node.kind.clone(), node.span);
        for child in &node.children {
            self.copy_subtree_from(src, *child, id);
        }
        id
    }

    /// Deep-copy a subtree out of another tree, inserting it as a sibling
    /// right after `anchor`. Returns the id of the copied node.
    pub fn copy_subtree_after(&mut self, src: &CssTree, src_id: NodeId, anchor: NodeId) -> NodeId {
        let node = src.node(src_id);
        let parent = self.nodes[anchor.index()]
            .parent
            .unwrap_or_else(|| self.root());
        let id = self.alloc(node.kind.clone(), node.span);
        self.nodes[id.index()].parent = Some(parent);
        let children = &mut self.nodes[parent.index()].children;
        let at = children
            .iter()
            .position(|c| *c == anchor)
            .map(|i| i + 1)
            .unwrap_or(children.len());
        children.insert(at, id);
        for child in &node.children {
            self.copy_subtree_from(src, *child, id);
        }
        id
    }

    /// Copy every child of `src_parent` (in order) to the end of
    /// `dst_parent`'s children.
    pub fn append_children_from(&mut self, src: &CssTree, src_parent: NodeId, dst_parent: NodeId) {
        for child in src.children(src_parent).to_vec() {
            self.copy_subtree_from(src, child, dst_parent);
        }
    }

    /// Copy every child of `src_parent` (in order) to the front of
    /// `dst_parent`'s children.
    pub fn prepend_children_from(&mut self, src: &CssTree, src_parent: NodeId, dst_parent: NodeId) {
        let mut copied = Vec::new();
        for child in src.children(src_parent) {
            let node = src.node(*child);
            let id = self.alloc(node.kind.clone(), node.span);
            self.nodes[id.index()].parent = Some(dst_parent);
            for grandchild in &node.children {
                self.copy_subtree_from(src, *grandchild, id);
            }
            copied.push(id);
        }
        let children = &mut self.nodes[dst_parent.index()].children;
        children.splice(0..0, copied);
    }

    // ============================================================
    // STRINGIFY
    // ============================================================

    /// Serialize the attached tree back to CSS text.
    pub fn stringify(&self) -> String {
        let mut out = String::new();
        self.write_children(self.root(), 0, &mut out);
        out
    }

    fn write_children(&self, id: NodeId, depth: usize, out: &mut String) {
        for child in self.children(id) {
            self.write_node(*child, depth, out);
        }
    }

    fn write_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        match &self.nodes[id.index()].kind {
            CssNodeKind::Root => self.write_children(id, depth, out),
            CssNodeKind::Rule { selector } => {
                out.push_str(&indent);
                out.push_str(selector);
                out.push_str(" {\n");
                self.write_children(id, depth + 1, out);
                out.push_str(&indent);
                out.push_str("}\n");
            }
            CssNodeKind::AtRule { name, params, has_block } => {
                out.push_str(&indent);
                out.push('@');
                out.push_str(name);
                if !params.is_empty() {
                    out.push(' ');
                    out.push_str(params);
                }
                if *has_block {
                    out.push_str(" {\n");
                    self.write_children(id, depth + 1, out);
                    out.push_str(&indent);
                    out.push_str("}\n");
                } else {
                    out.push_str(";\n");
                }
            }
            CssNodeKind::Decl { prop, value, important } => {
                out.push_str(&indent);
                out.push_str(prop);
                out.push_str(": ");
                out.push_str(value);
                if *important {
                    out.push_str(" !important");
                }
                out.push_str(";\n");
            }
            CssNodeKind::Comment { text } => {
                out.push_str(&indent);
                out.push_str(text);
                out.push('\n');
            }
        }
    }
}
