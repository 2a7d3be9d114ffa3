//! Per-sheet compilation unit.
//!
//! A [`StyleSheet`] owns everything analysis produced for one source file:
//! the parsed tree, the symbol table, the per-rule mixin records, the
//! variable dependency graph, and the finalized analysis diagnostics. One
//! symbol table per unit, for the unit's lifetime; transformation reads
//! sheets immutably and works on a clone of the tree.

use crate::cst::{CssTree, NodeId};
use crate::diagnostics::Diagnostic;
use crate::features::st_mixin::RefedMixin;
use crate::features::st_symbol::{StSymbol, SymbolTable};
use crate::value::evaluate::referenced_value_names;
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    /// A `*.st.css` sheet: directives apply, selectors are scoped.
    Stitch,
    /// Plain CSS: parsed and resolvable, but never rewritten.
    Css,
}

impl SheetKind {
    pub fn from_source(source: &str) -> SheetKind {
        if source.ends_with(".st.css") {
            SheetKind::Stitch
        } else {
            SheetKind::Css
        }
    }
}

/// Default namespace: sanitized file stem of the source path.
pub fn default_namespace(source: &str) -> SmolStr {
    let base = source.rsplit('/').next().unwrap_or(source);
    let stem = base
        .strip_suffix(".st.css")
        .or_else(|| base.strip_suffix(".css"))
        .unwrap_or(base);
    let sanitized: String = stem
        .chars()
        .map(|c| {
            if unicode_ident::is_xid_continue(c) || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if sanitized.is_empty() {
        SmolStr::new_static("unnamed")
    } else {
        SmolStr::new(sanitized)
    }
}

#[derive(Debug, Clone)]
pub struct StyleSheet {
    pub source: Arc<str>,
    pub text: String,
    pub kind: SheetKind,
    pub namespace: SmolStr,
    pub root_class: SmolStr,
    /// Source tree as analyzed. Transformation clones it; node ids in the
    /// clone match, which keeps the mixin records valid for both.
    pub tree: CssTree,
    pub symbols: SymbolTable,
    /// Mixin usages recorded during analysis, keyed by the owning rule.
    mixins: IndexMap<NodeId, Vec<RefedMixin>>,
    /// `var A references var B` edges, sealed at the end of analysis.
    var_refs: FxHashMap<SmolStr, Vec<SmolStr>>,
    /// Finalized analysis diagnostics.
    pub diagnostics: Vec<Diagnostic>,
}

impl StyleSheet {
    pub fn new(source: impl Into<Arc<str>>, text: String, tree: CssTree) -> StyleSheet {
        let source = source.into();
        let kind = SheetKind::from_source(&source);
        let namespace = default_namespace(&source);
        StyleSheet {
            source,
            text,
            kind,
            namespace,
            root_class: SmolStr::new_static("root"),
            tree,
            symbols: SymbolTable::default(),
            mixins: IndexMap::default(),
            var_refs: FxHashMap::default(),
            diagnostics: Vec::new(),
        }
    }

    pub fn is_stitch(&self) -> bool {
        self.kind == SheetKind::Stitch
    }

    /// Directory part of the source path, empty for bare names.
    pub fn source_dir(&self) -> &str {
        match self.source.rfind('/') {
            Some(i) => &self.source[..i],
            None => "",
        }
    }

    pub fn set_rule_mixins(&mut self, rule: NodeId, mixins: Vec<RefedMixin>) {
        self.mixins.insert(rule, mixins);
    }

    pub fn rule_mixins(&self, rule: NodeId) -> Option<&[RefedMixin]> {
        self.mixins.get(&rule).map(Vec::as_slice)
    }

    pub fn has_mixins(&self) -> bool {
        !self.mixins.is_empty()
    }

    /// Build the variable dependency graph from the recorded var symbols.
    /// Called once when analysis of the sheet completes.
    pub fn seal_var_graph(&mut self) {
        let mut graph = FxHashMap::default();
        for symbol in self.symbols.iter() {
            if let StSymbol::Var(var) = symbol {
                let refs = referenced_value_names(&var.text);
                if !refs.is_empty() {
                    graph.insert(var.name.clone(), refs);
                }
            }
        }
        self.var_refs = graph;
    }

    /// Transitive closure of `keys` over the variable dependency graph: a
    /// variable whose definition references a closed variable is closed too.
    pub fn closed_var_set<I>(&self, keys: I) -> FxHashSet<SmolStr>
    where
        I: IntoIterator<Item = SmolStr>,
    {
        let mut closed: FxHashSet<SmolStr> = keys.into_iter().collect();
        loop {
            let before = closed.len();
            for (name, refs) in &self.var_refs {
                if !closed.contains(name) && refs.iter().any(|r| closed.contains(r)) {
                    closed.insert(name.clone());
                }
            }
            if closed.len() == before {
                break;
            }
        }
        closed
    }
}
