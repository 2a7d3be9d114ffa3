//! Analyze and transform drivers.
//!
//! [`analyze`] runs the single analysis pass over one source: parse, feature
//! hooks in document order, variable graph sealing. [`Transformer`] runs the
//! transform stage against a whole [`Project`], memoizing per-unit symbol
//! resolution so concurrent unit transforms share it. The transform never
//! touches the analyzed tree; it works on a clone, which keeps node ids
//! valid across both.

use crate::cst::{parse_css, CssTree, NodeId};
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::features::st_mixin::ExpansionKey;
use crate::features::{AnalyzeContext, SelectorContext, TransformContext, FEATURES};
use crate::meta::StyleSheet;
use crate::project::{Project, ProviderModule};
use crate::resolver::{ResolvedSymbols, Resolver};
use crate::selector::parse_selector_list;
use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::sync::Arc;
use tracing::debug;

// ============================================================
// ANALYZE
// ============================================================

/// Parse and analyze one source into a finished [`StyleSheet`].
pub fn analyze(source: impl Into<Arc<str>>, text: impl Into<String>) -> StyleSheet {
    let text = text.into();
    let parsed = parse_css(&text);
    let mut sheet = StyleSheet::new(source, text, parsed.tree);
    debug!(unit = %sheet.source, "analyze");

    let diagnostics = Diagnostics::new();
    for diagnostic in parsed.diagnostics {
        diagnostics.push(diagnostic);
    }

    {
        let mut ctx = AnalyzeContext { meta: &mut sheet, diagnostics: &diagnostics };
        for feature in FEATURES {
            feature.meta_init(&mut ctx);
        }
        let root = ctx.meta.tree.root();
        analyze_children(&mut ctx, root, None);
    }

    sheet.seal_var_graph();
    sheet.diagnostics = diagnostics.take();
    sheet
}

fn analyze_children(ctx: &mut AnalyzeContext<'_>, parent: NodeId, rule: Option<NodeId>) {
    // Snapshot: feature hooks may append symbols but never restructure the
    // tree during analysis.
    let children = ctx.meta.tree.children(parent).to_vec();
    for child in children {
        analyze_node(ctx, child, rule);
    }
}

fn analyze_node(ctx: &mut AnalyzeContext<'_>, node: NodeId, rule: Option<NodeId>) {
    enum Visit {
        AtRule,
        Rule(String),
        Decl,
        Other,
    }
    let visit = {
        let tree = &ctx.meta.tree;
        if tree.as_at_rule(node).is_some() {
            Visit::AtRule
        } else if let Some(selector) = tree.rule_selector(node) {
            Visit::Rule(selector.to_string())
        } else if tree.is_decl(node) {
            Visit::Decl
        } else {
            Visit::Other
        }
    };
    match visit {
        Visit::AtRule => {
            for feature in FEATURES {
                feature.analyze_at_rule(ctx, node);
            }
            analyze_children(ctx, node, None);
        }
        Visit::Rule(selector) => {
            let list = parse_selector_list(&selector);
            for selector in &list.selectors {
                for index in 0..selector.nodes.len() {
                    for feature in FEATURES {
                        feature.analyze_selector_node(ctx, node, selector, index);
                    }
                }
            }
            analyze_children(ctx, node, Some(node));
        }
        Visit::Decl => {
            if let Some(rule) = rule {
                for feature in FEATURES {
                    feature.analyze_declaration(ctx, rule, node);
                }
            }
        }
        Visit::Other => {}
    }
}

// ============================================================
// TRANSFORM
// ============================================================

/// Result of transforming one unit.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub tree: CssTree,
    pub diagnostics: Vec<Diagnostic>,
}

impl TransformOutput {
    pub fn css(&self) -> String {
        self.tree.stringify()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

pub struct Transformer<'p> {
    project: &'p Project,
    resolved: RwLock<FxHashMap<Arc<str>, Arc<ResolvedSymbols>>>,
}

impl<'p> Transformer<'p> {
    pub fn new(project: &'p Project) -> Self {
        Transformer {
            project,
            resolved: RwLock::new(FxHashMap::default()),
        }
    }

    /// Resolution set of one unit, computed once per transformer.
    pub fn resolved_symbols(&self, sheet: &StyleSheet) -> Arc<ResolvedSymbols> {
        if let Some(found) = self.resolved.read().get(&sheet.source) {
            return found.clone();
        }
        let computed = Arc::new(Resolver::new(self.project).resolve_symbols(sheet));
        self.resolved
            .write()
            .entry(sheet.source.clone())
            .or_insert(computed)
            .clone()
    }

    pub fn namespace_of(&self, unit: &str) -> Option<SmolStr> {
        self.project.sheet(unit).map(|sheet| sheet.namespace.clone())
    }

    pub(crate) fn sheet(&self, unit: &str) -> Option<&'p StyleSheet> {
        self.project.sheet(unit)
    }

    pub(crate) fn provider(&self, request: &str) -> Option<&'p ProviderModule> {
        self.project.provider(request)
    }

    /// Transform one unit on a clone of its analyzed tree. Plain CSS passes
    /// through untouched.
    pub fn transform(&self, sheet: &StyleSheet) -> TransformOutput {
        let mut tree = sheet.tree.clone();
        let diagnostics = Diagnostics::new();
        if sheet.is_stitch() {
            debug!(unit = %sheet.source, "transform");
            self.run_passes(sheet, &mut tree, None, &[], false, &diagnostics);
        }
        TransformOutput { tree, diagnostics: diagnostics.take() }
    }

    /// Re-entrant transform of a mixin fragment in its defining sheet's
    /// context, with the expansion path extended by the caller.
    pub(crate) fn transform_fragment(
        &self,
        sheet: &StyleSheet,
        tree: &mut CssTree,
        overrides: Option<&IndexMap<SmolStr, String>>,
        path: &[ExpansionKey],
        diagnostics: &Diagnostics,
    ) {
        self.run_passes(sheet, tree, overrides, path, true, diagnostics);
    }

    fn run_passes(
        &self,
        sheet: &StyleSheet,
        tree: &mut CssTree,
        overrides: Option<&IndexMap<SmolStr, String>>,
        path: &[ExpansionKey],
        fragment: bool,
        diagnostics: &Diagnostics,
    ) {
        let ctx = TransformContext {
            sheet,
            transformer: self,
            diagnostics,
            overrides,
            path,
            fragment,
        };

        for rule in tree.rules() {
            let Some(selector) = tree.rule_selector(rule).map(str::to_string) else {
                continue;
            };
            let mut list = parse_selector_list(&selector);
            if list.is_empty() {
                continue;
            }
            let span = tree.span(rule);
            for selector in &mut list.selectors {
                let mut sel = SelectorContext { rule, span, scoped: false };
                for index in 0..selector.nodes.len() {
                    for feature in FEATURES {
                        feature.transform_selector_node(&ctx, &mut sel, selector, index);
                    }
                }
            }
            tree.set_rule_selector(rule, list.to_string());
        }

        for feature in FEATURES {
            feature.transform_last_pass(&ctx, tree);
        }
    }
}
