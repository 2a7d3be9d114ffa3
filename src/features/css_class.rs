//! Class selectors: registration, import aliasing, namespacing, and
//! `-st-extends` discovery.
//!
//! Analysis registers a [`ClassSymbol`] for every class selector; a class
//! whose name matches an import becomes that import's alias. The transform
//! rewrites each class node to `{namespace}__{name}` of its chain's origin
//! definition. The chain walk itself lives in the resolver.

use super::st_namespace::namespace_class;
use super::st_symbol::{ClassSymbol, StSymbol, SymbolKind};
use super::{AnalyzeContext, Feature, SelectorContext, TransformContext};
use crate::cst::{CssTree, NodeId};
use crate::resolver::origin_definition;
use crate::selector::{parse_selector_list, Selector, SelectorNode};
use smol_str::SmolStr;

pub const EXTENDS_PROP: &str = "-st-extends";

/// True when a class node follows `index` within the same compound.
pub fn check_for_scoped_node_after(nodes: &[SelectorNode], index: usize) -> bool {
    for node in &nodes[index + 1..] {
        match node {
            SelectorNode::Combinator { .. } => break,
            SelectorNode::Class { .. } => return true,
            _ => {}
        }
    }
    false
}

/// The class a directive declaration attaches to: the rule's selector must
/// be a single plain class.
fn single_class_target(tree: &CssTree, rule: NodeId) -> Option<SmolStr> {
    let selector = tree.rule_selector(rule)?;
    let list = parse_selector_list(selector);
    match list.selectors.as_slice() {
        [single] => match single.nodes.as_slice() {
            [SelectorNode::Class { name }] => Some(name.clone()),
            _ => None,
        },
        _ => None,
    }
}

pub struct CssClassFeature;

impl Feature for CssClassFeature {
    fn analyze_selector_node(
        &self,
        ctx: &mut AnalyzeContext<'_>,
        rule: NodeId,
        selector: &Selector,
        index: usize,
    ) {
        let SelectorNode::Class { name } = &selector.nodes[index] else {
            return;
        };
        let name = name.clone();
        if ctx.meta.symbols.get_kind(&name, SymbolKind::Class).is_some() {
            return;
        }
        let alias = ctx.meta.symbols.get(&name).and_then(StSymbol::as_import).cloned();
        let safe_redeclare = alias.is_some();
        let span = ctx.meta.tree.span(rule);
        ctx.meta.symbols.add_symbol(
            StSymbol::Class(ClassSymbol {
                name,
                alias,
                extends: None,
                is_root: false,
            }),
            safe_redeclare,
            ctx.diagnostics,
            Some(span),
        );
    }

    fn analyze_declaration(&self, ctx: &mut AnalyzeContext<'_>, rule: NodeId, decl: NodeId) {
        let target = match ctx.meta.tree.as_decl(decl) {
            Some((prop, value, _)) if prop == EXTENDS_PROP => {
                match value.split_whitespace().next() {
                    Some(word) => SmolStr::new(word),
                    None => return,
                }
            }
            _ => return,
        };
        let Some(class_name) = single_class_target(&ctx.meta.tree, rule) else {
            return;
        };
        if let Some(StSymbol::Class(class)) = ctx.meta.symbols.get_mut(&class_name) {
            class.extends = Some(target);
        }
    }

    fn transform_selector_node(
        &self,
        ctx: &TransformContext<'_, '_>,
        sel: &mut SelectorContext,
        selector: &mut Selector,
        index: usize,
    ) {
        let SelectorNode::Class { name } = &selector.nodes[index] else {
            return;
        };
        let name = name.clone();
        let resolved = ctx.transformer.resolved_symbols(ctx.sheet);
        let (unit, target) = match resolved.class.get(&name).and_then(|chain| origin_definition(chain))
        {
            Some(origin) => (origin.unit.clone(), origin.symbol.name().clone()),
            None => (ctx.sheet.source.clone(), name),
        };
        let namespace = ctx
            .transformer
            .namespace_of(&unit)
            .unwrap_or_else(|| ctx.sheet.namespace.clone());
        selector.nodes[index] = SelectorNode::Class {
            name: namespace_class(&namespace, &target).into(),
        };
        sel.scoped = true;
    }

    fn transform_last_pass(&self, _ctx: &TransformContext<'_, '_>, tree: &mut CssTree) {
        for decl in tree.decls() {
            if tree
                .as_decl(decl)
                .is_some_and(|(prop, _, _)| prop == EXTENDS_PROP)
            {
                tree.detach(decl);
            }
        }
    }
}
