//! Type selectors: component roots, native elements, and scoping checks.
//!
//! An uppercase-initial type selector names a component root and gets an
//! [`ElementSymbol`] during analysis, aliased to a same-named import when
//! one exists. The transform rewrites resolved component roots to the class
//! of their origin definition. Lowercase native elements pass through
//! untouched, but must be scoped by a class somewhere in their compound.

use super::css_class::check_for_scoped_node_after;
use super::st_namespace::namespace_class;
use super::st_symbol::{ElementSymbol, StSymbol, SymbolKind};
use super::{AnalyzeContext, Feature, SelectorContext, TransformContext};
use crate::cst::NodeId;
use crate::diagnostics::{codes, Diagnostic};
use crate::resolver::origin_definition;
use crate::selector::{is_comp_root, Selector, SelectorNode};

/// Register an element symbol for a component-root type selector. Native
/// lowercase elements never become symbols.
pub(crate) fn add_type(ctx: &mut AnalyzeContext<'_>, name: &str, rule: Option<NodeId>) {
    if !is_comp_root(name) || ctx.meta.symbols.get_kind(name, SymbolKind::Element).is_some() {
        return;
    }
    let alias = ctx.meta.symbols.get(name).and_then(StSymbol::as_import).cloned();
    let safe_redeclare = alias.is_some();
    let span = rule.map(|rule| ctx.meta.tree.span(rule));
    ctx.meta.symbols.add_symbol(
        StSymbol::Element(ElementSymbol {
            name: name.into(),
            alias,
        }),
        safe_redeclare,
        ctx.diagnostics,
        span,
    );
}

/// Check that the type selector at `index` is scoped, either by an earlier
/// node in the walk or by a class later in the same compound. Reports when
/// it is not and `report_unscoped` holds. Never reports in plain CSS.
pub(crate) fn validate_type_scoping(
    ctx: &TransformContext<'_, '_>,
    sel: &mut SelectorContext,
    selector: &Selector,
    index: usize,
    report_unscoped: bool,
) -> bool {
    if !ctx.sheet.is_stitch() || sel.scoped {
        return true;
    }
    if check_for_scoped_node_after(&selector.nodes, index) {
        sel.scoped = true;
        return true;
    }
    if report_unscoped {
        if let SelectorNode::Type { name, .. } = &selector.nodes[index] {
            ctx.diagnostics.push(
                Diagnostic::warning(
                    codes::UNSCOPED_TYPE_SELECTOR,
                    format!(
                        "unscoped type selector \"{name}\" will affect all elements of the same type in the document"
                    ),
                )
                .with_span(sel.span)
                .with_word(name.clone()),
            );
        }
    }
    false
}

pub struct CssTypeFeature;

impl Feature for CssTypeFeature {
    fn analyze_selector_node(
        &self,
        ctx: &mut AnalyzeContext<'_>,
        rule: NodeId,
        selector: &Selector,
        index: usize,
    ) {
        let SelectorNode::Type { name, nodes } = &selector.nodes[index] else {
            return;
        };
        if nodes.is_some() {
            let text = selector.nodes[index].to_string();
            let span = ctx.meta.tree.span(rule);
            ctx.diagnostics.push(
                Diagnostic::error(
                    codes::INVALID_FUNCTIONAL_SELECTOR,
                    format!("\"{text}\" type is not functional"),
                )
                .with_span(span)
                .with_word(text),
            );
        }
        add_type(ctx, name, Some(rule));
    }

    fn transform_selector_node(
        &self,
        ctx: &TransformContext<'_, '_>,
        sel: &mut SelectorContext,
        selector: &mut Selector,
        index: usize,
    ) {
        let SelectorNode::Type { name, .. } = &selector.nodes[index] else {
            return;
        };
        let name = name.clone();
        let resolved = ctx.transformer.resolved_symbols(ctx.sheet);
        match resolved.element.get(&name) {
            Some(chain) if chain.len() > 1 => {
                let Some(origin) = origin_definition(chain) else {
                    return;
                };
                match &origin.symbol {
                    StSymbol::Class(class) => {
                        // The component root is a class in its own unit.
                        let namespace = ctx
                            .transformer
                            .namespace_of(&origin.unit)
                            .unwrap_or_else(|| ctx.sheet.namespace.clone());
                        selector.nodes[index] = SelectorNode::Class {
                            name: namespace_class(&namespace, &class.name).into(),
                        };
                        sel.scoped = true;
                    }
                    other => {
                        selector.nodes[index] = SelectorNode::Type {
                            name: other.name().clone(),
                            nodes: None,
                        };
                    }
                }
            }
            _ => {
                validate_type_scoping(ctx, sel, selector, index, !ctx.fragment);
            }
        }
    }
}
