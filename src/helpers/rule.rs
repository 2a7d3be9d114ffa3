//! Rule subset extraction and mixin merging.
//!
//! [`create_subset`] pulls the rules belonging to one symbol out of a sheet's
//! source tree, replacing the matched selector node with `&` so the result is
//! relative to whatever rule it later lands in. [`merge_rules`] is the other
//! half: it folds such a fragment into a target rule, declarations ahead of
//! the mixin directive (so the target's own declarations keep winning) and
//! nested rules chained in after the target.

use crate::cst::{CssNodeKind, CssTree, NodeId};
use crate::diagnostics::{codes, Diagnostic, Diagnostics};
use crate::features::st_var::VARS_SELECTOR;
use crate::selector::{
    parse_selector_list, CombinatorKind, Selector, SelectorList, SelectorNode,
};

/// Conditional at-rules that subset extraction recurses into. Anything else
/// at the top level is not part of a symbol's rule body.
const CONDITIONAL_AT_RULES: &[&str] = &["media", "supports"];

/// Copy the rules of `src` whose first compound contains `prefix` into a new
/// fragment tree, with every occurrence of `prefix` replaced by `&`.
///
/// With `is_root_target` (mixing a sheet's root class) every rule is kept;
/// selectors that never mention the prefix are nested under `&` as
/// descendants instead.
pub fn create_subset(src: &CssTree, prefix: &SelectorNode, is_root_target: bool) -> CssTree {
    let mut out = CssTree::new();
    let out_root = out.root();
    subset_into(src, src.root(), prefix, is_root_target, &mut out, out_root);
    out
}

fn subset_into(
    src: &CssTree,
    from: NodeId,
    prefix: &SelectorNode,
    is_root_target: bool,
    out: &mut CssTree,
    out_parent: NodeId,
) {
    for child in src.children(from).to_vec() {
        if let Some(selector) = src.rule_selector(child) {
            if selector.trim() == VARS_SELECTOR {
                continue;
            }
            let list = parse_selector_list(selector);
            let mut matched: Vec<Selector> = Vec::new();
            for sel in list.selectors {
                let hit = first_compound_contains(&sel, prefix);
                if hit || is_root_target {
                    matched.push(rescope_to_nesting(sel, prefix, hit));
                }
            }
            if matched.is_empty() {
                continue;
            }
            let selector = SelectorList { selectors: matched }.to_string();
            let rule = out.append(
                out_parent,
                CssNodeKind::Rule { selector },
                src.span(child),
            );
            for grandchild in src.children(child).to_vec() {
                out.copy_subtree_from(src, grandchild, rule);
            }
        } else if let Some((name, params, has_block)) = src.as_at_rule(child) {
            if !has_block || !CONDITIONAL_AT_RULES.contains(&name.as_str()) {
                continue;
            }
            let at_rule = out.append(
                out_parent,
                CssNodeKind::AtRule {
                    name: name.clone(),
                    params: params.to_string(),
                    has_block: true,
                },
                src.span(child),
            );
            subset_into(src, child, prefix, is_root_target, out, at_rule);
            if out.children(at_rule).is_empty() {
                out.detach(at_rule);
            }
        }
    }
}

fn first_compound_contains(sel: &Selector, prefix: &SelectorNode) -> bool {
    sel.first_compound().iter().any(|node| node == prefix)
}

fn rescope_to_nesting(mut sel: Selector, prefix: &SelectorNode, had_match: bool) -> Selector {
    if had_match {
        for node in &mut sel.nodes {
            if node == prefix {
                *node = SelectorNode::Nesting;
            }
        }
    } else {
        sel.nodes.splice(
            0..0,
            [
                SelectorNode::Nesting,
                SelectorNode::Combinator { kind: CombinatorKind::Space },
            ],
        );
    }
    sel
}

/// Re-scope a fragment selector against the target rule's selector: `&` is
/// substituted, anything else becomes a descendant. Selector lists combine
/// as a cross product.
pub fn scope_nested_selector(target: &str, nested: &str) -> String {
    let target_list = parse_selector_list(target);
    let nested_list = parse_selector_list(nested);
    let mut out: Vec<String> = Vec::new();
    for target_sel in &target_list.selectors {
        let target_text = target_sel.to_string();
        for nested_sel in &nested_list.selectors {
            let has_nesting = nested_sel
                .nodes
                .iter()
                .any(|node| matches!(node, SelectorNode::Nesting));
            if has_nesting {
                let mut scoped = nested_sel.clone();
                for node in &mut scoped.nodes {
                    if matches!(node, SelectorNode::Nesting) {
                        *node = SelectorNode::Invalid { text: target_text.clone() };
                    }
                }
                out.push(scoped.to_string());
            } else {
                out.push(format!("{target_text} {nested_sel}"));
            }
        }
    }
    out.join(", ")
}

/// Merge a transformed mixin fragment into `target_rule`.
///
/// Root-level declarations and the declarations of a top-level `&` rule are
/// inserted before `anchor_decl` (the mixin directive), so the target's own
/// later declarations override them. Every other rule and at-rule is copied
/// after the target rule in fragment order, its selectors re-scoped onto the
/// target's selector.
pub fn merge_rules(
    fragment: &CssTree,
    tree: &mut CssTree,
    target_rule: NodeId,
    anchor_decl: NodeId,
    diagnostics: &Diagnostics,
) {
    let Some(target_selector) = tree.rule_selector(target_rule).map(str::to_string) else {
        return;
    };
    let mut mixin_root: Option<NodeId> = None;
    let mut next_rule = target_rule;

    for child in fragment.children(fragment.root()).to_vec() {
        match fragment.kind(child) {
            CssNodeKind::Decl { .. } => {
                tree.insert_before(
                    anchor_decl,
                    fragment.kind(child).clone(),
                    fragment.span(child),
                );
            }
            CssNodeKind::Rule { selector }
                if selector.trim() == "&" && mixin_root.is_none() =>
            {
                mixin_root = Some(child);
                for decl in fragment.decls_of(child) {
                    tree.insert_before(
                        anchor_decl,
                        fragment.kind(decl).clone(),
                        fragment.span(decl),
                    );
                }
            }
            CssNodeKind::Rule { selector } => {
                let list = parse_selector_list(selector);
                if list.is_empty() {
                    diagnostics.push(
                        Diagnostic::warning(
                            codes::INVALID_MERGE_OF,
                            format!("invalid merge of: \"{selector}\""),
                        )
                        .with_span(fragment.span(child)),
                    );
                    continue;
                }
                let scoped = scope_nested_selector(&target_selector, selector);
                let copied = tree.copy_subtree_after(fragment, child, next_rule);
                tree.set_rule_selector(copied, scoped);
                next_rule = copied;
            }
            CssNodeKind::AtRule { .. } => {
                let copied = tree.copy_subtree_after(fragment, child, next_rule);
                rescope_rules_in(tree, copied, &target_selector);
                next_rule = copied;
            }
            _ => {}
        }
    }
}

fn rescope_rules_in(tree: &mut CssTree, at_rule: NodeId, target_selector: &str) {
    for child in tree.children(at_rule).to_vec() {
        if let Some(selector) = tree.rule_selector(child) {
            let scoped = scope_nested_selector(target_selector, selector);
            tree.set_rule_selector(child, scoped);
        } else if tree.as_at_rule(child).is_some() {
            rescope_rules_in(tree, child, target_selector);
        }
    }
}
