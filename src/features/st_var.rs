//! `:vars` variable definitions and `value()` resolution.
//!
//! A rule whose selector is exactly `:vars` defines one variable per
//! declaration. The last pass removes those rules and substitutes
//! `value(..)` in every remaining non-directive declaration, override map
//! first. Variable scope is the defining sheet.

use super::st_symbol::{StSymbol, SymbolTable, VarSymbol};
use super::{AnalyzeContext, Feature, TransformContext};
use crate::cst::{CssTree, NodeId};
use crate::value::evaluate::{Evaluator, VarLookup};
use indexmap::IndexMap;
use smol_str::SmolStr;

pub const VARS_SELECTOR: &str = ":vars";

pub(crate) fn is_vars_rule(tree: &CssTree, rule: NodeId) -> bool {
    tree.rule_selector(rule)
        .is_some_and(|selector| selector.trim() == VARS_SELECTOR)
}

/// [`VarLookup`] over a sheet's symbols with an optional override map in
/// front.
pub(crate) struct SheetVars<'a> {
    symbols: &'a SymbolTable,
    overrides: Option<&'a IndexMap<SmolStr, String>>,
}

impl<'a> SheetVars<'a> {
    pub(crate) fn new(
        symbols: &'a SymbolTable,
        overrides: Option<&'a IndexMap<SmolStr, String>>,
    ) -> Self {
        SheetVars { symbols, overrides }
    }
}

impl VarLookup for SheetVars<'_> {
    fn raw(&self, name: &str) -> Option<&str> {
        if let Some(overrides) = self.overrides {
            if let Some(value) = overrides.get(name) {
                return Some(value);
            }
        }
        match self.symbols.get(name) {
            Some(StSymbol::Var(var)) => Some(&var.text),
            _ => None,
        }
    }
}

pub struct StVarFeature;

impl Feature for StVarFeature {
    fn analyze_declaration(&self, ctx: &mut AnalyzeContext<'_>, rule: NodeId, decl: NodeId) {
        if !is_vars_rule(&ctx.meta.tree, rule) {
            return;
        }
        let Some((prop, value, _)) = ctx.meta.tree.as_decl(decl) else {
            return;
        };
        let symbol = StSymbol::Var(VarSymbol {
            name: prop.clone(),
            text: value.to_string(),
        });
        let span = ctx.meta.tree.span(decl);
        ctx.meta
            .symbols
            .add_symbol(symbol, false, ctx.diagnostics, Some(span));
    }

    fn transform_last_pass(&self, ctx: &TransformContext<'_, '_>, tree: &mut CssTree) {
        for rule in tree.rules() {
            if is_vars_rule(tree, rule) {
                tree.detach(rule);
            }
        }

        let lookup = SheetVars::new(&ctx.sheet.symbols, ctx.overrides);
        let evaluator = Evaluator::new(&lookup);
        for decl in tree.decls() {
            let value = match tree.as_decl(decl) {
                Some((prop, value, _))
                    if !prop.starts_with("-st-") && value.contains("value(") =>
                {
                    value.to_string()
                }
                _ => continue,
            };
            let span = tree.span(decl);
            let resolved = evaluator.evaluate(&value, ctx.diagnostics, Some(span));
            if resolved != value {
                tree.set_decl_value(decl, resolved);
            }
        }
    }
}
