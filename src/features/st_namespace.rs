//! `@st-namespace` override and class namespacing format.

use super::{AnalyzeContext, Feature, TransformContext};
use crate::cst::{CssTree, NodeId};
use crate::diagnostics::{codes, Diagnostic};
use crate::selector::is_ident;
use smol_str::SmolStr;

pub const AT_RULE: &str = "st-namespace";

/// Scoped output name of a sheet-local symbol.
pub fn namespace_class(namespace: &str, name: &str) -> String {
    format!("{namespace}__{name}")
}

/// Parse `@st-namespace "name";` params.
pub fn parse_namespace_params(params: &str) -> Result<SmolStr, String> {
    let trimmed = params.trim();
    let inner = trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .or_else(|| {
            trimmed
                .strip_prefix('\'')
                .and_then(|rest| rest.strip_suffix('\''))
        })
        .ok_or("expected a quoted string")?;
    if inner.trim().is_empty() {
        return Err("empty namespace".to_string());
    }
    let inner = inner.trim();
    if !is_ident(inner) {
        return Err(format!("invalid namespace \"{inner}\""));
    }
    Ok(SmolStr::new(inner))
}

pub struct StNamespaceFeature;

impl Feature for StNamespaceFeature {
    fn analyze_at_rule(&self, ctx: &mut AnalyzeContext<'_>, node: NodeId) {
        let (name, params) = match ctx.meta.tree.as_at_rule(node) {
            Some((name, params, _)) => (name.clone(), params.to_string()),
            None => return,
        };
        if name != AT_RULE {
            return;
        }
        let span = ctx.meta.tree.span(node);
        match parse_namespace_params(&params) {
            Ok(namespace) => ctx.meta.namespace = namespace,
            Err(reason) => {
                ctx.diagnostics.push(
                    Diagnostic::warning(
                        codes::INVALID_NAMESPACE,
                        format!("invalid @st-namespace: {reason}"),
                    )
                    .with_span(span),
                );
            }
        }
    }

    fn transform_last_pass(&self, _ctx: &TransformContext<'_, '_>, tree: &mut CssTree) {
        for node in tree.at_rules() {
            if tree.as_at_rule(node).is_some_and(|(name, _, _)| name == AT_RULE) {
                tree.detach(node);
            }
        }
    }
}
