//! `value()` substitution in declaration values.
//!
//! The evaluator rewrites `value(name)` calls through a [`VarLookup`]
//! (override map first, then the sheet's variable symbols), recursing into
//! the fetched raw text. Unresolved names and self-referential definitions
//! are reported as warnings and the call keeps its source text.

use super::{parse_value, stringify, ValueNode, ValueNodeKind};
use crate::diagnostics::{codes, Diagnostic, Diagnostics};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use text_size::TextRange;
use tracing::trace;

/// Raw variable text source. Implementations consult the active override
/// map before the defining sheet's symbols.
pub trait VarLookup {
    fn raw(&self, name: &str) -> Option<&str>;
}

pub struct Evaluator<'a> {
    lookup: &'a dyn VarLookup,
    custom_props: Option<&'a FxHashMap<SmolStr, SmolStr>>,
}

impl<'a> Evaluator<'a> {
    pub fn new(lookup: &'a dyn VarLookup) -> Self {
        Evaluator { lookup, custom_props: None }
    }

    /// Rename mapping applied to the first `var(--x)` argument.
    pub fn with_custom_props(mut self, map: &'a FxHashMap<SmolStr, SmolStr>) -> Self {
        self.custom_props = Some(map);
        self
    }

    /// Resolve every `value(..)` call in `text` and return the final value.
    pub fn evaluate(
        &self,
        text: &str,
        diagnostics: &Diagnostics,
        span: Option<TextRange>,
    ) -> String {
        let mut nodes = parse_value(text);
        let mut trail: Vec<SmolStr> = Vec::new();
        self.evaluate_nodes(&mut nodes, &mut trail, diagnostics, span);
        stringify(&nodes)
    }

    fn evaluate_nodes(
        &self,
        nodes: &mut [ValueNode],
        trail: &mut Vec<SmolStr>,
        diagnostics: &Diagnostics,
        span: Option<TextRange>,
    ) {
        for node in nodes.iter_mut() {
            let ValueNodeKind::Func { name, nodes: inner } = &mut node.kind else {
                continue;
            };
            if name == "value" {
                let Some(var_name) = first_word(inner) else {
                    continue;
                };
                if trail.contains(&var_name) {
                    let start = trail.iter().position(|n| n == &var_name).unwrap_or(0);
                    let mut chain: Vec<&str> =
                        trail[start..].iter().map(SmolStr::as_str).collect();
                    chain.push(var_name.as_str());
                    let mut diagnostic = Diagnostic::warning(
                        codes::CYCLIC_VALUE,
                        format!(
                            "cyclic value definition detected: \"{}\"",
                            chain.join(" -> ")
                        ),
                    )
                    .with_word(var_name.clone());
                    if let Some(span) = span {
                        diagnostic = diagnostic.with_span(span);
                    }
                    diagnostics.push(diagnostic);
                    continue;
                }
                match self.lookup.raw(&var_name) {
                    Some(raw) => {
                        trace!(var = %var_name, "substitute value()");
                        let mut raw_nodes = parse_value(raw);
                        trail.push(var_name.clone());
                        self.evaluate_nodes(&mut raw_nodes, trail, diagnostics, span);
                        trail.pop();
                        node.resolved = Some(stringify(&raw_nodes));
                    }
                    None => {
                        let mut diagnostic = Diagnostic::warning(
                            codes::UNKNOWN_VAR,
                            format!("unknown var \"{var_name}\""),
                        )
                        .with_word(var_name);
                        if let Some(span) = span {
                            diagnostic = diagnostic.with_span(span);
                        }
                        diagnostics.push(diagnostic);
                    }
                }
            } else {
                if name == "var" {
                    if let Some(map) = self.custom_props {
                        rename_custom_prop(inner, map);
                    }
                }
                // Fallbacks and arguments may contain value() calls.
                self.evaluate_nodes(inner, trail, diagnostics, span);
            }
        }
    }
}

fn rename_custom_prop(nodes: &mut [ValueNode], map: &FxHashMap<SmolStr, SmolStr>) {
    for node in nodes.iter_mut() {
        if let ValueNodeKind::Word { text } = &node.kind {
            if let Some(renamed) = map.get(text.as_str()) {
                node.resolved = Some(renamed.to_string());
            }
            return;
        }
    }
}

fn first_word(nodes: &[ValueNode]) -> Option<SmolStr> {
    nodes.iter().find_map(|n| n.as_word().map(SmolStr::new))
}

/// Variable names referenced through `value(..)` anywhere in `text`.
pub fn referenced_value_names(text: &str) -> Vec<SmolStr> {
    fn collect(nodes: &[ValueNode], names: &mut Vec<SmolStr>) {
        for node in nodes {
            if let ValueNodeKind::Func { name, nodes } = &node.kind {
                if name == "value" {
                    if let Some(word) = first_word(nodes) {
                        names.push(word);
                    }
                }
                collect(nodes, names);
            }
        }
    }
    let mut names = Vec::new();
    collect(&parse_value(text), &mut names);
    names
}
