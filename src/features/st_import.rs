//! `@st-import` parsing and symbol registration.
//!
//! `@st-import Default, [named, remote as local] from "./other.st.css";`
//! registers one [`ImportSymbol`] per binding during analysis and is removed
//! from output in the last pass. A bare `@st-import "./reset.css";` is a
//! side-effect import with no bindings.

use super::st_symbol::{ImportSymbol, StSymbol, SymbolKind};
use super::{AnalyzeContext, Feature, TransformContext};
use crate::cst::{CssTree, NodeId};
use crate::diagnostics::{codes, Diagnostic};
use crate::selector::is_ident;
use smol_str::SmolStr;

pub const AT_RULE: &str = "st-import";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedImport {
    pub default: Option<SmolStr>,
    /// `(imported, local)` pairs from the named block.
    pub named: Vec<(SmolStr, SmolStr)>,
    pub request: String,
}

/// Parse `@st-import` params. The request is the trailing quoted string;
/// everything before a closing `from` is bindings.
pub fn parse_import_params(params: &str) -> Result<ParsedImport, String> {
    let trimmed = params.trim();
    let Some(quote) = trimmed.chars().last().filter(|c| *c == '"' || *c == '\'') else {
        return Err("missing request string".to_string());
    };
    let body = &trimmed[..trimmed.len() - 1];
    let Some(open) = body.rfind(quote) else {
        return Err("unterminated request string".to_string());
    };
    let request = body[open + 1..].to_string();
    if request.is_empty() {
        return Err("empty request".to_string());
    }

    let head = body[..open].trim_end();
    if head.is_empty() {
        // side-effect import
        return Ok(ParsedImport { request, ..Default::default() });
    }
    let Some(bindings) = head
        .strip_suffix("from")
        .filter(|rest| rest.is_empty() || rest.ends_with(char::is_whitespace))
    else {
        return Err("missing \"from\"".to_string());
    };

    let (default, named) = parse_bindings(bindings)?;
    Ok(ParsedImport { default, named, request })
}

fn parse_bindings(text: &str) -> Result<(Option<SmolStr>, Vec<(SmolStr, SmolStr)>), String> {
    let mut default: Option<SmolStr> = None;
    let mut named: Vec<(SmolStr, SmolStr)> = Vec::new();
    let mut remaining = text.trim();

    while !remaining.is_empty() {
        if let Some(rest) = remaining.strip_prefix(',') {
            remaining = rest.trim_start();
            continue;
        }
        if let Some(rest) = remaining.strip_prefix('[') {
            let close = rest.find(']').ok_or("unclosed named block")?;
            for entry in rest[..close].split(',') {
                let entry = entry.trim();
                if entry.is_empty() {
                    continue;
                }
                named.push(parse_named_entry(entry)?);
            }
            remaining = rest[close + 1..].trim_start();
            continue;
        }
        let end = remaining
            .find(|c| c == ',' || c == '[')
            .unwrap_or(remaining.len());
        let segment = remaining[..end].trim();
        if !segment.is_empty() {
            if !is_ident(segment) {
                return Err(format!("invalid binding \"{segment}\""));
            }
            if default.is_some() {
                return Err("multiple default bindings".to_string());
            }
            default = Some(SmolStr::new(segment));
        }
        remaining = remaining[end..].trim_start();
    }
    Ok((default, named))
}

fn parse_named_entry(entry: &str) -> Result<(SmolStr, SmolStr), String> {
    let parts: Vec<&str> = entry.split_whitespace().collect();
    match parts.as_slice() {
        [name] if is_ident(name) => Ok((SmolStr::new(name), SmolStr::new(name))),
        [name, "as", local] if is_ident(name) && is_ident(local) => {
            Ok((SmolStr::new(name), SmolStr::new(local)))
        }
        _ => Err(format!("invalid named binding \"{entry}\"")),
    }
}

pub struct StImportFeature;

impl Feature for StImportFeature {
    fn analyze_at_rule(&self, ctx: &mut AnalyzeContext<'_>, node: NodeId) {
        let (name, params) = match ctx.meta.tree.as_at_rule(node) {
            Some((name, params, _)) => (name.clone(), params.to_string()),
            None => return,
        };
        if name != AT_RULE {
            return;
        }
        let span = ctx.meta.tree.span(node);
        if ctx.meta.tree.parent(node) != Some(ctx.meta.tree.root()) {
            ctx.diagnostics.push(
                Diagnostic::warning(
                    codes::INVALID_ST_IMPORT,
                    "@st-import cannot be used inside a scope",
                )
                .with_span(span),
            );
            return;
        }
        match parse_import_params(&params) {
            Ok(parsed) => {
                if let Some(default) = parsed.default {
                    ctx.meta.symbols.add_symbol(
                        StSymbol::Import(ImportSymbol {
                            name: default,
                            imported: SmolStr::new_static("default"),
                            request: parsed.request.clone(),
                        }),
                        false,
                        ctx.diagnostics,
                        Some(span),
                    );
                }
                for (imported, local) in parsed.named {
                    ctx.meta.symbols.add_symbol(
                        StSymbol::Import(ImportSymbol {
                            name: local,
                            imported,
                            request: parsed.request.clone(),
                        }),
                        false,
                        ctx.diagnostics,
                        Some(span),
                    );
                }
            }
            Err(reason) => {
                ctx.diagnostics.push(
                    Diagnostic::warning(
                        codes::INVALID_ST_IMPORT,
                        format!("invalid @st-import: {reason}"),
                    )
                    .with_span(span),
                );
            }
        }
    }

    fn transform_last_pass(&self, ctx: &TransformContext<'_, '_>, tree: &mut CssTree) {
        // Report once per unit, not per fragment re-entry.
        if !ctx.fragment {
            let resolved = ctx.transformer.resolved_symbols(ctx.sheet);
            for symbol in ctx.sheet.symbols.get_all_by_type(SymbolKind::Import) {
                let name = symbol.name();
                if !resolved.main_namespace.contains_key(name) {
                    let request = symbol
                        .as_import()
                        .map(|import| import.request.as_str())
                        .unwrap_or_default();
                    ctx.diagnostics.push(
                        Diagnostic::warning(
                            codes::UNRESOLVED_IMPORT,
                            format!("cannot resolve \"{name}\" from \"{request}\""),
                        )
                        .with_word(name.clone()),
                    );
                }
            }
        }

        for node in tree.at_rules() {
            if tree.as_at_rule(node).is_some_and(|(name, _, _)| name == AT_RULE) {
                tree.detach(node);
            }
        }
    }
}
