//! `-st-mixin` and `-st-partial-mixin` expansion.
//!
//! Analysis parses mixin directives into per-rule [`RefedMixin`] records;
//! the transform expands each record into the working tree. A CSS mixin
//! copies the defining sheet's matching rules through [`create_subset`],
//! transforms the fragment in the defining sheet's context, and merges it at
//! the directive's position. A provider mixin calls the bound export and
//! merges its returned object the same way. Expansion is re-entrant;
//! `TransformContext::path` carries the active expansion keys for cycle
//! detection.

use super::st_symbol::{StSymbol, SymbolTable};
use super::st_var::SheetVars;
use super::{AnalyzeContext, Feature, TransformContext};
use crate::cst::{CssNodeKind, CssTree, NodeId};
use crate::diagnostics::{codes, Diagnostic, Diagnostics};
use crate::helpers::rule::{create_subset, merge_rules};
use crate::helpers::url::fix_relative_urls;
use crate::meta::StyleSheet;
use crate::project::{MixinObject, MixinObjectValue, ProviderExport};
use crate::resolver::{CssResolve, MainKind, ProviderBinding, ResolvedSymbols};
use crate::selector::SelectorNode;
use crate::value::args::{get_formatter_args, get_named_args};
use crate::value::evaluate::{referenced_value_names, Evaluator};
use crate::value::{parse_value, stringify, ValueNodeKind};
use indexmap::IndexMap;
use smol_str::SmolStr;
use std::fmt;
use std::sync::Arc;
use text_size::TextRange;
use tracing::{debug, trace};

pub const MIXIN_PROP: &str = "-st-mixin";
pub const PARTIAL_MIXIN_PROP: &str = "-st-partial-mixin";

pub fn is_mixin_prop(prop: &str) -> bool {
    prop == MIXIN_PROP || prop == PARTIAL_MIXIN_PROP
}

// ============================================================
// RECORDS
// ============================================================

/// Identity of one expansion: the defining unit plus the name being
/// expanded. A foreign sheet root collapses to `"default"` so every route
/// to the same root compares equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpansionKey {
    pub unit: Arc<str>,
    pub name: SmolStr,
}

impl fmt::Display for ExpansionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {}", self.name, self.unit)
    }
}

/// Call options as written at the usage site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MixinOptions {
    Positional(Vec<String>),
    Named(IndexMap<SmolStr, String>),
}

impl MixinOptions {
    pub fn is_empty(&self) -> bool {
        match self {
            MixinOptions::Positional(args) => args.is_empty(),
            MixinOptions::Named(named) => named.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixinValue {
    pub target: SmolStr,
    pub options: MixinOptions,
    pub partial: bool,
    /// The directive declaration, used as the merge anchor.
    pub origin_decl: NodeId,
}

/// A mixin usage bound to the local symbol it targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefedMixin {
    pub mixin: MixinValue,
    pub symbol: StSymbol,
}

/// Expected option form of a target, decided before parsing its call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OptionShape {
    Positional,
    Named,
}

// ============================================================
// DIRECTIVE PARSING
// ============================================================

/// Parse one directive value into mixin records. Entries split at top-level
/// commas; each entry is a bare name or a call.
fn parse_mixin_decl(
    value: &str,
    partial: bool,
    origin_decl: NodeId,
    span: TextRange,
    shape_of: &dyn Fn(&str) -> OptionShape,
    diagnostics: &Diagnostics,
) -> Vec<MixinValue> {
    let nodes = parse_value(value);
    let mut groups: Vec<Vec<&crate::value::ValueNode>> = vec![Vec::new()];
    for node in &nodes {
        if matches!(node.kind, ValueNodeKind::Div { ch: ',', .. }) {
            groups.push(Vec::new());
        } else if let Some(last) = groups.last_mut() {
            last.push(node);
        }
    }

    let mut mixins = Vec::new();
    for group in groups {
        let Some(first) = group.iter().find(|n| {
            !matches!(n.kind, ValueNodeKind::Space { .. } | ValueNodeKind::Comment { .. })
        }) else {
            continue;
        };
        match &first.kind {
            ValueNodeKind::Str { .. } => {
                diagnostics.push(
                    Diagnostic::error(
                        codes::VALUE_CANNOT_BE_STRING,
                        "value can not be a string (remove quotes?)",
                    )
                    .with_span(span),
                );
            }
            ValueNodeKind::Word { text } => {
                let options = match shape_of(text) {
                    OptionShape::Positional => MixinOptions::Positional(Vec::new()),
                    OptionShape::Named => MixinOptions::Named(IndexMap::new()),
                };
                mixins.push(MixinValue {
                    target: SmolStr::new(text),
                    options,
                    partial,
                    origin_decl,
                });
            }
            ValueNodeKind::Func { name, .. } if !name.is_empty() => {
                let options = match shape_of(name) {
                    OptionShape::Positional => MixinOptions::Positional(get_formatter_args(
                        first, false, None, false,
                    )),
                    OptionShape::Named => match parse_named_options(first, span, diagnostics) {
                        Some(named) => MixinOptions::Named(named),
                        None => continue,
                    },
                };
                mixins.push(MixinValue {
                    target: SmolStr::new(name),
                    options,
                    partial,
                    origin_decl,
                });
            }
            _ => {}
        }
    }
    mixins
}

/// `name value` pairs of a named-form call. Any malformed pair invalidates
/// the whole entry.
fn parse_named_options(
    node: &crate::value::ValueNode,
    span: TextRange,
    diagnostics: &Diagnostics,
) -> Option<IndexMap<SmolStr, String>> {
    let mut named = IndexMap::new();
    for group in get_named_args(node) {
        let invalid = || {
            diagnostics.push(
                Diagnostic::error(
                    codes::INVALID_NAMED_PARAMS,
                    "invalid named parameters (e.g. \"func(name value, [name value, ...])\")",
                )
                .with_span(span),
            );
        };
        let Some(name) = group.first().and_then(|n| n.as_word()) else {
            invalid();
            return None;
        };
        let value = stringify(&group[1..]).trim().to_string();
        if value.is_empty() {
            invalid();
            return None;
        }
        named.insert(SmolStr::new(name), value);
    }
    Some(named)
}

// ============================================================
// COLLECTION
// ============================================================

/// Parse a directive declaration and bind each entry to its local symbol,
/// merging with the rule's previously collected records. A later directive
/// of the same form replaces the earlier one with a warning; the opposite
/// form survives ahead of the new entries.
fn collect_decl_mixins(
    symbols: &SymbolTable,
    tree: &CssTree,
    decl: NodeId,
    previous: Option<&[RefedMixin]>,
    shape_of: &dyn Fn(&str) -> OptionShape,
    diagnostics: &Diagnostics,
) -> Vec<RefedMixin> {
    let Some((prop, value, _)) = tree.as_decl(decl) else {
        return previous.map(<[RefedMixin]>::to_vec).unwrap_or_default();
    };
    let prop = prop.clone();
    let partial = prop == PARTIAL_MIXIN_PROP;
    let span = tree.span(decl);

    let parsed = parse_mixin_decl(value, partial, decl, span, shape_of, diagnostics);
    let mut fresh = Vec::new();
    for mixin in parsed {
        let symbol = match symbols.get(&mixin.target) {
            Some(symbol @ (StSymbol::Import(_) | StSymbol::Class(_) | StSymbol::Element(_))) => {
                symbol.clone()
            }
            _ => {
                diagnostics.push(
                    Diagnostic::warning(
                        codes::UNKNOWN_MIXIN,
                        format!("unknown mixin: \"{}\"", mixin.target),
                    )
                    .with_span(span)
                    .with_word(mixin.target.clone()),
                );
                continue;
            }
        };
        if partial && mixin.options.is_empty() {
            diagnostics.push(
                Diagnostic::warning(
                    codes::PARTIAL_MIXIN_MISSING_ARGUMENTS,
                    format!(
                        "partial mixin usage without override arguments: \"{}\"",
                        mixin.target
                    ),
                )
                .with_span(span)
                .with_word(mixin.target.clone()),
            );
        }
        fresh.push(RefedMixin { mixin, symbol });
    }

    let mut result = Vec::new();
    if let Some(previous) = previous {
        let (partials, non_partials): (Vec<_>, Vec<_>) = previous
            .iter()
            .cloned()
            .partition(|refed| refed.mixin.partial);
        let same_form_overridden = if partial { !partials.is_empty() } else { !non_partials.is_empty() };
        if same_form_overridden && !fresh.is_empty() {
            diagnostics.push(
                Diagnostic::warning(
                    codes::OVERRIDE_MIXIN,
                    format!("override mixin on same rule: \"{prop}\""),
                )
                .with_span(span),
            );
        }
        result = if partial { non_partials } else { partials };
    }
    result.extend(fresh);
    result
}

/// Option shape during analysis, before cross-unit resolution exists: a
/// binding imported from a non-CSS module takes positional arguments.
fn analyze_shape(symbols: &SymbolTable, name: &str) -> OptionShape {
    match symbols.get(name).and_then(StSymbol::import_ref) {
        Some(import) if !import.request.ends_with(".css") => OptionShape::Positional,
        _ => OptionShape::Named,
    }
}

fn transform_shape(resolved: &ResolvedSymbols, name: &str) -> OptionShape {
    match resolved.main_namespace.get(name) {
        Some(MainKind::Js) => OptionShape::Positional,
        _ => OptionShape::Named,
    }
}

// ============================================================
// FEATURE
// ============================================================

pub struct StMixinFeature;

impl Feature for StMixinFeature {
    fn analyze_declaration(&self, ctx: &mut AnalyzeContext<'_>, rule: NodeId, decl: NodeId) {
        let is_directive = ctx
            .meta
            .tree
            .as_decl(decl)
            .is_some_and(|(prop, _, _)| is_mixin_prop(prop));
        if !is_directive {
            return;
        }
        let mixins = {
            let meta = &*ctx.meta;
            let shape = |name: &str| analyze_shape(&meta.symbols, name);
            collect_decl_mixins(
                &meta.symbols,
                &meta.tree,
                decl,
                meta.rule_mixins(rule),
                &shape,
                ctx.diagnostics,
            )
        };
        if !mixins.is_empty() {
            ctx.meta.set_rule_mixins(rule, mixins);
        }
    }

    fn transform_last_pass(&self, ctx: &TransformContext<'_, '_>, tree: &mut CssTree) {
        let resolved = ctx.transformer.resolved_symbols(ctx.sheet);
        for rule in tree.rules() {
            let directives: Vec<NodeId> = tree
                .decls_of(rule)
                .into_iter()
                .filter(|decl| {
                    tree.as_decl(*decl)
                        .is_some_and(|(prop, _, _)| is_mixin_prop(prop))
                })
                .collect();
            if directives.is_empty() {
                continue;
            }

            let shape = |name: &str| transform_shape(&resolved, name);
            let mut collected: Vec<RefedMixin> = Vec::new();
            for decl in &directives {
                let previous = if collected.is_empty() {
                    None
                } else {
                    Some(collected.as_slice())
                };
                collected = collect_decl_mixins(
                    &ctx.sheet.symbols,
                    tree,
                    *decl,
                    previous,
                    &shape,
                    ctx.diagnostics,
                );
            }

            for refed in &collected {
                append_mixin(ctx, &resolved, tree, rule, refed);
            }
            for decl in directives {
                tree.detach(decl);
            }
        }
    }
}

// ============================================================
// EXPANSION
// ============================================================

fn append_mixin(
    ctx: &TransformContext<'_, '_>,
    resolved: &ResolvedSymbols,
    tree: &mut CssTree,
    rule: NodeId,
    refed: &RefedMixin,
) {
    let target = &refed.mixin.target;
    trace!(unit = %ctx.sheet.source, mixin = %target, "expand mixin");
    match resolved.main_namespace.get(target) {
        Some(MainKind::Class) => {
            if let Some(chain) = resolved.class.get(target) {
                apply_css_mixin(ctx, tree, rule, refed, chain);
                return;
            }
        }
        Some(MainKind::Element) => {
            if let Some(chain) = resolved.element.get(target) {
                apply_css_mixin(ctx, tree, rule, refed, chain);
                return;
            }
        }
        Some(MainKind::Js) => {
            if let Some(binding) = resolved.js.get(target) {
                apply_provider_mixin(ctx, tree, rule, refed, binding);
                return;
            }
        }
        _ => {}
    }
    ctx.diagnostics.push(
        Diagnostic::error(
            codes::UNKNOWN_MIXIN_SYMBOL,
            format!("cannot mixin unknown symbol \"{target}\""),
        )
        .with_span(tree.span(refed.mixin.origin_decl))
        .with_word(target.clone()),
    );
}

fn cycle_detected(ctx: &TransformContext<'_, '_>, key: &ExpansionKey, span: TextRange) -> bool {
    if !ctx.path.contains(key) {
        return false;
    }
    let mut chain: Vec<String> = ctx.path.iter().map(ToString::to_string).collect();
    chain.push(key.to_string());
    ctx.diagnostics.push(
        Diagnostic::warning(
            codes::CIRCULAR_MIXIN,
            format!("circular mixin found: {}", chain.join(" --> ")),
        )
        .with_span(span),
    );
    true
}

/// Expansion identity of a CSS mixin target. Mixing in a foreign sheet's
/// root collapses to the `"default"` binding so a two-file root cycle is
/// caught no matter which local names the files use.
fn css_expansion_key(sheet: &StyleSheet, entry: &CssResolve) -> ExpansionKey {
    let foreign_root =
        entry.symbol.as_class().is_some_and(|class| class.is_root) && entry.unit != sheet.source;
    let name = if foreign_root {
        SmolStr::new_static("default")
    } else {
        entry.symbol.name().clone()
    };
    ExpansionKey { unit: entry.unit.clone(), name }
}

fn has_onward_link(symbol: &StSymbol) -> bool {
    match symbol {
        StSymbol::Class(class) => class.extends.is_some() || class.alias.is_some(),
        StSymbol::Element(element) => element.alias.is_some(),
        _ => false,
    }
}

fn apply_css_mixin(
    ctx: &TransformContext<'_, '_>,
    tree: &mut CssTree,
    rule: NodeId,
    refed: &RefedMixin,
    chain: &[CssResolve],
) {
    let Some(first) = chain.first() else {
        return;
    };
    let span = tree.span(refed.mixin.origin_decl);
    let key = css_expansion_key(ctx.sheet, first);
    if cycle_detected(ctx, &key, span) {
        return;
    }

    // Override arguments resolve in the mixing sheet's context, with any
    // outer overrides still active.
    let overrides: Option<IndexMap<SmolStr, String>> = match &refed.mixin.options {
        MixinOptions::Named(named) if !named.is_empty() => {
            let lookup = SheetVars::new(&ctx.sheet.symbols, ctx.overrides);
            let evaluator = Evaluator::new(&lookup);
            Some(
                named
                    .iter()
                    .map(|(name, value)| {
                        (
                            name.clone(),
                            evaluator.evaluate(value, ctx.diagnostics, Some(span)),
                        )
                    })
                    .collect(),
            )
        }
        _ => None,
    };
    if refed.mixin.partial && overrides.is_none() {
        return;
    }

    let mut path = ctx.path.to_vec();
    path.push(key);

    let mut fragments: Vec<CssTree> = Vec::new();
    for entry in chain {
        let Some(def_sheet) = ctx.transformer.sheet(&entry.unit) else {
            break;
        };
        let prefix = match &entry.symbol {
            StSymbol::Class(class) => SelectorNode::Class { name: class.name.clone() },
            StSymbol::Element(element) => {
                SelectorNode::Type { name: element.name.clone(), nodes: None }
            }
            _ => break,
        };
        let root_target = entry.symbol.as_class().is_some_and(|class| class.is_root);
        let mut fragment = create_subset(&def_sheet.tree, &prefix, root_target);
        if refed.mixin.partial {
            if let Some(named) = &overrides {
                filter_partial_decls(def_sheet, &mut fragment, named);
            }
        }
        ctx.transformer.transform_fragment(
            def_sheet,
            &mut fragment,
            overrides.as_ref(),
            &path,
            ctx.diagnostics,
        );
        if !fragment.children(fragment.root()).is_empty() {
            fragments.push(fragment);
        }
        if !has_onward_link(&entry.symbol) {
            break;
        }
    }

    if fragments.is_empty() {
        return;
    }
    debug!(
        unit = %ctx.sheet.source,
        mixin = %refed.mixin.target,
        fragments = fragments.len(),
        "merge css mixin"
    );
    if let [single] = fragments.as_slice() {
        merge_rules(single, tree, rule, refed.mixin.origin_decl, ctx.diagnostics);
        return;
    }
    // An extends chain flattens base-first: each fragment is prepended so
    // the deepest base lands at the top of the combined output.
    let mut combined = CssTree::new();
    let combined_root = combined.root();
    for fragment in &fragments {
        combined.prepend_children_from(fragment, fragment.root(), combined_root);
    }
    merge_rules(&combined, tree, rule, refed.mixin.origin_decl, ctx.diagnostics);
}

/// Keep only declarations whose values reference an overridden variable,
/// directly or through the defining sheet's dependency graph. Rules emptied
/// by the filter are dropped.
fn filter_partial_decls(
    def_sheet: &StyleSheet,
    tree: &mut CssTree,
    overrides: &IndexMap<SmolStr, String>,
) {
    let closed = def_sheet.closed_var_set(overrides.keys().cloned());
    for decl in tree.decls() {
        let keep = tree.as_decl(decl).is_some_and(|(_, value, _)| {
            referenced_value_names(value)
                .iter()
                .any(|name| closed.contains(name))
        });
        if !keep {
            let parent = tree.parent(decl);
            tree.detach(decl);
            if let Some(parent) = parent {
                prune_empty_containers(tree, parent);
            }
        }
    }
}

fn prune_empty_containers(tree: &mut CssTree, mut node: NodeId) {
    while node != tree.root()
        && tree.children(node).is_empty()
        && (tree.is_rule(node) || tree.as_at_rule(node).is_some())
    {
        let parent = tree.parent(node);
        tree.detach(node);
        match parent {
            Some(parent) => node = parent,
            None => break,
        }
    }
}

// ============================================================
// PROVIDER MIXINS
// ============================================================

fn apply_provider_mixin(
    ctx: &TransformContext<'_, '_>,
    tree: &mut CssTree,
    rule: NodeId,
    refed: &RefedMixin,
    binding: &ProviderBinding,
) {
    let span = tree.span(refed.mixin.origin_decl);
    let target = &refed.mixin.target;
    let key = ExpansionKey {
        unit: Arc::from(binding.request.as_str()),
        name: binding.export.clone(),
    };
    if cycle_detected(ctx, &key, span) {
        return;
    }

    let export = ctx
        .transformer
        .provider(&binding.request)
        .and_then(|module| module.export(&binding.export));
    let provider = match export {
        Some(ProviderExport::Mixin(provider)) => provider.clone(),
        Some(ProviderExport::Value(_)) => {
            ctx.diagnostics.push(
                Diagnostic::error(
                    codes::MIXIN_NOT_A_FUNC,
                    format!("mixin \"{target}\" is not a function"),
                )
                .with_span(span)
                .with_word(target.clone()),
            );
            return;
        }
        None => {
            ctx.diagnostics.push(
                Diagnostic::error(
                    codes::UNKNOWN_MIXIN_SYMBOL,
                    format!("cannot mixin unknown symbol \"{target}\""),
                )
                .with_span(span)
                .with_word(target.clone()),
            );
            return;
        }
    };

    let args: Vec<String> = match &refed.mixin.options {
        MixinOptions::Positional(args) => args.clone(),
        MixinOptions::Named(_) => Vec::new(),
    };
    let object = match provider.apply(&args) {
        Ok(object) => object,
        Err(error) => {
            ctx.diagnostics.push(
                Diagnostic::error(
                    codes::FAILED_TO_APPLY_MIXIN,
                    format!("could not apply mixin: {error}"),
                )
                .with_span(span)
                .with_word(target.clone()),
            );
            return;
        }
    };

    let mut fragment = CssTree::new();
    let fragment_root = fragment.root();
    object_into_tree(&object, &mut fragment, fragment_root);

    // Provider output transforms in the importing sheet's context.
    let mut path = ctx.path.to_vec();
    path.push(key);
    ctx.transformer
        .transform_fragment(ctx.sheet, &mut fragment, ctx.overrides, &path, ctx.diagnostics);
    fix_relative_urls(
        &mut fragment,
        provider_dir(&binding.request),
        ctx.sheet.source_dir(),
    );
    merge_rules(&fragment, tree, rule, refed.mixin.origin_decl, ctx.diagnostics);
}

fn provider_dir(request: &str) -> &str {
    match request.rfind('/') {
        Some(i) => &request[..i],
        None => "",
    }
}

fn object_into_tree(object: &MixinObject, tree: &mut CssTree, parent: NodeId) {
    for (key, value) in object.entries() {
        match value {
            MixinObjectValue::Decl(text) => {
                let (value, important) = provider_decl_value(text);
                tree.append(
                    parent,
                    CssNodeKind::Decl { prop: key.clone(), value, important },
                    TextRange::default(),
                );
            }
            MixinObjectValue::Nested(nested) => {
                let rule = tree.append(
                    parent,
                    CssNodeKind::Rule { selector: key.to_string() },
                    TextRange::default(),
                );
                object_into_tree(nested, tree, rule);
            }
        }
    }
}

fn provider_decl_value(text: &str) -> (String, bool) {
    let trimmed = text.trim();
    match trimmed.strip_suffix("!important") {
        Some(rest) => (rest.trim_end().to_string(), true),
        None => (trimmed.to_string(), false),
    }
}
