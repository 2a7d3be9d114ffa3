//! Feature hook pipeline.
//!
//! Every language capability is a [`Feature`]: a unit struct with hook
//! methods for the analyze and transform passes, all defaulting to no-ops so
//! a feature only implements the stages it participates in. The pipeline
//! dispatches to [`FEATURES`] in a fixed order; symbol bookkeeping runs
//! before the features that consume it, and the variable pass must precede
//! the mixin pass so mixin subtrees see resolved values.

pub mod css_class;
pub mod css_type;
pub mod st_import;
pub mod st_mixin;
pub mod st_namespace;
pub mod st_symbol;
pub mod st_var;

use crate::cst::{CssTree, NodeId};
use crate::diagnostics::Diagnostics;
use crate::meta::StyleSheet;
use crate::selector::Selector;
use crate::transformer::Transformer;
use indexmap::IndexMap;
use smol_str::SmolStr;
use st_mixin::ExpansionKey;
use text_size::TextRange;

/// Analysis-stage context: the unit being built plus its diagnostics sink.
pub struct AnalyzeContext<'a> {
    pub meta: &'a mut StyleSheet,
    pub diagnostics: &'a Diagnostics,
}

/// Transform-stage context, shared by selector rewriting and last passes.
///
/// The analyzed sheet is read-only here; mutation happens on the working
/// tree handed to [`Feature::transform_last_pass`]. Nested mixin expansion
/// re-enters the transformer through `transformer` with an extended `path`.
pub struct TransformContext<'a, 'p> {
    pub sheet: &'a StyleSheet,
    pub transformer: &'a Transformer<'p>,
    pub diagnostics: &'a Diagnostics,
    /// Active variable overrides (mixin arguments), outermost call first.
    pub overrides: Option<&'a IndexMap<SmolStr, String>>,
    /// Mixin expansion path leading to this pass, empty for a unit's own
    /// transform.
    pub path: &'a [ExpansionKey],
    /// True when transforming a mixin fragment rather than a whole unit;
    /// suppresses per-unit reporting such as unscoped-type warnings.
    pub fragment: bool,
}

/// Per-selector walk state for the transform stage.
pub struct SelectorContext {
    pub rule: NodeId,
    pub span: TextRange,
    /// A node earlier in this selector already scopes it locally.
    pub scoped: bool,
}

pub trait Feature {
    /// Seed the sheet before any node is visited.
    fn meta_init(&self, _ctx: &mut AnalyzeContext<'_>) {}

    fn analyze_at_rule(&self, _ctx: &mut AnalyzeContext<'_>, _node: NodeId) {}

    fn analyze_selector_node(
        &self,
        _ctx: &mut AnalyzeContext<'_>,
        _rule: NodeId,
        _selector: &Selector,
        _index: usize,
    ) {
    }

    fn analyze_declaration(&self, _ctx: &mut AnalyzeContext<'_>, _rule: NodeId, _decl: NodeId) {}

    fn transform_selector_node(
        &self,
        _ctx: &TransformContext<'_, '_>,
        _sel: &mut SelectorContext,
        _selector: &mut Selector,
        _index: usize,
    ) {
    }

    /// Tree-level pass run after selector rewriting, in feature order. All
    /// directive removal happens here.
    fn transform_last_pass(&self, _ctx: &TransformContext<'_, '_>, _tree: &mut CssTree) {}
}

/// Pipeline order. Load-bearing: symbols before consumers, imports and
/// namespace before resolution-dependent features, variables before mixins.
pub const FEATURES: &[&dyn Feature] = &[
    &st_symbol::StSymbolFeature,
    &st_import::StImportFeature,
    &st_namespace::StNamespaceFeature,
    &st_var::StVarFeature,
    &st_mixin::StMixinFeature,
    &css_class::CssClassFeature,
    &css_type::CssTypeFeature,
];
