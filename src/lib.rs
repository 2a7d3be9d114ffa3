//! # stitch
//!
//! Core library for Stitch CSS parsing, symbol resolution, and mixin
//! expansion. A `*.st.css` sheet analyzes into a [`meta::StyleSheet`];
//! a [`project::Project`] holds the unit graph and the
//! [`transformer::Transformer`] rewrites each unit to plain namespaced CSS.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project     → unit graph, provider registry, parallel drivers
//!   ↓
//! transformer → analyze walk, transform passes, fragment re-entry
//!   ↓
//! features    → per-capability analyze/transform hooks
//!   ↓
//! resolver    → import following, extends chains
//!   ↓
//! helpers     → rule subsetting, merging, url rebasing
//!   ↓
//! cst/selector/value → parsers and trees
//!   ↓
//! meta/diagnostics   → per-unit model, problem reporting
//! ```

// ============================================================================
// MODULES (dependency order: cst → selector → value → meta → features →
// resolver → helpers → transformer → project)
// ============================================================================

/// Arena-backed CSS tree and the block parser
pub mod cst;

/// Selector AST and parser
pub mod selector;

/// Declaration value AST, argument extraction, `value()` evaluation
pub mod value;

/// Per-unit compilation model: symbols, mixin records, variable graph
pub mod meta;

/// Diagnostic types, codes, and the per-pass sink
pub mod diagnostics;

/// Feature hooks: symbols, imports, namespace, vars, mixins, classes, types
pub mod features;

/// Cross-unit resolution: imports, extends chains, provider bindings
pub mod resolver;

/// Tree surgery shared by the mixin engine
pub mod helpers;

/// Analyze and transform drivers
pub mod transformer;

/// Unit graph, provider registry, parallel batch entry points
pub mod project;

// Re-export the toplevel surface
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use meta::{SheetKind, StyleSheet};
pub use project::{
    MixinObject, MixinObjectValue, MixinProvider, Project, ProjectError, ProviderError,
    ProviderExport, ProviderModule,
};
pub use transformer::{analyze, TransformOutput, Transformer};
