//! Diagnostic types shared by analysis and transformation.
//!
//! Compilation never aborts on a bad construct: features report problems
//! through a [`Diagnostics`] sink attached to the current pass and keep
//! going. Warnings leave output intact; errors drop the offending construct
//! from output while the rest of the sheet still compiles.

use smol_str::SmolStr;
use std::cell::RefCell;
use text_size::TextRange;

// ============================================================
// SEVERITY
// ============================================================

/// Severity of a diagnostic. The pipeline only distinguishes recoverable
/// warnings from construct-dropping errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn display(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

// ============================================================
// DIAGNOSTIC
// ============================================================

/// A single problem found in one sheet, located by source span and an
/// optional highlighted word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub span: Option<TextRange>,
    pub word: Option<SmolStr>,
}

impl Diagnostic {
    pub fn warning(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            span: None,
            word: None,
        }
    }

    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            span: None,
            word: None,
        }
    }

    pub fn with_span(mut self, span: TextRange) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_word(mut self, word: impl Into<SmolStr>) -> Self {
        self.word = Some(word.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

// ============================================================
// DIAGNOSTIC CODES
// ============================================================

/// Stable diagnostic codes, grouped per feature area.
pub mod codes {
    // 00xxx: tokenizer / block parser recovery
    pub const PARSE: &str = "00100";

    // 01xxx: symbol table
    pub const REDECLARE_SYMBOL: &str = "01100";

    // 02xxx: imports
    pub const INVALID_ST_IMPORT: &str = "02100";
    pub const UNRESOLVED_IMPORT: &str = "02101";

    // 03xxx: variables and value evaluation
    pub const UNKNOWN_VAR: &str = "03100";
    pub const CYCLIC_VALUE: &str = "03101";

    // 04xxx: selectors
    pub const INVALID_FUNCTIONAL_SELECTOR: &str = "04100";
    pub const UNSCOPED_TYPE_SELECTOR: &str = "04101";

    // 05xxx: mixins
    pub const UNKNOWN_MIXIN: &str = "05100";
    pub const OVERRIDE_MIXIN: &str = "05101";
    pub const PARTIAL_MIXIN_MISSING_ARGUMENTS: &str = "05102";
    pub const CIRCULAR_MIXIN: &str = "05103";
    pub const UNKNOWN_MIXIN_SYMBOL: &str = "05104";
    pub const FAILED_TO_APPLY_MIXIN: &str = "05105";
    pub const MIXIN_NOT_A_FUNC: &str = "05106";
    pub const VALUE_CANNOT_BE_STRING: &str = "05107";
    pub const INVALID_NAMED_PARAMS: &str = "05108";
    pub const INVALID_MERGE_OF: &str = "05109";

    // st-namespace
    pub const INVALID_NAMESPACE: &str = "06100";
}

// ============================================================
// COLLECTOR
// ============================================================

/// Per-pass diagnostic sink.
///
/// Interior mutability lets feature hooks push through a shared reference
/// while the pass holds the sheet or working tree mutably. The sink never
/// fails and never throws; callers drain it with [`Diagnostics::take`] when
/// the pass completes.
#[derive(Debug, Default)]
pub struct Diagnostics {
    inner: RefCell<Vec<Diagnostic>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, diagnostic: Diagnostic) {
        self.inner.borrow_mut().push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.inner.borrow().iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.len() - self.error_count()
    }

    pub fn has_errors(&self) -> bool {
        self.inner.borrow().iter().any(|d| d.is_error())
    }

    /// Drain all collected diagnostics, leaving the sink empty.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.inner.borrow_mut())
    }

    /// Snapshot of the collected diagnostics.
    pub fn to_vec(&self) -> Vec<Diagnostic> {
        self.inner.borrow().clone()
    }
}
