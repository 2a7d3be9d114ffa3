//! `:vars` definitions and `value()` substitution in output.

use crate::helpers::project_helpers::{assert_clean, find_code, transform_source};
use crate::helpers::source_fixtures::VARS_AND_USAGE;
use stitch::diagnostics::codes;

#[test]
fn test_vars_substituted_and_rule_removed() {
    let out = transform_source("entry.st.css", VARS_AND_USAGE);
    assert_clean(&out);
    assert_eq!(
        out.css(),
        ".entry__btn {\n  color: red;\n  border: 1px solid red;\n}\n"
    );
}

#[test]
fn test_value_inside_function_argument() {
    let out = transform_source(
        "entry.st.css",
        ":vars { alpha: 0.5; }\n.btn { color: rgba(0, 0, 0, value(alpha)); }",
    );
    assert_clean(&out);
    assert_eq!(out.css(), ".entry__btn {\n  color: rgba(0, 0, 0, 0.5);\n}\n");
}

#[test]
fn test_unknown_var_warns_and_keeps_call() {
    let out = transform_source("entry.st.css", ".btn { color: value(missing); }");
    let diag = find_code(&out.diagnostics, codes::UNKNOWN_VAR);
    assert!(!diag.is_error());
    assert_eq!(diag.word.as_deref(), Some("missing"));
    assert_eq!(out.css(), ".entry__btn {\n  color: value(missing);\n}\n");
}

#[test]
fn test_cyclic_var_definition_warns() {
    let out = transform_source(
        "entry.st.css",
        ":vars { a: value(b); b: value(a); }\n.btn { color: value(a); }",
    );
    let diag = find_code(&out.diagnostics, codes::CYCLIC_VALUE);
    assert!(diag.message.contains("a -> b -> a"));
    assert_eq!(out.css(), ".entry__btn {\n  color: value(a);\n}\n");
}

#[test]
fn test_vars_rule_alone_leaves_empty_output() {
    let out = transform_source("entry.st.css", ":vars { a: red; }");
    assert_clean(&out);
    assert_eq!(out.css(), "");
}
