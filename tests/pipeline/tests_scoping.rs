//! Selector scoping through the full analyze/transform pipeline.

use crate::helpers::project_helpers::{assert_clean, find_code, transform_source};
use crate::helpers::source_fixtures::SIMPLE_CLASSES;
use stitch::diagnostics::codes;

#[test]
fn test_classes_scoped_by_file_stem() {
    let out = transform_source("basic.st.css", SIMPLE_CLASSES);
    assert_clean(&out);
    assert_eq!(
        out.css(),
        ".basic__btn {\n  color: red;\n}\n.basic__icon {\n  display: block;\n}\n"
    );
}

#[test]
fn test_root_class_scoped() {
    let out = transform_source("card.st.css", ".root { color: red; }");
    assert_clean(&out);
    assert_eq!(out.css(), ".card__root {\n  color: red;\n}\n");
}

#[test]
fn test_namespace_at_rule_overrides_stem_and_is_removed() {
    let out = transform_source(
        "entry.st.css",
        "@st-namespace \"fancy\";\n.btn { color: red; }",
    );
    assert_clean(&out);
    assert_eq!(out.css(), ".fancy__btn {\n  color: red;\n}\n");
}

#[test]
fn test_pseudo_selectors_preserved() {
    let out = transform_source(
        "entry.st.css",
        ".btn:hover { color: red; }\n.btn::before { content: \"\"; }",
    );
    assert_clean(&out);
    assert_eq!(
        out.css(),
        ".entry__btn:hover {\n  color: red;\n}\n.entry__btn::before {\n  content: \"\";\n}\n"
    );
}

#[test]
fn test_unscoped_type_selector_warns() {
    let out = transform_source("entry.st.css", "div { color: red; }");
    let diag = find_code(&out.diagnostics, codes::UNSCOPED_TYPE_SELECTOR);
    assert!(!diag.is_error());
    assert_eq!(diag.word.as_deref(), Some("div"));
    assert!(diag.message.contains("unscoped type selector"));
    // The selector itself is left as written.
    assert_eq!(out.css(), "div {\n  color: red;\n}\n");
}

#[test]
fn test_type_selector_scoped_by_preceding_class() {
    let out = transform_source("entry.st.css", ".btn div { color: red; }");
    assert_clean(&out);
    assert_eq!(out.css(), ".entry__btn div {\n  color: red;\n}\n");
}

#[test]
fn test_type_selector_scoped_by_class_in_same_compound() {
    let out = transform_source("entry.st.css", "span.btn { color: red; }");
    assert_clean(&out);
    assert_eq!(out.css(), "span.entry__btn {\n  color: red;\n}\n");
}

#[test]
fn test_selector_list_scopes_each_selector() {
    let out = transform_source("entry.st.css", ".a, .b { color: red; }");
    assert_clean(&out);
    assert_eq!(out.css(), ".entry__a, .entry__b {\n  color: red;\n}\n");
}

#[test]
fn test_local_extends_declaration_removed_from_output() {
    let out = transform_source(
        "entry.st.css",
        ".base { color: red; }\n.btn { -st-extends: base; background: white; }",
    );
    assert_clean(&out);
    assert_eq!(
        out.css(),
        ".entry__base {\n  color: red;\n}\n.entry__btn {\n  background: white;\n}\n"
    );
}

#[test]
fn test_rules_inside_media_are_scoped() {
    let out = transform_source(
        "entry.st.css",
        "@media screen {\n  .btn { color: red; }\n}",
    );
    assert_clean(&out);
    assert_eq!(
        out.css(),
        "@media screen {\n  .entry__btn {\n    color: red;\n  }\n}\n"
    );
}
