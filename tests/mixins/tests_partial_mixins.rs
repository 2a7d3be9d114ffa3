//! Partial mixin expansion: only declarations touched by the override set.

use crate::helpers::project_helpers::{
    assert_clean, find_code, project_of, transform_one, transform_source,
};
use crate::helpers::source_fixtures::MIXIN_SHEET;
use stitch::diagnostics::codes;

#[test]
fn test_partial_keeps_only_overridden_declarations() {
    let project = project_of(&[
        ("mixin.st.css", MIXIN_SHEET),
        (
            "entry.st.css",
            "@st-import [mix] from \"./mixin.st.css\";\n.btn { -st-partial-mixin: mix(color green); }",
        ),
    ]);
    let out = transform_one(&project, "entry.st.css");
    assert_clean(&out);
    // `width: value(size)` and the media rule never mention the override,
    // so they are dropped along with their emptied containers.
    assert_eq!(
        out.css(),
        ".entry__btn {\n  background: green;\n}\n.entry__btn:hover {\n  color: green;\n}\n"
    );
}

#[test]
fn test_partial_follows_variable_dependencies() {
    let project = project_of(&[
        (
            "mixin.st.css",
            ":vars {\n    base: red;\n    border: 1px solid value(base);\n}\n\
             .mix {\n    border: value(border);\n    color: black;\n}\n",
        ),
        (
            "entry.st.css",
            "@st-import [mix] from \"./mixin.st.css\";\n.btn { -st-partial-mixin: mix(base blue); }",
        ),
    ]);
    let out = transform_one(&project, "entry.st.css");
    assert_clean(&out);
    assert_eq!(out.css(), ".entry__btn {\n  border: 1px solid blue;\n}\n");
}

#[test]
fn test_partial_without_arguments_warns_and_expands_nothing() {
    let out = transform_source(
        "entry.st.css",
        ":vars { c: red; }\n.mix { color: value(c); }\n.btn { -st-partial-mixin: mix; }",
    );
    let diag = find_code(&out.diagnostics, codes::PARTIAL_MIXIN_MISSING_ARGUMENTS);
    assert!(!diag.is_error());
    assert_eq!(
        diag.message,
        "partial mixin usage without override arguments: \"mix\""
    );
    assert_eq!(
        out.css(),
        ".entry__mix {\n  color: red;\n}\n.entry__btn {\n}\n"
    );
}
