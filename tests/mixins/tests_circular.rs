//! Cycle detection across re-entrant mixin expansion.

use crate::helpers::project_helpers::{
    assert_code_count, find_code, project_of, transform_one, transform_source,
};
use crate::helpers::source_fixtures::{CYCLE_A, CYCLE_B};
use stitch::diagnostics::codes;

#[test]
fn test_mutual_class_mixins_warn_per_rule() {
    let out = transform_source(
        "entry.st.css",
        ".a { -st-mixin: b; }\n.b { -st-mixin: a; color: blue; }",
    );
    // Each rule expands until its own chain repeats, then stops.
    assert_code_count(&out.diagnostics, codes::CIRCULAR_MIXIN, 2);
    assert!(!out.has_errors());
    assert_eq!(
        out.css(),
        ".entry__a {\n  color: blue;\n}\n.entry__b {\n  color: blue;\n  color: blue;\n}\n"
    );
}

#[test]
fn test_self_mixin_warns_once() {
    let out = transform_source("entry.st.css", ".a { -st-mixin: a; color: red; }");
    let diag = find_code(&out.diagnostics, codes::CIRCULAR_MIXIN);
    assert_eq!(
        diag.message,
        "circular mixin found: a from entry.st.css --> a from entry.st.css"
    );
    assert_eq!(out.css(), ".entry__a {\n  color: red;\n  color: red;\n}\n");
}

#[test]
fn test_two_file_root_cycle_collapses_to_default_binding() {
    let project = project_of(&[("a.st.css", CYCLE_A), ("b.st.css", CYCLE_B)]);
    let out = transform_one(&project, "a.st.css");
    assert_code_count(&out.diagnostics, codes::CIRCULAR_MIXIN, 1);
    let diag = find_code(&out.diagnostics, codes::CIRCULAR_MIXIN);
    assert_eq!(
        diag.message,
        "circular mixin found: default from b.st.css --> default from a.st.css --> default from b.st.css"
    );
    assert_eq!(
        out.css(),
        ".a__root {\n  color: red;\n  color: blue;\n  color: red;\n}\n"
    );
}
