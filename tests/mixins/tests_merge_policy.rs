//! Repeated mixin directives on one rule: same-form override, opposite
//! forms surviving together.

use crate::helpers::project_helpers::{assert_clean, assert_code_count, transform_source};
use rstest::rstest;
use stitch::diagnostics::codes;

const TWO_MIXINS: &str = ":vars { x: red; y: blue; }\n.a { color: value(x); }\n.b { color: value(y); }\n";

#[rstest]
#[case::full_form("-st-mixin: a; -st-mixin: b;", "blue")]
#[case::partial_form("-st-partial-mixin: a(x green); -st-partial-mixin: b(y navy);", "navy")]
fn test_same_form_later_directive_wins(#[case] directives: &str, #[case] color: &str) {
    let source = format!("{TWO_MIXINS}.btn {{ {directives} }}");
    let out = transform_source("entry.st.css", &source);
    assert_code_count(&out.diagnostics, codes::OVERRIDE_MIXIN, 1);
    assert_eq!(
        out.css(),
        format!(
            ".entry__a {{\n  color: red;\n}}\n.entry__b {{\n  color: blue;\n}}\n\
             .entry__btn {{\n  color: {color};\n}}\n"
        )
    );
}

#[test]
fn test_opposite_forms_survive_in_declaration_order() {
    let source = format!(
        "{TWO_MIXINS}.btn {{ -st-mixin: a; -st-partial-mixin: b(y navy); }}"
    );
    let out = transform_source("entry.st.css", &source);
    assert_clean(&out);
    assert_eq!(
        out.css(),
        ".entry__a {\n  color: red;\n}\n.entry__b {\n  color: blue;\n}\n\
         .entry__btn {\n  color: red;\n  color: navy;\n}\n"
    );
}

#[test]
fn test_full_directive_after_partial_keeps_both() {
    let source = format!(
        "{TWO_MIXINS}.btn {{ -st-partial-mixin: a(x green); -st-mixin: b; }}"
    );
    let out = transform_source("entry.st.css", &source);
    assert_clean(&out);
    // The earlier partial stays ahead of the fresh full entry.
    assert_eq!(
        out.css(),
        ".entry__a {\n  color: red;\n}\n.entry__b {\n  color: blue;\n}\n\
         .entry__btn {\n  color: green;\n  color: blue;\n}\n"
    );
}
