//! CSS class and component mixin expansion.

use crate::helpers::project_helpers::{
    assert_clean, find_code, project_of, transform_one, transform_source,
};
use crate::helpers::source_fixtures::{BASE_SHEET, EXTENDING_COMP_SHEET, MIXIN_SHEET};
use stitch::diagnostics::codes;

#[test]
fn test_local_class_mixin_expands_in_place() {
    let out = transform_source(
        "entry.st.css",
        ".mix { color: gold; }\n.btn { -st-mixin: mix; color: blue; }",
    );
    assert_clean(&out);
    assert_eq!(
        out.css(),
        ".entry__mix {\n  color: gold;\n}\n.entry__btn {\n  color: gold;\n  color: blue;\n}\n"
    );
}

#[test]
fn test_mixin_expands_at_directive_position() {
    let out = transform_source(
        "entry.st.css",
        ".mix { color: gold; background: black; }\n.btn { color: blue; -st-mixin: mix; }",
    );
    assert_clean(&out);
    assert_eq!(
        out.css(),
        ".entry__mix {\n  color: gold;\n  background: black;\n}\n\
         .entry__btn {\n  color: blue;\n  color: gold;\n  background: black;\n}\n"
    );
}

#[test]
fn test_imported_mixin_nested_rules_chain_after_target() {
    let project = project_of(&[
        ("mixin.st.css", MIXIN_SHEET),
        (
            "entry.st.css",
            "@st-import [mix] from \"./mixin.st.css\";\n.btn { -st-mixin: mix; }",
        ),
    ]);
    let out = transform_one(&project, "entry.st.css");
    assert_clean(&out);
    assert_eq!(
        out.css(),
        ".entry__btn {\n  background: red;\n  width: 1px;\n}\n\
         .entry__btn:hover {\n  color: red;\n}\n\
         @media screen {\n  .entry__btn {\n    display: grid;\n  }\n}\n"
    );
}

#[test]
fn test_named_arguments_override_defining_sheet_vars() {
    let project = project_of(&[
        ("mixin.st.css", MIXIN_SHEET),
        (
            "entry.st.css",
            "@st-import [mix] from \"./mixin.st.css\";\n.btn { -st-mixin: mix(color green); }",
        ),
    ]);
    let out = transform_one(&project, "entry.st.css");
    assert_clean(&out);
    assert_eq!(
        out.css(),
        ".entry__btn {\n  background: green;\n  width: 1px;\n}\n\
         .entry__btn:hover {\n  color: green;\n}\n\
         @media screen {\n  .entry__btn {\n    display: grid;\n  }\n}\n"
    );
}

#[test]
fn test_named_argument_value_resolved_in_mixing_sheet() {
    let project = project_of(&[
        ("mixin.st.css", MIXIN_SHEET),
        (
            "entry.st.css",
            ":vars { brand: purple; }\n\
             @st-import [mix] from \"./mixin.st.css\";\n\
             .btn { -st-mixin: mix(color value(brand)); }",
        ),
    ]);
    let out = transform_one(&project, "entry.st.css");
    assert_clean(&out);
    assert!(out.css().contains("background: purple;"));
    assert!(out.css().contains("color: purple;"));
}

#[test]
fn test_component_mixin_flattens_extends_chain_base_first() {
    let project = project_of(&[
        ("base.st.css", BASE_SHEET),
        ("comp.st.css", EXTENDING_COMP_SHEET),
        (
            "entry.st.css",
            "@st-import Comp from \"./comp.st.css\";\n.btn { -st-mixin: Comp; }",
        ),
    ]);
    let out = transform_one(&project, "entry.st.css");
    assert_clean(&out);
    assert_eq!(
        out.css(),
        ".entry__btn {\n  color: blue;\n}\n\
         .entry__btn .base__part {\n  color: navy;\n}\n\
         .entry__btn {\n  background: white;\n}\n"
    );
}

#[test]
fn test_unknown_mixin_name_warns_and_directive_removed() {
    let out = transform_source("entry.st.css", ".btn { -st-mixin: nope; }");
    let diag = find_code(&out.diagnostics, codes::UNKNOWN_MIXIN);
    assert!(!diag.is_error());
    assert_eq!(diag.message, "unknown mixin: \"nope\"");
    assert_eq!(out.css(), ".entry__btn {\n}\n");
}

#[test]
fn test_unresolvable_import_used_as_mixin_errors() {
    let project = project_of(&[(
        "entry.st.css",
        "@st-import [ghost] from \"./nope.st.css\";\n.btn { -st-mixin: ghost; }",
    )]);
    let out = transform_one(&project, "entry.st.css");
    let diag = find_code(&out.diagnostics, codes::UNKNOWN_MIXIN_SYMBOL);
    assert!(diag.is_error());
    assert_eq!(diag.message, "cannot mixin unknown symbol \"ghost\"");
    assert_eq!(out.css(), ".entry__btn {\n}\n");
}
