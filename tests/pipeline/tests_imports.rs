//! Cross-sheet imports: default and named bindings, aliasing, re-exports.

use crate::helpers::project_helpers::{assert_clean, find_code, project_of, transform_one};
use crate::helpers::source_fixtures::{BASE_SHEET, COMP_SHEET, EXTENDING_COMP_SHEET};
use stitch::diagnostics::codes;

#[test]
fn test_default_import_rewrites_component_root() {
    let project = project_of(&[
        ("comp.st.css", COMP_SHEET),
        (
            "entry.st.css",
            "@st-import Comp from \"./comp.st.css\";\nComp { color: gold; }",
        ),
    ]);
    let out = transform_one(&project, "entry.st.css");
    assert_clean(&out);
    assert_eq!(out.css(), ".comp__root {\n  color: gold;\n}\n");
}

#[test]
fn test_named_import_class_scopes_to_defining_sheet() {
    let project = project_of(&[
        ("comp.st.css", COMP_SHEET),
        (
            "entry.st.css",
            "@st-import [label] from \"./comp.st.css\";\n.label { font-weight: bold; }",
        ),
    ]);
    let out = transform_one(&project, "entry.st.css");
    assert_clean(&out);
    assert_eq!(out.css(), ".comp__label {\n  font-weight: bold;\n}\n");
}

#[test]
fn test_named_import_with_local_alias() {
    let project = project_of(&[
        ("comp.st.css", COMP_SHEET),
        (
            "entry.st.css",
            "@st-import [label as tag] from \"./comp.st.css\";\n.tag { font-weight: bold; }",
        ),
    ]);
    let out = transform_one(&project, "entry.st.css");
    assert_clean(&out);
    assert_eq!(out.css(), ".comp__label {\n  font-weight: bold;\n}\n");
}

#[test]
fn test_reexported_symbol_resolves_to_origin() {
    let project = project_of(&[
        ("base.st.css", BASE_SHEET),
        (
            "comp.st.css",
            "@st-import [part] from \"./base.st.css\";\n.label { color: black; }",
        ),
        (
            "entry.st.css",
            "@st-import [part] from \"./comp.st.css\";\n.part { font-size: 12px; }",
        ),
    ]);
    let out = transform_one(&project, "entry.st.css");
    assert_clean(&out);
    assert_eq!(out.css(), ".base__part {\n  font-size: 12px;\n}\n");
}

#[test]
fn test_relative_request_from_subdirectory() {
    let project = project_of(&[
        ("comp.st.css", COMP_SHEET),
        (
            "nested/entry.st.css",
            "@st-import [label] from \"../comp.st.css\";\n.label { color: red; }",
        ),
    ]);
    let out = transform_one(&project, "nested/entry.st.css");
    assert_clean(&out);
    assert_eq!(out.css(), ".comp__label {\n  color: red;\n}\n");
}

#[test]
fn test_extends_imported_root_keeps_local_class() {
    let project = project_of(&[
        ("base.st.css", BASE_SHEET),
        ("comp.st.css", EXTENDING_COMP_SHEET),
    ]);
    let out = transform_one(&project, "comp.st.css");
    assert_clean(&out);
    assert_eq!(out.css(), ".comp__root {\n  background: white;\n}\n");
}

#[test]
fn test_unresolvable_import_warns() {
    let project = project_of(&[(
        "entry.st.css",
        "@st-import [missing] from \"./nope.st.css\";\n.btn { color: red; }",
    )]);
    let out = transform_one(&project, "entry.st.css");
    let diag = find_code(&out.diagnostics, codes::UNRESOLVED_IMPORT);
    assert!(!diag.is_error());
    assert_eq!(
        diag.message,
        "cannot resolve \"missing\" from \"./nope.st.css\""
    );
    // The rest of the sheet still compiles.
    assert_eq!(out.css(), ".entry__btn {\n  color: red;\n}\n");
}

#[test]
fn test_side_effect_import_removed_without_warning() {
    let project = project_of(&[(
        "entry.st.css",
        "@st-import \"./reset.css\";\n.btn { color: red; }",
    )]);
    let out = transform_one(&project, "entry.st.css");
    assert_clean(&out);
    assert_eq!(out.css(), ".entry__btn {\n  color: red;\n}\n");
}
