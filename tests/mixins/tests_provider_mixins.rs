//! Executable provider mixins: invocation, object merging, failures.

use crate::helpers::project_helpers::{assert_clean, find_code, transform_one};
use once_cell::sync::Lazy;
use stitch::diagnostics::codes;
use stitch::{MixinObject, Project, ProviderError, ProviderModule};

type Applied = Result<MixinObject, ProviderError>;

/// One project, many entry sheets: each test transforms its own unit
/// against the shared provider registry.
static PROVIDER_PROJECT: Lazy<Project> = Lazy::new(|| {
    let mut project = Project::new();
    project.add_provider(
        "mixins",
        ProviderModule::new()
            .mixin("shadow", |args: &[String]| -> Applied {
                let size = args.first().map(String::as_str).unwrap_or("1px");
                Ok(MixinObject::new().decl("box-shadow", format!("0 0 {size} black")))
            })
            .mixin("chip", |_: &[String]| -> Applied {
                Ok(MixinObject::new()
                    .decl("color", "white")
                    .decl("border", "none !important")
                    .nested("&:hover", MixinObject::new().decl("color", "grey")))
            })
            .mixin("broken", |_: &[String]| -> Applied {
                Err(ProviderError::new("boom"))
            })
            .value("spacing", "8px"),
    );
    project.add_provider(
        "utils/assets",
        ProviderModule::new().mixin("icon", |_: &[String]| -> Applied {
            Ok(MixinObject::new().decl("background", "url(./img.png) no-repeat"))
        }),
    );
    project.add_source(
        "entry.st.css",
        "@st-import [shadow] from \"./mixins\";\n.btn { -st-mixin: shadow(2px); }",
    );
    project.add_source(
        "chip.st.css",
        "@st-import [chip] from \"./mixins\";\n.btn { -st-mixin: chip; }",
    );
    project.add_source(
        "broken.st.css",
        "@st-import [broken] from \"./mixins\";\n.btn { -st-mixin: broken; }",
    );
    project.add_source(
        "plain.st.css",
        "@st-import [spacing] from \"./mixins\";\n.btn { -st-mixin: spacing; }",
    );
    project.add_source(
        "assets.st.css",
        "@st-import [icon] from \"./utils/assets\";\n.btn { -st-mixin: icon; }",
    );
    project
});

#[test]
fn test_provider_mixin_receives_positional_arguments() {
    let out = transform_one(&PROVIDER_PROJECT, "entry.st.css");
    assert_clean(&out);
    assert_eq!(out.css(), ".entry__btn {\n  box-shadow: 0 0 2px black;\n}\n");
}

#[test]
fn test_provider_object_nested_rules_and_important() {
    let out = transform_one(&PROVIDER_PROJECT, "chip.st.css");
    assert_clean(&out);
    assert_eq!(
        out.css(),
        ".chip__btn {\n  color: white;\n  border: none !important;\n}\n\
         .chip__btn:hover {\n  color: grey;\n}\n"
    );
}

#[test]
fn test_provider_failure_reports_and_keeps_rule() {
    let out = transform_one(&PROVIDER_PROJECT, "broken.st.css");
    let diag = find_code(&out.diagnostics, codes::FAILED_TO_APPLY_MIXIN);
    assert!(diag.is_error());
    assert_eq!(diag.message, "could not apply mixin: boom");
    assert_eq!(out.css(), ".broken__btn {\n}\n");
}

#[test]
fn test_value_export_is_not_a_mixin() {
    let out = transform_one(&PROVIDER_PROJECT, "plain.st.css");
    let diag = find_code(&out.diagnostics, codes::MIXIN_NOT_A_FUNC);
    assert!(diag.is_error());
    assert_eq!(diag.message, "mixin \"spacing\" is not a function");
    assert_eq!(out.css(), ".plain__btn {\n}\n");
}

#[test]
fn test_provider_urls_rebased_to_importing_sheet() {
    let out = transform_one(&PROVIDER_PROJECT, "assets.st.css");
    assert_clean(&out);
    assert_eq!(
        out.css(),
        ".assets__btn {\n  background: url(./utils/img.png) no-repeat;\n}\n"
    );
}
