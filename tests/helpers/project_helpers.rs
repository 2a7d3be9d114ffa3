//! Project construction and assertion helpers for integration tests.

use stitch::{Diagnostic, Project, TransformOutput, Transformer};

/// Build a project from `(path, source)` pairs, analyzed in order.
pub fn project_of(sources: &[(&str, &str)]) -> Project {
    let mut project = Project::new();
    for (path, text) in sources {
        project.add_source(*path, *text);
    }
    project
}

/// Transform one unit of the project.
pub fn transform_one(project: &Project, path: &str) -> TransformOutput {
    let transformer = Transformer::new(project);
    let sheet = project
        .sheet(path)
        .unwrap_or_else(|| panic!("missing sheet \"{path}\""));
    transformer.transform(sheet)
}

/// Analyze and transform a single standalone source.
pub fn transform_source(path: &str, text: &str) -> TransformOutput {
    let project = project_of(&[(path, text)]);
    transform_one(&project, path)
}

pub fn assert_clean(out: &TransformOutput) {
    assert!(
        out.diagnostics.is_empty(),
        "expected no diagnostics, got {:?}",
        out.diagnostics
    );
}

/// Assert exactly `count` diagnostics carry `code`.
pub fn assert_code_count(diagnostics: &[Diagnostic], code: &str, count: usize) {
    let found = diagnostics.iter().filter(|d| d.code == code).count();
    assert_eq!(
        found, count,
        "expected {count} diagnostics with code {code}, got {found} in {diagnostics:?}"
    );
}

/// Assert one diagnostic carries `code` and return it.
pub fn find_code<'a>(diagnostics: &'a [Diagnostic], code: &str) -> &'a Diagnostic {
    diagnostics
        .iter()
        .find(|d| d.code == code)
        .unwrap_or_else(|| panic!("no diagnostic with code {code} in {diagnostics:?}"))
}
