//! Directory loading and batch transforms.

use std::fs;
use stitch::Project;
use tempfile::TempDir;

fn write(dir: &TempDir, relative: &str, text: &str) {
    let path = dir.path().join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, text).unwrap();
}

#[test]
fn test_load_dir_keys_are_relative_paths() {
    let dir = TempDir::new().unwrap();
    write(&dir, "entry.st.css", ".btn { color: red; }");
    write(&dir, "comps/button.st.css", ".root { color: gold; }");
    write(&dir, "reset.css", "body { margin: 0; }");
    write(&dir, "notes.txt", "not css");

    let project = Project::load_dir(dir.path()).unwrap();
    assert_eq!(project.len(), 3);
    assert!(project.sheet("entry.st.css").is_some());
    assert!(project.sheet("comps/button.st.css").is_some());
    assert!(project.sheet("reset.css").is_some());
    assert!(project.sheet("notes.txt").is_none());
}

#[test]
fn test_load_dir_resolves_imports_across_subdirectories() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "entry.st.css",
        "@st-import Button from \"./comps/button.st.css\";\nButton { color: gold; }",
    );
    write(&dir, "comps/button.st.css", ".root { background: grey; }");

    let project = Project::load_dir(dir.path()).unwrap();
    let outputs = project.transform_all();
    let (_, out) = outputs
        .iter()
        .find(|(source, _)| &**source == "entry.st.css")
        .unwrap();
    assert!(out.diagnostics.is_empty());
    assert_eq!(out.css(), ".button__root {\n  color: gold;\n}\n");
}

#[test]
fn test_load_dir_missing_directory_errors() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent");
    assert!(Project::load_dir(&missing).is_err());
}

#[test]
fn test_transform_all_skips_plain_css() {
    let mut project = Project::new();
    project.add_source("entry.st.css", ".btn { color: red; }");
    project.add_source("plain.css", ".btn { color: red; }");

    let outputs = project.transform_all();
    assert_eq!(outputs.len(), 1);
    assert_eq!(&*outputs[0].0, "entry.st.css");
    assert_eq!(outputs[0].1.css(), ".entry__btn {\n  color: red;\n}\n");
}

#[test]
fn test_add_sources_keeps_input_order() {
    let mut project = Project::new();
    project.add_sources(vec![
        ("c.st.css".to_string(), ".c {}".to_string()),
        ("a.st.css".to_string(), ".a {}".to_string()),
        ("b.st.css".to_string(), ".b {}".to_string()),
    ]);
    let order: Vec<String> = project
        .sheets()
        .map(|sheet| sheet.source.to_string())
        .collect();
    assert_eq!(order, vec!["c.st.css", "a.st.css", "b.st.css"]);
}
