//! Relative `url()` re-basing.
//!
//! Provider mixin output is written relative to the provider module; once
//! merged it lives in the importing sheet, so every relative `url()` must be
//! re-expressed against the importing sheet's directory. Absolute and bare
//! urls pass through untouched.

use crate::cst::CssTree;
use crate::resolver::Resolver;
use crate::value::{parse_value, stringify, ValueNode, ValueNodeKind};

/// Rewrite relative `url()` references in every declaration of `tree` from
/// `from_dir`-relative to `to_dir`-relative.
pub fn fix_relative_urls(tree: &mut CssTree, from_dir: &str, to_dir: &str) {
    if from_dir == to_dir {
        return;
    }
    for decl in tree.decls() {
        let value = match tree.as_decl(decl) {
            Some((_, value, _)) if value.contains("url(") => value.to_string(),
            _ => continue,
        };
        let mut nodes = parse_value(&value);
        let mut changed = false;
        rewrite_urls(&mut nodes, from_dir, to_dir, &mut changed);
        if changed {
            let rewritten = stringify(&nodes);
            tree.set_decl_value(decl, rewritten);
        }
    }
}

fn rewrite_urls(nodes: &mut [ValueNode], from_dir: &str, to_dir: &str, changed: &mut bool) {
    for node in nodes.iter_mut() {
        let ValueNodeKind::Func { name, nodes: inner } = &mut node.kind else {
            continue;
        };
        if name != "url" {
            rewrite_urls(inner, from_dir, to_dir, changed);
            continue;
        }
        let raw = stringify(inner);
        let trimmed = raw.trim();
        let (url, quote) = match trimmed.chars().next() {
            Some(q @ ('"' | '\'')) => (trimmed.trim_matches(q), Some(q)),
            _ => (trimmed, None),
        };
        if !is_relative(url) {
            continue;
        }
        let rebased = rebase(url, from_dir, to_dir);
        node.resolved = Some(match quote {
            Some(q) => format!("url({q}{rebased}{q})"),
            None => format!("url({rebased})"),
        });
        *changed = true;
    }
}

fn is_relative(url: &str) -> bool {
    url.starts_with("./") || url.starts_with("../")
}

fn rebase(url: &str, from_dir: &str, to_dir: &str) -> String {
    let absolute = Resolver::resolve_path(from_dir, url);
    make_relative(&absolute, to_dir)
}

/// Express `path` relative to `base_dir`, always with a `./` or `../` lead
/// so the result stays recognizably relative.
pub fn make_relative(path: &str, base_dir: &str) -> String {
    let path_segments: Vec<&str> = segments(path);
    let base_segments: Vec<&str> = segments(base_dir);
    let common = path_segments
        .iter()
        .zip(&base_segments)
        .take_while(|(a, b)| *a == *b)
        .count();
    let ups = base_segments.len() - common;
    let mut out = String::new();
    if ups == 0 {
        out.push_str("./");
    } else {
        for _ in 0..ups {
            out.push_str("../");
        }
    }
    out.push_str(&path_segments[common..].join("/"));
    out
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty() && *s != ".").collect()
}
