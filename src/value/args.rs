//! Argument extraction from parsed function values.

use super::{stringify_node, ValueNode, ValueNodeKind};

/// Positional arguments of a function node, one string per comma-separated
/// argument.
///
/// Each argument is the trimmed concatenation of its nodes: strings
/// contribute their bare value unless `preserve_quotes` is set, comments
/// contribute only when `allow_comments` is set, and everything else
/// contributes its `resolved` text when present, source text otherwise.
/// `on_empty_arg` fires for every blank argument with the positional index
/// and the full call text, including blanks later dropped as trailing
/// empties. Interior empties are kept.
pub fn get_formatter_args(
    node: &ValueNode,
    allow_comments: bool,
    mut on_empty_arg: Option<&mut dyn FnMut(usize, &str)>,
    preserve_quotes: bool,
) -> Vec<String> {
    let ValueNodeKind::Func { nodes, .. } = &node.kind else {
        return Vec::new();
    };

    let full_text = stringify_node(node);
    let mut result: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut arg_index = 0usize;

    let mut check_empty =
        |current: &str, index: usize, on_empty_arg: &mut Option<&mut dyn FnMut(usize, &str)>| {
            if current.trim().is_empty() {
                if let Some(callback) = on_empty_arg {
                    callback(index, &full_text);
                }
            }
        };

    for arg_node in nodes {
        match &arg_node.kind {
            ValueNodeKind::Div { ch: ',', .. } => {
                check_empty(&current, arg_index, &mut on_empty_arg);
                arg_index += 1;
                result.push(current.trim().to_string());
                current.clear();
            }
            ValueNodeKind::Comment { .. } => {
                if allow_comments {
                    current.push_str(&stringify_node(arg_node));
                }
            }
            ValueNodeKind::Str { value, .. } => {
                if preserve_quotes {
                    current.push_str(&stringify_node(arg_node));
                } else {
                    current.push_str(value);
                }
            }
            _ => current.push_str(&stringify_node(arg_node)),
        }
    }
    check_empty(&current, arg_index, &mut on_empty_arg);
    result.push(current.trim().to_string());

    while result.last().is_some_and(|arg| arg.is_empty()) {
        result.pop();
    }
    result
}

/// Argument node groups of a function node, split at every divider.
///
/// Spans are stripped from the grouped nodes; one trailing fully-empty group
/// (a trailing comma) is dropped.
pub fn get_named_args(node: &ValueNode) -> Vec<Vec<ValueNode>> {
    let ValueNodeKind::Func { nodes, .. } = &node.kind else {
        return Vec::new();
    };
    if nodes.is_empty() {
        return Vec::new();
    }

    let mut groups: Vec<Vec<ValueNode>> = vec![Vec::new()];
    for arg_node in nodes {
        if arg_node.is_div() {
            groups.push(Vec::new());
        } else if let Some(last) = groups.last_mut() {
            last.push(arg_node.without_span());
        }
    }
    if groups.last().is_some_and(|group| group.is_empty()) {
        groups.pop();
    }
    groups
}

/// Split nodes at dividers. A divider pushes the current group even when it
/// is empty; the final group is appended only when non-empty.
pub fn group_values(nodes: &[ValueNode]) -> Vec<Vec<ValueNode>> {
    let mut groups: Vec<Vec<ValueNode>> = Vec::new();
    let mut current: Vec<ValueNode> = Vec::new();
    for node in nodes {
        if node.is_div() {
            groups.push(std::mem::take(&mut current));
        } else {
            current.push(node.clone());
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}
