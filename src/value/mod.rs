//! Declaration value AST and parser.
//!
//! Values parse into a flat list of [`ValueNode`]s; function arguments nest.
//! Whitespace adjacent to a divider is absorbed into the divider node
//! (`before`/`after`) so argument grouping sees clean `name <space> value`
//! sequences. A node's `resolved` text, when set by the evaluator, replaces
//! its source text during stringification.

pub mod args;
pub mod evaluate;

use logos::Logos;
use text_size::{TextRange, TextSize};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum ValueTokenKind {
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"/\*([^*]|\*[^/])*\*+/")]
    Comment,

    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r#"'([^'\\]|\\.)*'"#)]
    String,

    #[token(",")]
    Comma,
    #[token("/")]
    Slash,
    #[token(":")]
    Colon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    #[regex(r#"[^ \t\r\n\f,:/()'"]+"#)]
    Word,

    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueNodeKind {
    Word {
        text: String,
    },
    Func {
        name: String,
        nodes: Vec<ValueNode>,
    },
    Str {
        value: String,
        quote: char,
    },
    /// `,`, `/` or `:` with the whitespace that surrounded it.
    Div {
        ch: char,
        before: String,
        after: String,
    },
    Space {
        text: String,
    },
    Comment {
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueNode {
    pub kind: ValueNodeKind,
    /// Replacement text attached by the evaluator; wins over source text.
    pub resolved: Option<String>,
    pub span: TextRange,
}

impl ValueNode {
    pub fn new(kind: ValueNodeKind, span: TextRange) -> Self {
        ValueNode { kind, resolved: None, span }
    }

    pub fn is_space(&self) -> bool {
        matches!(self.kind, ValueNodeKind::Space { .. })
    }

    pub fn is_div(&self) -> bool {
        matches!(self.kind, ValueNodeKind::Div { .. })
    }

    pub fn as_word(&self) -> Option<&str> {
        match &self.kind {
            ValueNodeKind::Word { text } => Some(text),
            _ => None,
        }
    }

    /// Clone with positions removed, recursively.
    pub fn without_span(&self) -> ValueNode {
        let kind = match &self.kind {
            ValueNodeKind::Func { name, nodes } => ValueNodeKind::Func {
                name: name.clone(),
                nodes: nodes.iter().map(ValueNode::without_span).collect(),
            },
            other => other.clone(),
        };
        ValueNode {
            kind,
            resolved: self.resolved.clone(),
            span: TextRange::default(),
        }
    }
}

// ============================================================================
// Parser
// ============================================================================

/// Parse a declaration value. Never fails; unmatched parens close at end of
/// input and stray tokens are kept as words.
pub fn parse_value(text: &str) -> Vec<ValueNode> {
    let tokens: Vec<(ValueTokenKind, std::ops::Range<usize>)> = ValueTokenKind::lexer(text)
        .spanned()
        .map(|(kind, span)| (kind.unwrap_or(ValueTokenKind::Error), span))
        .collect();
    let mut parser = ValueParser { text, tokens, pos: 0 };
    parser.parse_nodes(false)
}

struct ValueParser<'a> {
    text: &'a str,
    tokens: Vec<(ValueTokenKind, std::ops::Range<usize>)>,
    pos: usize,
}

impl<'a> ValueParser<'a> {
    fn peek(&self) -> Option<ValueTokenKind> {
        self.tokens.get(self.pos).map(|(kind, _)| *kind)
    }

    fn span(&self) -> std::ops::Range<usize> {
        self.tokens
            .get(self.pos)
            .map(|(_, span)| span.clone())
            .unwrap_or(self.text.len()..self.text.len())
    }

    fn slice(&self) -> &'a str {
        &self.text[self.span()]
    }

    fn range(span: &std::ops::Range<usize>) -> TextRange {
        TextRange::new(
            TextSize::new(span.start as u32),
            TextSize::new(span.end as u32),
        )
    }

    fn take_whitespace(&mut self) -> Option<(String, std::ops::Range<usize>)> {
        if self.peek() == Some(ValueTokenKind::Whitespace) {
            let span = self.span();
            let text = self.slice().to_string();
            self.pos += 1;
            Some((text, span))
        } else {
            None
        }
    }

    fn parse_nodes(&mut self, in_func: bool) -> Vec<ValueNode> {
        let mut nodes = Vec::new();
        loop {
            let pending = self.take_whitespace();
            let Some(kind) = self.peek() else {
                if let Some((text, span)) = pending {
                    nodes.push(ValueNode::new(
                        ValueNodeKind::Space { text },
                        Self::range(&span),
                    ));
                }
                return nodes;
            };
            let span = self.span();

            if let ValueTokenKind::Comma | ValueTokenKind::Slash | ValueTokenKind::Colon = kind {
                let ch = match kind {
                    ValueTokenKind::Comma => ',',
                    ValueTokenKind::Slash => '/',
                    _ => ':',
                };
                let before = pending.map(|(text, _)| text).unwrap_or_default();
                self.pos += 1;
                let after = self
                    .take_whitespace()
                    .map(|(text, _)| text)
                    .unwrap_or_default();
                nodes.push(ValueNode::new(
                    ValueNodeKind::Div { ch, before, after },
                    Self::range(&span),
                ));
                continue;
            }

            if let Some((text, ws_span)) = pending {
                nodes.push(ValueNode::new(
                    ValueNodeKind::Space { text },
                    Self::range(&ws_span),
                ));
            }

            match kind {
                ValueTokenKind::Word | ValueTokenKind::Error => {
                    let text = self.slice().to_string();
                    self.pos += 1;
                    // A word glued to `(` is a function call.
                    if self.peek() == Some(ValueTokenKind::LParen)
                        && self.span().start == span.end
                    {
                        self.pos += 1;
                        let inner = self.parse_nodes(true);
                        let end = self
                            .tokens
                            .get(self.pos.saturating_sub(1))
                            .map(|(_, s)| s.end)
                            .unwrap_or(span.end);
                        nodes.push(ValueNode::new(
                            ValueNodeKind::Func { name: text, nodes: inner },
                            Self::range(&(span.start..end)),
                        ));
                    } else {
                        nodes.push(ValueNode::new(
                            ValueNodeKind::Word { text },
                            Self::range(&span),
                        ));
                    }
                }
                ValueTokenKind::LParen => {
                    self.pos += 1;
                    let inner = self.parse_nodes(true);
                    let end = self
                        .tokens
                        .get(self.pos.saturating_sub(1))
                        .map(|(_, s)| s.end)
                        .unwrap_or(span.end);
                    nodes.push(ValueNode::new(
                        ValueNodeKind::Func { name: String::new(), nodes: inner },
                        Self::range(&(span.start..end)),
                    ));
                }
                ValueTokenKind::RParen => {
                    self.pos += 1;
                    if in_func {
                        return nodes;
                    }
                    nodes.push(ValueNode::new(
                        ValueNodeKind::Word { text: ")".to_string() },
                        Self::range(&span),
                    ));
                }
                ValueTokenKind::String => {
                    let raw = self.slice();
                    let quote = raw.chars().next().unwrap_or('"');
                    let value = raw[1..raw.len().saturating_sub(1)].to_string();
                    self.pos += 1;
                    nodes.push(ValueNode::new(
                        ValueNodeKind::Str { value, quote },
                        Self::range(&span),
                    ));
                }
                ValueTokenKind::Comment => {
                    let text = self.slice().to_string();
                    self.pos += 1;
                    nodes.push(ValueNode::new(
                        ValueNodeKind::Comment { text },
                        Self::range(&span),
                    ));
                }
                ValueTokenKind::Whitespace
                | ValueTokenKind::Comma
                | ValueTokenKind::Slash
                | ValueTokenKind::Colon => unreachable!("handled above"),
            }
        }
    }
}

// ============================================================================
// Stringify
// ============================================================================

pub fn stringify_node(node: &ValueNode) -> String {
    if let Some(resolved) = &node.resolved {
        return resolved.clone();
    }
    match &node.kind {
        ValueNodeKind::Word { text } => text.clone(),
        ValueNodeKind::Func { name, nodes } => {
            format!("{name}({})", stringify(nodes))
        }
        ValueNodeKind::Str { value, quote } => format!("{quote}{value}{quote}"),
        ValueNodeKind::Div { ch, before, after } => format!("{before}{ch}{after}"),
        ValueNodeKind::Space { text } => text.clone(),
        ValueNodeKind::Comment { text } => text.clone(),
    }
}

pub fn stringify(nodes: &[ValueNode]) -> String {
    nodes.iter().map(stringify_node).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        for text in [
            "1px solid red",
            "url(./a.png) no-repeat",
            "value(a), value(b)",
            "a 1 , b  2",
            "\"quoted\" 'single'",
            "rgba(0, 0, 0, 0.5)",
        ] {
            assert_eq!(stringify(&parse_value(text)), text);
        }
    }

    #[test]
    fn test_parse_function_nodes() {
        let nodes = parse_value("value(myColor)");
        assert_eq!(nodes.len(), 1);
        match &nodes[0].kind {
            ValueNodeKind::Func { name, nodes } => {
                assert_eq!(name, "value");
                assert_eq!(nodes[0].as_word(), Some("myColor"));
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_div_absorbs_whitespace() {
        let nodes = parse_value("a , b");
        assert_eq!(nodes.len(), 3);
        match &nodes[1].kind {
            ValueNodeKind::Div { ch, before, after } => {
                assert_eq!(*ch, ',');
                assert_eq!((before.as_str(), after.as_str()), (" ", " "));
            }
            other => panic!("expected div, got {other:?}"),
        }
    }

    #[test]
    fn test_colon_inside_url_is_div() {
        let nodes = parse_value("url(data:image/png)");
        assert_eq!(stringify(&nodes), "url(data:image/png)");
        match &nodes[0].kind {
            ValueNodeKind::Func { nodes, .. } => {
                assert!(nodes.iter().any(|n| matches!(
                    n.kind,
                    ValueNodeKind::Div { ch: ':', .. }
                )));
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_resolved_wins_in_stringify() {
        let mut nodes = parse_value("value(a)");
        nodes[0].resolved = Some("red".to_string());
        assert_eq!(stringify(&nodes), "red");
    }

    #[test]
    fn test_word_space_paren_is_not_function() {
        let nodes = parse_value("foo (bar)");
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0].as_word(), Some("foo"));
        assert!(matches!(
            &nodes[2].kind,
            ValueNodeKind::Func { name, .. } if name.is_empty()
        ));
    }
}
