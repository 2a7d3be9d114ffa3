//! Block parser: tokens to [`CssTree`].
//!
//! Statement boundaries are found by scanning to `;` or `{` at bracket
//! depth zero; a `{` makes the statement a rule (or at-rule block), anything
//! else a declaration split at its first top-level `:`. The parser always
//! produces a tree; malformed input is recovered from and reported as
//! `PARSE` diagnostics.

use super::lexer::{tokenize, CssTokenKind, Token};
use super::{CssNodeKind, CssTree, NodeId};
use crate::diagnostics::{codes, Diagnostic};
use text_size::{TextRange, TextSize};

#[derive(Debug)]
pub struct ParseOutput {
    pub tree: CssTree,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse CSS source text into a tree.
pub fn parse_css(source: &str) -> ParseOutput {
    let mut parser = Parser {
        source,
        tokens: tokenize(source),
        pos: 0,
        tree: CssTree::new(),
        diagnostics: Vec::new(),
    };
    let root = parser.tree.root();
    parser.parse_block_contents(root, true);
    ParseOutput {
        tree: parser.tree,
        diagnostics: parser.diagnostics,
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
    tree: CssTree,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    fn current(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn at(&self, kind: CssTokenKind) -> bool {
        self.current().map(|t| t.kind == kind).unwrap_or(false)
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn skip_trivia(&mut self, parent: NodeId, keep_comments: bool) {
        while let Some(token) = self.current() {
            match token.kind {
                CssTokenKind::Whitespace => self.bump(),
                CssTokenKind::Comment if keep_comments => {
                    let kind = CssNodeKind::Comment { text: token.text.to_string() };
                    let span = TextRange::new(token.offset, token.end());
                    self.tree.append(parent, kind, span);
                    self.bump();
                }
                _ => break,
            }
        }
    }

    fn parse_block_contents(&mut self, parent: NodeId, is_root: bool) {
        loop {
            self.skip_trivia(parent, true);
            let Some(token) = self.current() else {
                if !is_root {
                    self.diagnostics.push(
                        Diagnostic::warning(codes::PARSE, "unclosed block")
                            .with_span(TextRange::new(
                                TextSize::of(self.source),
                                TextSize::of(self.source),
                            )),
                    );
                }
                return;
            };
            match token.kind {
                CssTokenKind::RBrace => {
                    if is_root {
                        self.diagnostics.push(
                            Diagnostic::warning(codes::PARSE, "unexpected '}'")
                                .with_span(TextRange::new(token.offset, token.end())),
                        );
                        self.bump();
                    } else {
                        self.bump();
                        return;
                    }
                }
                CssTokenKind::Semicolon => self.bump(),
                CssTokenKind::AtKeyword => self.parse_at_rule(parent),
                _ => self.parse_statement(parent),
            }
        }
    }

    /// Scan forward to the token that ends the current statement: `{`, `;`
    /// or `}` at bracket depth zero, or end of input. Returns the end offset
    /// of the scanned text.
    fn scan_statement(&mut self) -> TextSize {
        let mut depth: u32 = 0;
        let mut end = self.current().map(|t| t.offset).unwrap_or_default();
        while let Some(token) = self.current() {
            match token.kind {
                CssTokenKind::LBrace | CssTokenKind::Semicolon | CssTokenKind::RBrace
                    if depth == 0 =>
                {
                    break;
                }
                CssTokenKind::LParen | CssTokenKind::LBracket => depth += 1,
                CssTokenKind::RParen | CssTokenKind::RBracket => depth = depth.saturating_sub(1),
                _ => {}
            }
            end = token.end();
            self.bump();
        }
        end
    }

    fn parse_statement(&mut self, parent: NodeId) {
        let start = self.current().map(|t| t.offset).unwrap_or_default();
        let end = self.scan_statement();
        let text = &self.source[TextRange::new(start, end)];

        if self.at(CssTokenKind::LBrace) {
            let selector = text.trim().to_string();
            let rule = self.tree.append(
                parent,
                CssNodeKind::Rule { selector },
                TextRange::new(start, end),
            );
            self.bump();
            self.parse_block_contents(rule, false);
        } else {
            self.push_declaration(parent, text, TextRange::new(start, end));
            if self.at(CssTokenKind::Semicolon) {
                self.bump();
            }
        }
    }

    fn push_declaration(&mut self, parent: NodeId, text: &str, span: TextRange) {
        let Some(colon) = top_level_colon(text) else {
            if !text.trim().is_empty() {
                self.diagnostics.push(
                    Diagnostic::warning(codes::PARSE, format!("expected ':' in \"{}\"", text.trim()))
                        .with_span(span),
                );
            }
            return;
        };
        let prop = text[..colon].trim();
        let mut value = text[colon + 1..].trim();
        let mut important = false;
        if let Some(bang) = value.rfind('!') {
            if value[bang + 1..].trim().eq_ignore_ascii_case("important") {
                value = value[..bang].trim_end();
                important = true;
            }
        }
        self.tree.append(
            parent,
            CssNodeKind::Decl {
                prop: prop.into(),
                value: value.to_string(),
                important,
            },
            span,
        );
    }

    fn parse_at_rule(&mut self, parent: NodeId) {
        let Some(token) = self.current() else { return };
        let start = token.offset;
        let name: smol_str::SmolStr = token.text[1..].into();
        self.bump();

        let params_start = self.current().map(|t| t.offset).unwrap_or(start);
        let end = self.scan_statement();
        let params = self.source[TextRange::new(params_start.min(end), end)]
            .trim()
            .to_string();

        if self.at(CssTokenKind::LBrace) {
            let at_rule = self.tree.append(
                parent,
                CssNodeKind::AtRule { name, params, has_block: true },
                TextRange::new(start, end),
            );
            self.bump();
            self.parse_block_contents(at_rule, false);
        } else {
            self.tree.append(
                parent,
                CssNodeKind::AtRule { name, params, has_block: false },
                TextRange::new(start, end),
            );
            if self.at(CssTokenKind::Semicolon) {
                self.bump();
            }
        }
    }
}

/// Byte offset of the first `:` outside parens/brackets, if any.
fn top_level_colon(text: &str) -> Option<usize> {
    let mut depth: u32 = 0;
    let mut in_string: Option<char> = None;
    for (i, ch) in text.char_indices() {
        if let Some(quote) = in_string {
            if ch == quote {
                in_string = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => in_string = Some(ch),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}
