//! Selector AST and parser.
//!
//! Selectors are parsed per rule into a [`SelectorList`] of complex
//! selectors, each a flat sequence of [`SelectorNode`]s. Only the node kinds
//! the class and type features consume are modeled structurally; pseudo-class
//! arguments stay as raw text and unknown syntax round-trips through
//! [`SelectorNode::Invalid`].

use logos::Logos;
use smol_str::SmolStr;
use std::fmt;

// ============================================================================
// Tokens
// ============================================================================

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum SelTokenKind {
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[token(".")]
    Dot,
    #[token("#")]
    Hash,
    #[token("::")]
    DoubleColon,
    #[token(":")]
    Colon,
    #[token("&")]
    Ampersand,
    #[token("*")]
    Star,
    #[token(">")]
    Child,
    #[token("+")]
    Adjacent,
    #[token("~")]
    Sibling,
    #[token(",")]
    Comma,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,

    #[regex(r"\[[^\]]*\]?")]
    Attribute,

    #[regex(r#"[^ \t\r\n\f.#:&*>+~,()\[\]]+"#)]
    Ident,

    Error,
}

// ============================================================================
// AST
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinatorKind {
    Space,
    Child,
    Adjacent,
    Sibling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorNode {
    /// Element type selector; `nodes` is set for the (invalid) functional
    /// form `Foo(...)`.
    Type {
        name: SmolStr,
        nodes: Option<SelectorList>,
    },
    Class {
        name: SmolStr,
    },
    Id {
        name: SmolStr,
    },
    PseudoClass {
        name: SmolStr,
        args: Option<String>,
    },
    PseudoElement {
        name: SmolStr,
    },
    /// Raw `[...]` content, brackets included.
    Attribute {
        content: String,
    },
    Combinator {
        kind: CombinatorKind,
    },
    Universal,
    /// `&`
    Nesting,
    Invalid {
        text: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    pub nodes: Vec<SelectorNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorList {
    pub selectors: Vec<Selector>,
}

impl Selector {
    /// Nodes of the first compound, up to the first combinator.
    pub fn first_compound(&self) -> &[SelectorNode] {
        let end = self
            .nodes
            .iter()
            .position(|n| matches!(n, SelectorNode::Combinator { .. }))
            .unwrap_or(self.nodes.len());
        &self.nodes[..end]
    }
}

impl SelectorList {
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

// ============================================================================
// Identifier classification
// ============================================================================

/// A capitalized identifier names a component root by convention.
pub fn is_comp_root(name: &str) -> bool {
    name.chars()
        .next()
        .is_some_and(|c| unicode_ident::is_xid_start(c) && c.is_uppercase())
}

/// CSS identifier check used when validating import bindings and namespaces.
pub fn is_ident(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(unicode_ident::is_xid_start(first) || first == '_' || first == '-') {
        return false;
    }
    chars.all(|c| unicode_ident::is_xid_continue(c) || c == '-')
}

// ============================================================================
// Parser
// ============================================================================

/// Parse a rule selector into a list of complex selectors. Never fails;
/// unrecognized tokens become [`SelectorNode::Invalid`].
pub fn parse_selector_list(text: &str) -> SelectorList {
    let tokens: Vec<(SelTokenKind, std::ops::Range<usize>)> = SelTokenKind::lexer(text)
        .spanned()
        .map(|(kind, span)| (kind.unwrap_or(SelTokenKind::Error), span))
        .collect();
    let mut parser = SelParser { text, tokens, pos: 0 };
    parser.parse_list(None)
}

struct SelParser<'a> {
    text: &'a str,
    tokens: Vec<(SelTokenKind, std::ops::Range<usize>)>,
    pos: usize,
}

impl<'a> SelParser<'a> {
    fn peek(&self) -> Option<SelTokenKind> {
        self.tokens.get(self.pos).map(|(kind, _)| *kind)
    }

    fn slice(&self) -> &'a str {
        self.tokens
            .get(self.pos)
            .map(|(_, span)| &self.text[span.clone()])
            .unwrap_or("")
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn take_ident(&mut self) -> Option<SmolStr> {
        if self.peek() == Some(SelTokenKind::Ident) {
            let name = SmolStr::new(self.slice());
            self.bump();
            Some(name)
        } else {
            None
        }
    }

    /// Raw text between a consumed `(` and its matching `)`.
    fn take_paren_args(&mut self) -> String {
        debug_assert_eq!(self.peek(), Some(SelTokenKind::LParen));
        self.bump();
        let start = self
            .tokens
            .get(self.pos)
            .map(|(_, span)| span.start)
            .unwrap_or(self.text.len());
        let mut end = start;
        let mut depth: u32 = 0;
        while let Some(kind) = self.peek() {
            match kind {
                SelTokenKind::LParen => depth += 1,
                SelTokenKind::RParen => {
                    if depth == 0 {
                        self.bump();
                        break;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            end = self.tokens[self.pos].1.end;
            self.bump();
        }
        self.text[start..end].to_string()
    }

    fn parse_list(&mut self, stop_at: Option<SelTokenKind>) -> SelectorList {
        let mut list = SelectorList::default();
        let mut current = Selector::default();
        let mut pending_space = false;

        let flush =
            |list: &mut SelectorList, current: &mut Selector| {
                while matches!(
                    current.nodes.last(),
                    Some(SelectorNode::Combinator { .. })
                ) {
                    current.nodes.pop();
                }
                if !current.nodes.is_empty() {
                    list.selectors.push(std::mem::take(current));
                }
            };

        while let Some(kind) = self.peek() {
            if Some(kind) == stop_at {
                break;
            }
            match kind {
                SelTokenKind::Whitespace => {
                    pending_space = true;
                    self.bump();
                    continue;
                }
                SelTokenKind::Comma => {
                    self.bump();
                    flush(&mut list, &mut current);
                    pending_space = false;
                    continue;
                }
                SelTokenKind::Child | SelTokenKind::Adjacent | SelTokenKind::Sibling => {
                    let combinator = match kind {
                        SelTokenKind::Child => CombinatorKind::Child,
                        SelTokenKind::Adjacent => CombinatorKind::Adjacent,
                        _ => CombinatorKind::Sibling,
                    };
                    self.bump();
                    if matches!(
                        current.nodes.last(),
                        Some(SelectorNode::Combinator { kind: CombinatorKind::Space })
                    ) {
                        current.nodes.pop();
                    }
                    if !current.nodes.is_empty() {
                        current.nodes.push(SelectorNode::Combinator { kind: combinator });
                    }
                    pending_space = false;
                    continue;
                }
                _ => {}
            }

            if pending_space && !current.nodes.is_empty() {
                current
                    .nodes
                    .push(SelectorNode::Combinator { kind: CombinatorKind::Space });
            }
            pending_space = false;

            let node = match kind {
                SelTokenKind::Dot => {
                    self.bump();
                    match self.take_ident() {
                        Some(name) => SelectorNode::Class { name },
                        None => SelectorNode::Invalid { text: ".".into() },
                    }
                }
                SelTokenKind::Hash => {
                    self.bump();
                    match self.take_ident() {
                        Some(name) => SelectorNode::Id { name },
                        None => SelectorNode::Invalid { text: "#".into() },
                    }
                }
                SelTokenKind::DoubleColon => {
                    self.bump();
                    match self.take_ident() {
                        Some(name) => SelectorNode::PseudoElement { name },
                        None => SelectorNode::Invalid { text: "::".into() },
                    }
                }
                SelTokenKind::Colon => {
                    self.bump();
                    match self.take_ident() {
                        Some(name) => {
                            let args = if self.peek() == Some(SelTokenKind::LParen) {
                                Some(self.take_paren_args())
                            } else {
                                None
                            };
                            SelectorNode::PseudoClass { name, args }
                        }
                        None => SelectorNode::Invalid { text: ":".into() },
                    }
                }
                SelTokenKind::Ident => {
                    let name = SmolStr::new(self.slice());
                    self.bump();
                    let nodes = if self.peek() == Some(SelTokenKind::LParen) {
                        let args = self.take_paren_args();
                        Some(parse_selector_list(&args))
                    } else {
                        None
                    };
                    SelectorNode::Type { name, nodes }
                }
                SelTokenKind::Star => {
                    self.bump();
                    SelectorNode::Universal
                }
                SelTokenKind::Ampersand => {
                    self.bump();
                    SelectorNode::Nesting
                }
                SelTokenKind::Attribute => {
                    let content = self.slice().to_string();
                    self.bump();
                    SelectorNode::Attribute { content }
                }
                _ => {
                    let text = self.slice().to_string();
                    self.bump();
                    SelectorNode::Invalid { text }
                }
            };
            current.nodes.push(node);
        }
        flush(&mut list, &mut current);
        list
    }
}

// ============================================================================
// Stringify
// ============================================================================

impl fmt::Display for CombinatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombinatorKind::Space => write!(f, " "),
            CombinatorKind::Child => write!(f, " > "),
            CombinatorKind::Adjacent => write!(f, " + "),
            CombinatorKind::Sibling => write!(f, " ~ "),
        }
    }
}

impl fmt::Display for SelectorNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorNode::Type { name, nodes } => {
                write!(f, "{name}")?;
                if let Some(nodes) = nodes {
                    write!(f, "({nodes})")?;
                }
                Ok(())
            }
            SelectorNode::Class { name } => write!(f, ".{name}"),
            SelectorNode::Id { name } => write!(f, "#{name}"),
            SelectorNode::PseudoClass { name, args } => {
                write!(f, ":{name}")?;
                if let Some(args) = args {
                    write!(f, "({args})")?;
                }
                Ok(())
            }
            SelectorNode::PseudoElement { name } => write!(f, "::{name}"),
            SelectorNode::Attribute { content } => write!(f, "{content}"),
            SelectorNode::Combinator { kind } => write!(f, "{kind}"),
            SelectorNode::Universal => write!(f, "*"),
            SelectorNode::Nesting => write!(f, "&"),
            SelectorNode::Invalid { text } => write!(f, "{text}"),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write!(f, "{node}")?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{selector}")?;
        }
        Ok(())
    }
}
