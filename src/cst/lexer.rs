//! Logos-based block tokenizer for CSS source.
//!
//! Coarse tokens only: enough structure to find rule/at-rule/declaration
//! boundaries. Selector and value text are re-tokenized by their own lexers
//! once the block parser has carved the source up.

use logos::Logos;
use text_size::TextSize;

/// A token with its kind, text, and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: CssTokenKind,
    pub text: &'a str,
    pub offset: TextSize,
}

impl Token<'_> {
    pub fn end(&self) -> TextSize {
        self.offset + TextSize::of(self.text)
    }
}

/// Lexer wrapping the logos-generated tokenizer.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, CssTokenKind>,
    offset: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: CssTokenKind::lexer(input),
            offset: 0,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.offset);
        self.offset += text.len() as u32;

        let kind = match result {
            Ok(kind) => kind,
            Err(()) => CssTokenKind::Error,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Logos token enum for the block structure of CSS.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"")] // Don't skip anything, we want all tokens
pub enum CssTokenKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"/\*([^*]|\*[^/])*\*+/")]
    Comment,

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r"'([^'\\\n]|\\.)*'")]
    String,

    #[regex(r"@[-a-zA-Z_][-a-zA-Z0-9_]*")]
    AtKeyword,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,

    // =========================================================================
    // EVERYTHING ELSE
    // =========================================================================
    /// A run of characters with no structural meaning at the block level.
    #[regex(r#"[^ \t\r\n\f{}()\[\];:@"'/]+"#)]
    #[token("/")]
    #[token("@")]
    Chunk,

    Error,
}

impl CssTokenKind {
    /// True for tokens that open a bracket scope inside a component value.
    pub fn opens_group(&self) -> bool {
        matches!(
            self,
            CssTokenKind::LParen | CssTokenKind::LBracket | CssTokenKind::LBrace
        )
    }

    /// True for tokens that close a bracket scope inside a component value.
    pub fn closes_group(&self) -> bool {
        matches!(
            self,
            CssTokenKind::RParen | CssTokenKind::RBracket | CssTokenKind::RBrace
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_rule() {
        let kinds: Vec<_> = tokenize(".a { color: red; }").iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                CssTokenKind::Chunk,      // .a
                CssTokenKind::Whitespace,
                CssTokenKind::LBrace,
                CssTokenKind::Whitespace,
                CssTokenKind::Chunk,      // color
                CssTokenKind::Colon,
                CssTokenKind::Whitespace,
                CssTokenKind::Chunk,      // red
                CssTokenKind::Semicolon,
                CssTokenKind::Whitespace,
                CssTokenKind::RBrace,
            ]
        );
    }

    #[test]
    fn test_lex_at_keyword() {
        let tokens = tokenize("@st-import Comp from \"./comp.st.css\";");
        assert_eq!(tokens[0].kind, CssTokenKind::AtKeyword);
        assert_eq!(tokens[0].text, "@st-import");
        assert!(tokens.iter().any(|t| t.kind == CssTokenKind::String));
        assert_eq!(tokens.last().map(|t| t.kind), Some(CssTokenKind::Semicolon));
    }

    #[test]
    fn test_lex_comment_and_offsets() {
        let tokens = tokenize("/* x */.a");
        assert_eq!(tokens[0].kind, CssTokenKind::Comment);
        assert_eq!(tokens[1].kind, CssTokenKind::Chunk);
        assert_eq!(u32::from(tokens[1].offset), 7);
    }

    #[test]
    fn test_lex_url_value_keeps_parens() {
        let kinds: Vec<_> = tokenize("url(./a.png)").iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![CssTokenKind::Chunk, CssTokenKind::LParen, CssTokenKind::Chunk, CssTokenKind::RParen]
        );
    }
}
