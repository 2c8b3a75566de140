//! Token model produced by the lexer and consumed by the parser.

use std::fmt;

use strum::{Display, EnumString};

/// A half-open byte range `[start, end)` into the original source text.
///
/// Carried on every token so the CLI driver can turn a diagnostic into a
/// line/column without the lexer or parser needing to know about source
/// layout beyond raw offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Classification of a single token.
///
/// Display/EnumString give us the exact `lex` subcommand's kind-strings
/// (e.g. "int-literal") for free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
pub enum TokenKind {
    #[strum(serialize = "keyword")]
    Keyword,
    #[strum(serialize = "identifier")]
    Identifier,
    #[strum(serialize = "symbol")]
    Symbol,
    #[strum(serialize = "bool-literal")]
    BoolLiteral,
    #[strum(serialize = "int-literal")]
    IntLiteral,
    #[strum(serialize = "real-literal")]
    RealLiteral,
    #[strum(serialize = "string-literal")]
    StringLiteral,
    #[strum(serialize = "eof")]
    Eof,
}

/// A lexeme tagged with its kind and source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub lexeme: String,
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(lexeme: impl Into<String>, kind: TokenKind, span: Span) -> Self {
        Self {
            lexeme: lexeme.into(),
            kind,
            span,
        }
    }

    /// The sentinel yielded for any lookahead past the end of the token stream.
    pub fn eof() -> Self {
        Self {
            lexeme: String::new(),
            kind: TokenKind::Eof,
            span: Span::default(),
        }
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.lexeme == word
    }

    pub fn is_symbol(&self, sym: &str) -> bool {
        self.kind == TokenKind::Symbol && self.lexeme == sym
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(\"{}\", \"{}\")", self.lexeme, self.kind)
    }
}

/// Reserved words. `true`/`false` are lexed as bool literals, not keywords.
pub const KEYWORDS: &[&str] = &[
    "var", "if", "then", "else", "for", "while", "do", "in", "function", "return",
];

/// Two-character symbols, checked before falling back to single-character ones.
pub const MULTI_CHAR_SYMBOLS: &[&str] = &[
    "==", "!=", ">=", "<=", "+=", "-=", "*=", "/=", "%=", "<[", "]>",
];

/// Single-character symbols.
pub const SINGLE_CHAR_SYMBOLS: &[char] = &[
    '{', '}', '(', ')', '[', ']', '<', '>', '+', '-', '*', '/', '%', '!', '?', '=', '.', ',', '&',
    '|', ';', ':', '$',
];
