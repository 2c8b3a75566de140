//! Hand-rolled error type shared by the lexer, parser, and evaluator.
//!
//! The library never prints or exits on its own; it always hands a
//! `KvazzError` back to the caller. The CLI driver decides how to render it
//! and whether to exit the process.

use std::fmt;

use crate::token::Span;

/// The phase a `KvazzError` originated in. Purely informational; callers
/// that only care about the message can ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Parse,
    Name,
    Type,
    Index,
    Arithmetic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Lexical => "lexical error",
            Self::Parse => "parse error",
            Self::Name => "name error",
            Self::Type => "type error",
            Self::Index => "index error",
            Self::Arithmetic => "arithmetic error",
        };
        f.write_str(s)
    }
}

/// A single diagnostic produced anywhere in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvazzError {
    pub kind: ErrorKind,
    pub message: String,
    /// Byte offset into the source, when one is available. Absent for a
    /// handful of interpreter errors that have no single originating token.
    pub span: Option<Span>,
}

impl KvazzError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Option<Span>) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }

    pub fn lexical(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Lexical, message, Some(span))
    }

    pub fn parse(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Parse, message, Some(span))
    }

    pub fn name(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Name, message, None)
    }

    pub fn ty(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, message, None)
    }

    pub fn index(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Index, message, None)
    }

    pub fn arithmetic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Arithmetic, message, None)
    }
}

impl fmt::Display for KvazzError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for KvazzError {}

pub type KvazzResult<T> = Result<T, KvazzError>;
