//! Source text to token stream.
//!
//! The lexer is a pure function: it owns no state beyond the cursor it walks
//! the source with, and it never recovers from an error — an unrecognized
//! leading character aborts tokenization immediately.

use crate::error::{KvazzError, KvazzResult};
use crate::token::{Span, Token, TokenKind, KEYWORDS, MULTI_CHAR_SYMBOLS, SINGLE_CHAR_SYMBOLS};

struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source: source.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        // Source is required to be valid UTF-8; the classes we split
        // on (whitespace, ASCII punctuation, quotes) never fall inside a
        // multi-byte scalar, so byte slicing stays on char boundaries.
        std::str::from_utf8(&self.source[start..end]).unwrap_or_default()
    }

    fn run(mut self) -> KvazzResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments()?;
            let Some(c) = self.peek() else {
                break;
            };
            let start = self.pos;
            let token = if is_ident_start(c) {
                self.lex_word(start)
            } else if c.is_ascii_digit() {
                self.lex_number(start)
            } else if c == b'"' || c == b'\'' {
                self.lex_string(start, c)
            } else {
                self.lex_symbol(start)?
            };
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn skip_whitespace_and_comments(&mut self) -> KvazzResult<()> {
        loop {
            match self.peek() {
                Some(c) if c.is_ascii_whitespace() => {
                    self.bump();
                }
                Some(b'~') => {
                    let start = self.pos;
                    self.bump();
                    if self.peek() == Some(b'~') {
                        self.bump();
                        loop {
                            match self.peek() {
                                None => {
                                    return Err(KvazzError::lexical(
                                        "unterminated multi-line comment",
                                        Span::new(start, self.pos),
                                    ))
                                }
                                Some(b'~') if self.peek_at(1) == Some(b'~') => {
                                    self.bump();
                                    self.bump();
                                    break;
                                }
                                _ => {
                                    self.bump();
                                }
                            }
                        }
                    } else {
                        while let Some(c) = self.peek() {
                            if c == b'\n' {
                                break;
                            }
                            self.bump();
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn lex_word(&mut self, start: usize) -> Token {
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                self.bump();
            } else {
                break;
            }
        }
        let text = self.slice(start, self.pos);
        let kind = if KEYWORDS.contains(&text) {
            TokenKind::Keyword
        } else if text == "true" || text == "false" {
            TokenKind::BoolLiteral
        } else {
            TokenKind::Identifier
        };
        Token::new(text, kind, Span::new(start, self.pos))
    }

    fn lex_number(&mut self, start: usize) -> Token {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
        }
        let mut kind = TokenKind::IntLiteral;
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
            kind = TokenKind::RealLiteral;
            self.bump();
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.bump();
            }
        }
        Token::new(self.slice(start, self.pos), kind, Span::new(start, self.pos))
    }

    fn lex_string(&mut self, start: usize, quote: u8) -> Token {
        self.bump(); // opening quote
        let content_start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                break;
            }
            self.bump();
        }
        let content = self.slice(content_start, self.pos);
        if self.peek() == Some(quote) {
            self.bump();
        }
        Token::new(content, TokenKind::StringLiteral, Span::new(start, self.pos))
    }

    fn lex_symbol(&mut self, start: usize) -> KvazzResult<Token> {
        if let Some(two) = self.two_char_lookahead() {
            if MULTI_CHAR_SYMBOLS.contains(&two.as_str()) {
                self.bump();
                self.bump();
                return Ok(Token::new(two, TokenKind::Symbol, Span::new(start, self.pos)));
            }
        }
        let c = self.peek().expect("caller checked a character is present");
        if (c as char).is_ascii() && SINGLE_CHAR_SYMBOLS.contains(&(c as char)) {
            self.bump();
            return Ok(Token::new(
                (c as char).to_string(),
                TokenKind::Symbol,
                Span::new(start, self.pos),
            ));
        }
        Err(KvazzError::lexical(
            format!("unrecognized character '{}'", c as char),
            Span::new(start, start + 1),
        ))
    }

    fn two_char_lookahead(&self) -> Option<String> {
        let a = self.peek()?;
        let b = self.peek_at(1)?;
        Some(format!("{}{}", a as char, b as char))
    }
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Tokenizes `source`, returning an error on the first unrecognized
/// character rather than attempting recovery.
pub fn lex(source: &str) -> KvazzResult<Vec<Token>> {
    let tokens = Lexer::new(source).run()?;
    tracing::debug!(token_count = tokens.len(), "lexed source");
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        lex(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn skips_whitespace() {
        assert_eq!(kinds("   \t\n  "), vec![]);
    }

    #[test]
    fn identifiers_and_keywords() {
        let tokens = lex("var foo if true false").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| (t.lexeme.as_str(), t.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("var", TokenKind::Keyword),
                ("foo", TokenKind::Identifier),
                ("if", TokenKind::Keyword),
                ("true", TokenKind::BoolLiteral),
                ("false", TokenKind::BoolLiteral),
            ]
        );
    }

    #[test]
    fn numbers() {
        let tokens = lex("42 3.14 7.").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::IntLiteral);
        assert_eq!(tokens[1].kind, TokenKind::RealLiteral);
        // "7." has no trailing digit, so the '.' is not consumed into the number.
        assert_eq!(tokens[2].lexeme, "7");
        assert_eq!(tokens[3].lexeme, ".");
    }

    #[test]
    fn string_literals_either_quote() {
        let tokens = lex(r#""hi" 'there'"#).unwrap();
        assert_eq!(tokens[0].lexeme, "hi");
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[1].lexeme, "there");
    }

    #[test]
    fn line_comment() {
        let tokens = lex("1 ~ trailing comment\n2").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].lexeme, "1");
        assert_eq!(tokens[1].lexeme, "2");
    }

    #[test]
    fn block_comment() {
        let tokens = lex("1 ~~ spans\n lines ~~ 2").unwrap();
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn multi_char_symbols_prefer_longest_match() {
        let tokens = lex("<[ ]> == += <=").unwrap();
        let lexemes: Vec<_> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["<[", "]>", "==", "+=", "<="]);
    }

    #[test]
    fn unrecognized_character_aborts() {
        let err = lex("1 @ 2").unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Lexical);
    }
}
