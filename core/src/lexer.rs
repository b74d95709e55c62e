//! Streaming lexer for Pine Script v6.
//!
//! Stateless between calls: `lex(source)` consumes the whole string and
//! returns the full token stream plus any lexical diagnostics. Illegal bytes
//! never abort the scan — they become an `Unknown` token and lexing resumes
//! at the next byte.

use crate::diagnostic::{Diagnostic, Severity};
use crate::span::Span;
use crate::token::{is_keyword, Token, TokenKind};

/// First-line `//@version=` / `//@description=` pragma captured for the
/// review engine.
#[derive(Debug, Clone, Default)]
pub struct LexMetadata {
    pub version_pragma: Option<String>,
    pub description_pragma: Option<String>,
}

pub struct LexResult {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
    pub metadata: LexMetadata,
}

struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
    metadata: LexMetadata,
}

/// Tokenize `source`. The caller is responsible for `\r\n → \n` normalization;
/// this lexer assumes `\n`-only line endings.
pub fn lex(source: &str) -> LexResult {
    let mut lexer = Lexer {
        src: source.as_bytes(),
        pos: 0,
        line: 1,
        column: 1,
        tokens: Vec::new(),
        diagnostics: Vec::new(),
        metadata: LexMetadata::default(),
    };
    lexer.run();
    LexResult {
        tokens: lexer.tokens,
        diagnostics: lexer.diagnostics,
        metadata: lexer.metadata,
    }
}

impl<'a> Lexer<'a> {
    fn run(&mut self) {
        while self.pos < self.src.len() {
            self.scan_one();
        }
        let span = Span::point(self.line, self.column, self.pos as u32);
        self.tokens.push(Token::new(TokenKind::Eof, "", span));
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.src.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }

    fn start(&self) -> (u32, u32, u32) {
        (self.line, self.column, self.pos as u32)
    }

    fn span_from(&self, start: (u32, u32, u32)) -> Span {
        Span::new(start.0, start.1, start.2, self.pos as u32 - start.2)
    }

    fn push(&mut self, kind: TokenKind, value: impl Into<String>, start: (u32, u32, u32)) {
        let span = self.span_from(start);
        self.tokens.push(Token::new(kind, value, span));
    }

    fn scan_one(&mut self) {
        let c = match self.peek() {
            Some(c) => c,
            None => return,
        };

        match c {
            b'\n' => self.scan_newline(),
            b' ' | b'\t' | b'\r' => {
                self.advance();
            }
            b'/' if self.peek_at(1) == Some(b'/') => self.scan_comment(),
            b'"' | b'\'' => self.scan_string(c),
            b'0'..=b'9' => self.scan_number(),
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => self.scan_identifier(),
            b'(' | b')' | b'[' | b']' | b',' | b'.' => self.scan_punctuation(),
            b':' | b'?' | b'+' | b'-' | b'*' | b'/' | b'%' | b'=' | b'!' | b'<' | b'>' => {
                self.scan_operator()
            }
            _ => self.scan_illegal_byte(c),
        }
    }

    fn scan_newline(&mut self) {
        let start = self.start();
        self.advance();
        self.push(TokenKind::Newline, "\n", start);
    }

    fn scan_comment(&mut self) {
        let start = self.start();
        self.advance();
        self.advance();
        let text_start = self.pos;
        while let Some(c) = self.peek() {
            if c == b'\n' {
                break;
            }
            self.advance();
        }
        let text = String::from_utf8_lossy(&self.src[text_start..self.pos]).into_owned();
        let trimmed = text.trim_start();
        if let Some(rest) = trimmed.strip_prefix("@version=") {
            if self.metadata.version_pragma.is_none() {
                self.metadata.version_pragma = Some(rest.trim().to_string());
            }
        } else if let Some(rest) = trimmed.strip_prefix("@description=") {
            if self.metadata.description_pragma.is_none() {
                self.metadata.description_pragma = Some(rest.trim().to_string());
            }
        }
        self.push(TokenKind::Comment, format!("//{}", text), start);
    }

    fn scan_string(&mut self, quote: u8) {
        let start = self.start();
        self.advance();
        let mut value = String::new();
        let mut terminated = false;
        while let Some(c) = self.peek() {
            if c == quote {
                self.advance();
                terminated = true;
                break;
            }
            if c == b'\n' {
                break;
            }
            if c == b'\\' {
                self.advance();
                match self.peek() {
                    Some(b'n') => {
                        value.push('\n');
                        self.advance();
                    }
                    Some(b't') => {
                        value.push('\t');
                        self.advance();
                    }
                    Some(b'\\') => {
                        value.push('\\');
                        self.advance();
                    }
                    Some(b'"') => {
                        value.push('"');
                        self.advance();
                    }
                    Some(b'\'') => {
                        value.push('\'');
                        self.advance();
                    }
                    Some(other) => {
                        value.push(other as char);
                        self.advance();
                    }
                    None => {}
                }
                continue;
            }
            value.push(c as char);
            self.advance();
        }

        if !terminated {
            let span = self.span_from(start);
            self.diagnostics.push(Diagnostic::lexical(
                "unterminated string literal",
                span,
            ));
            // Recovery: resume at the next newline.
            while let Some(c) = self.peek() {
                if c == b'\n' {
                    break;
                }
                self.advance();
            }
        }
        self.push(TokenKind::String, value, start);
    }

    fn scan_number(&mut self) {
        let start = self.start();
        let mut is_float = false;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.advance();
        }
        if self.peek() == Some(b'.') && matches!(self.peek_at(1), Some(b'0'..=b'9')) {
            is_float = true;
            self.advance();
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some(b'e') | Some(b'E')) {
            let mut lookahead = 1;
            if matches!(self.peek_at(lookahead), Some(b'+') | Some(b'-')) {
                lookahead += 1;
            }
            if matches!(self.peek_at(lookahead), Some(b'0'..=b'9')) {
                is_float = true;
                for _ in 0..=lookahead {
                    self.advance();
                }
                while matches!(self.peek(), Some(b'0'..=b'9')) {
                    self.advance();
                }
            }
        }
        let span = self.span_from(start);
        let text =
            String::from_utf8_lossy(&self.src[span.offset as usize..span.end_offset() as usize])
                .into_owned();
        self.push(
            if is_float {
                TokenKind::Float
            } else {
                TokenKind::Integer
            },
            text,
            start,
        );
    }

    fn scan_identifier(&mut self) {
        let start = self.start();
        while matches!(self.peek(), Some(b'A'..=b'Z') | Some(b'a'..=b'z') | Some(b'0'..=b'9') | Some(b'_'))
        {
            self.advance();
        }
        let span = self.span_from(start);
        let text =
            String::from_utf8_lossy(&self.src[span.offset as usize..span.end_offset() as usize])
                .into_owned();
        let kind = if is_keyword(&text) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        self.push(kind, text, start);
    }

    fn scan_punctuation(&mut self) {
        let start = self.start();
        let c = self.advance().unwrap();
        self.push(TokenKind::Punctuation, (c as char).to_string(), start);
    }

    fn scan_operator(&mut self) {
        let start = self.start();
        let c = self.advance().unwrap();
        let two_char = |this: &mut Self, second: u8, combined: &str| -> Option<String> {
            if this.peek() == Some(second) {
                this.advance();
                Some(combined.to_string())
            } else {
                None
            }
        };

        let value = match c {
            b':' => {
                if let Some(v) = two_char(self, b'=', ":=") {
                    v
                } else {
                    ":".to_string()
                }
            }
            b'=' => {
                if let Some(v) = two_char(self, b'=', "==") {
                    v
                } else {
                    "=".to_string()
                }
            }
            b'!' => {
                if let Some(v) = two_char(self, b'=', "!=") {
                    v
                } else {
                    "!".to_string()
                }
            }
            b'<' => {
                if let Some(v) = two_char(self, b'=', "<=") {
                    v
                } else {
                    "<".to_string()
                }
            }
            b'>' => {
                if let Some(v) = two_char(self, b'=', ">=") {
                    v
                } else {
                    ">".to_string()
                }
            }
            b'+' => {
                if let Some(v) = two_char(self, b'=', "+=") {
                    v
                } else {
                    "+".to_string()
                }
            }
            b'-' => {
                if let Some(v) = two_char(self, b'=', "-=") {
                    v
                } else {
                    "-".to_string()
                }
            }
            b'*' => {
                if let Some(v) = two_char(self, b'=', "*=") {
                    v
                } else {
                    "*".to_string()
                }
            }
            b'/' => {
                if let Some(v) = two_char(self, b'=', "/=") {
                    v
                } else {
                    "/".to_string()
                }
            }
            b'%' => "%".to_string(),
            b'?' => "?".to_string(),
            _ => unreachable!("scan_operator called on non-operator byte"),
        };
        self.push(TokenKind::Operator, value, start);
    }

    fn scan_illegal_byte(&mut self, c: u8) {
        let start = self.start();
        self.advance();
        let span = self.span_from(start);
        self.diagnostics.push(Diagnostic::lexical(
            format!("illegal byte 0x{:02x}", c),
            span,
        ));
        self.push(TokenKind::Unknown, (c as char).to_string(), start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<&TokenKind> {
        tokens.iter().map(|t| &t.kind).collect()
    }

    #[test]
    fn lexes_simple_call() {
        let r = lex(r#"indicator("Test", precision=2)"#);
        assert_eq!(
            kinds(&r.tokens),
            vec![
                &TokenKind::Identifier,
                &TokenKind::Punctuation,
                &TokenKind::String,
                &TokenKind::Punctuation,
                &TokenKind::Identifier,
                &TokenKind::Operator,
                &TokenKind::Integer,
                &TokenKind::Punctuation,
                &TokenKind::Eof,
            ]
        );
        assert!(r.diagnostics.is_empty());
    }

    #[test]
    fn distinguishes_integer_float_and_scientific() {
        let r = lex("1 1.5 1e3 1.2e-4");
        let numeric: Vec<_> = r
            .tokens
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Integer | TokenKind::Float))
            .collect();
        assert_eq!(numeric[0].kind, TokenKind::Integer);
        assert_eq!(numeric[1].kind, TokenKind::Float);
        assert_eq!(numeric[2].kind, TokenKind::Float);
        assert_eq!(numeric[3].kind, TokenKind::Float);
    }

    #[test]
    fn keywords_are_tagged_keyword_not_identifier() {
        let r = lex("var x = na");
        assert_eq!(r.tokens[0].kind, TokenKind::Keyword);
        assert_eq!(r.tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn string_escapes_are_decoded() {
        let r = lex(r#""a\nb\"c""#);
        let s = r.tokens.iter().find(|t| t.kind == TokenKind::String).unwrap();
        assert_eq!(s.value, "a\nb\"c");
    }

    #[test]
    fn unterminated_string_recovers_at_newline() {
        let r = lex("\"abc\nx = 1");
        assert_eq!(r.diagnostics.len(), 1);
        // lexing continues after the bad string
        assert!(r.tokens.iter().any(|t| t.value == "x"));
    }

    #[test]
    fn illegal_byte_yields_unknown_and_continues() {
        let r = lex("x = 1 @ 2");
        assert_eq!(r.diagnostics.len(), 1);
        assert!(r.tokens.iter().any(|t| t.kind == TokenKind::Unknown));
        assert!(r.tokens.iter().any(|t| t.value == "2"));
    }

    #[test]
    fn version_pragma_is_captured_as_metadata() {
        let r = lex("//@version=6\nindicator(\"x\")");
        assert_eq!(r.metadata.version_pragma.as_deref(), Some("6"));
    }

    #[test]
    fn byte_offsets_cover_the_whole_input() {
        let src = "a = 1 + 2\n";
        let r = lex(src);
        let last_real = r.tokens.iter().rev().find(|t| !t.is_eof()).unwrap();
        assert!(last_real.span.end_offset() as usize <= src.len());
    }
}
