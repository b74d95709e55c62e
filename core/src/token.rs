//! Token kinds produced by the lexer.

use serde::{Deserialize, Serialize};

use crate::span::Span;

/// The closed set of token kinds. `Newline` is retained in the stream (not
/// discarded) because the line-continuation validator inspects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TokenKind {
    Identifier,
    Keyword,
    String,
    Integer,
    Float,
    Operator,
    Punctuation,
    Newline,
    Indent,
    Dedent,
    LineContinuation,
    Comment,
    Unknown,
    Eof,
}

/// A lexed token. `value` holds the literal text (or, for numeric/string
/// literals, the text as written — parsing into `i64`/`f64` happens in the
/// AST builder, which is where the spec's literal-inference rules live).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            value: value.into(),
            span,
        }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }

    /// Operators/keywords after which a `Newline` is a *candidate* line
    /// continuation.
    pub fn expects_right_operand(&self) -> bool {
        match self.kind {
            TokenKind::Operator => matches!(
                self.value.as_str(),
                "?" | "+"
                    | "-"
                    | "*"
                    | "/"
                    | "%"
                    | ","
                    | ":="
                    | "="
                    | "=="
                    | "!="
                    | "<="
                    | ">="
                    | "<"
                    | ">"
                    | "+="
                    | "-="
                    | "*="
                    | "/="
                    | ":"
            ),
            TokenKind::Punctuation => matches!(self.value.as_str(), "(" | "[" | ","),
            TokenKind::Keyword => matches!(self.value.as_str(), "and" | "or" | "not"),
            _ => false,
        }
    }
}

/// Keywords recognized by the lexer. An identifier matching
/// one of these is emitted as `Keyword` instead of `Identifier`.
///
/// Pine's built-in type names (`int`, `float`, `string`, `color`, ...) and
/// namespace roots (`table`, `line`, `box`, `label`, `array`, `matrix`,
/// `map`) are deliberately excluded: they double as both type-annotation
/// words and callable namespaces (`table.cell(...)`, `int(expr)`), and the
/// parser only recognizes calls and namespaced calls starting from an
/// `Identifier`. Keeping them as `Keyword` would make every such call
/// unparseable.
pub const KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "var", "varip", "import", "export", "true", "false",
    "na", "and", "or", "not", "switch", "type", "method", "return", "break", "continue", "function",
    "const", "series", "simple",
];

pub fn is_keyword(ident: &str) -> bool {
    KEYWORDS.contains(&ident)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_keywords() {
        assert!(is_keyword("var"));
        assert!(is_keyword("na"));
        assert!(!is_keyword("close"));
    }

    #[test]
    fn question_mark_expects_right_operand() {
        let t = Token::new(TokenKind::Operator, "?", Span::point(1, 1, 0));
        assert!(t.expects_right_operand());
    }

    #[test]
    fn colon_punctuation_does_not_expect_operand() {
        let t = Token::new(TokenKind::Punctuation, ")", Span::point(1, 1, 0));
        assert!(!t.expects_right_operand());
    }
}
