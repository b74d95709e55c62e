//! AST builder.
//!
//! A recursive-descent parser tuned to recover function-call structure; it
//! is not a complete Pine Script grammar. Any expression shape the grammar
//! doesn't model collapses to `Expr::Unknown` rather than failing the parse.

use crate::ast::{Arg, Assignment, Expr, FunctionCall, Literal, Script, TopLevel, UdtDecl, UdtField};
use crate::diagnostic::Diagnostic;
use crate::span::Span;
use crate::token::{Token, TokenKind};

/// Default maximum nested-call depth.
pub const MAX_CALL_DEPTH: u32 = 32;

pub struct ParseResult {
    pub script: Script,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn parse(tokens: &[Token]) -> ParseResult {
    let mut parser = Parser {
        tokens,
        pos: 0,
        diagnostics: Vec::new(),
    };
    let script = parser.parse_script();
    ParseResult {
        script,
        diagnostics: parser.diagnostics,
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    fn at(&self, i: usize) -> &Token {
        self.tokens.get(i).unwrap_or_else(|| self.tokens.last().unwrap())
    }

    fn peek(&self) -> &Token {
        self.at(self.pos)
    }

    fn peek_n(&self, n: usize) -> &Token {
        self.at(self.pos + n)
    }

    fn is_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let t = self.peek().clone();
        if !matches!(t.kind, TokenKind::Eof) {
            self.pos += 1;
        }
        t
    }

    /// Skip `Comment` and (optionally) `Newline` tokens at the top level
    /// between statements.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek().kind {
                TokenKind::Comment | TokenKind::Newline => {
                    self.pos += 1;
                }
                _ => break,
            }
        }
    }

    fn parse_script(&mut self) -> Script {
        let mut body = Vec::new();
        self.skip_trivia();
        while !self.is_eof() {
            if let Some(stmt) = self.parse_statement() {
                body.push(stmt);
            }
            self.skip_trivia();
        }
        Script { body }
    }

    fn parse_statement(&mut self) -> Option<TopLevel> {
        if let TokenKind::Keyword = self.peek().kind {
            if self.peek().value == "type" {
                return Some(TopLevel::UdtDecl(self.parse_udt_decl()));
            }
        }

        let start_pos = self.pos;
        if let Some(assignment) = self.try_parse_assignment() {
            return Some(TopLevel::Assignment(assignment));
        }
        self.pos = start_pos;

        if let Some(call) = self.try_parse_call_statement() {
            return Some(TopLevel::Call(call));
        }
        self.pos = start_pos;

        Some(self.recover_unknown_statement())
    }

    /// Consume the rest of the current logical line (respecting bracket
    /// balance) as an `Unknown` statement.
    fn recover_unknown_statement(&mut self) -> TopLevel {
        let start = self.peek().span;
        let mut depth: i32 = 0;
        let mut end_pos = self.pos;
        loop {
            let t = self.at(end_pos);
            match t.kind {
                TokenKind::Eof => break,
                TokenKind::Punctuation if t.value == "(" || t.value == "[" => {
                    depth += 1;
                    end_pos += 1;
                }
                TokenKind::Punctuation if t.value == ")" || t.value == "]" => {
                    depth -= 1;
                    end_pos += 1;
                }
                TokenKind::Newline if depth <= 0 => {
                    if end_pos > 0 && self.at(end_pos - 1).expects_right_operand() {
                        end_pos += 1;
                        continue;
                    }
                    break;
                }
                _ => end_pos += 1,
            }
        }
        let text = self.text_between(self.pos, end_pos);
        let span = if end_pos > self.pos {
            start.merge(&self.at(end_pos.saturating_sub(1)).span)
        } else {
            start
        };
        self.pos = end_pos;
        TopLevel::Unknown {
            raw_text: text,
            span,
        }
    }

    fn text_between(&self, from: usize, to: usize) -> String {
        self.tokens[from..to.min(self.tokens.len())]
            .iter()
            .map(|t| t.value.clone())
            .collect::<Vec<_>>()
            .join(" ")
    }

    // ---- UDT declarations -------------------------------------------------

    fn parse_udt_decl(&mut self) -> UdtDecl {
        let start = self.peek().span;
        self.advance(); // `type`
        let name = if matches!(self.peek().kind, TokenKind::Identifier) {
            self.advance().value
        } else {
            String::new()
        };
        self.skip_trivia();

        let mut fields = Vec::new();
        loop {
            if !matches!(self.peek().kind, TokenKind::Keyword | TokenKind::Identifier) {
                break;
            }
            if self.peek().column() <= 1 {
                break;
            }
            let field_start = self.pos;
            let is_simple = matches!(self.peek().kind, TokenKind::Keyword) && self.peek().value == "simple";
            if is_simple {
                self.advance();
            }
            if !matches!(self.peek().kind, TokenKind::Identifier | TokenKind::Keyword) {
                self.pos = field_start;
                break;
            }
            let declared_type = self.advance().value;
            if !matches!(self.peek().kind, TokenKind::Identifier) {
                self.pos = field_start;
                break;
            }
            let field_name = self.advance().value;
            fields.push(UdtField {
                name: field_name,
                declared_type,
                is_simple_qualified: is_simple,
            });
            self.skip_trivia();
        }

        let end_span = self.tokens[self.pos.saturating_sub(1).max(0)].span;
        UdtDecl {
            name,
            fields,
            span: start.merge(&end_span),
        }
    }

    // ---- Assignments --------------------------------------------------------

    fn try_parse_assignment(&mut self) -> Option<Assignment> {
        let start = self.peek().span;

        if matches!(self.peek().kind, TokenKind::Keyword)
            && (self.peek().value == "var" || self.peek().value == "varip")
        {
            self.advance();
        }

        let declared_type;
        let target;
        if matches!(self.peek().kind, TokenKind::Identifier)
            && matches!(self.peek_n(1).kind, TokenKind::Identifier)
        {
            declared_type = Some(self.advance().value);
            target = self.advance().value;
        } else if matches!(self.peek().kind, TokenKind::Identifier) {
            declared_type = None;
            target = self.advance().value;
        } else {
            return None;
        }

        let is_assign_op = matches!(self.peek().kind, TokenKind::Operator)
            && (self.peek().value == "=" || self.peek().value == ":=");
        if !is_assign_op {
            return None;
        }
        self.advance();

        let value_end = self.find_statement_end();
        let value = self.parse_value_range(self.pos, value_end, 0);
        let end_span = if value_end > 0 {
            self.at(value_end.saturating_sub(1)).span
        } else {
            start
        };
        self.pos = value_end;

        Some(Assignment {
            target,
            declared_type,
            value,
            span: start.merge(&end_span),
        })
    }

    /// Position just past the end of the current logical statement: the
    /// next `Newline` at bracket depth 0, or `Eof`. A `Newline` right after a
    /// token that `expects_right_operand()` is a candidate line continuation
    /// — the statement keeps going so the line-continuation validator has a
    /// complete `Ternary` to judge; legality of that continuation is the
    /// validator's call, not the parser's.
    fn find_statement_end(&self) -> usize {
        let mut depth: i32 = 0;
        let mut i = self.pos;
        loop {
            let t = self.at(i);
            match t.kind {
                TokenKind::Eof => return i,
                TokenKind::Punctuation if t.value == "(" || t.value == "[" => {
                    depth += 1;
                    i += 1;
                }
                TokenKind::Punctuation if t.value == ")" || t.value == "]" => {
                    depth -= 1;
                    i += 1;
                }
                TokenKind::Newline if depth <= 0 => {
                    if i > 0 && self.at(i - 1).expects_right_operand() {
                        i += 1;
                        continue;
                    }
                    return i;
                }
                _ => i += 1,
            }
        }
    }

    // ---- Function calls -----------------------------------------------------

    fn try_parse_call_statement(&mut self) -> Option<FunctionCall> {
        let call = self.try_parse_call(0)?;
        // A call-as-statement should be followed by a newline/EOF, not by
        // trailing tokens that would make this a larger, unmodeled
        // expression statement.
        Some(call)
    }

    /// Try to parse `ident ('.' ident)? '(' args ')'` starting at the
    /// current position. Returns `None` (without consuming) if the shape
    /// doesn't match.
    fn try_parse_call(&mut self, depth: u32) -> Option<FunctionCall> {
        let start_pos = self.pos;
        let start_span = self.peek().span;

        if !matches!(self.peek().kind, TokenKind::Identifier) {
            return None;
        }
        let first = self.advance().value;

        let (namespace, name) = if matches!(self.peek().kind, TokenKind::Punctuation)
            && self.peek().value == "."
            && matches!(self.peek_n(1).kind, TokenKind::Identifier)
            && matches!(self.peek_n(2).kind, TokenKind::Punctuation)
            && self.peek_n(2).value == "("
        {
            self.advance(); // '.'
            let name = self.advance().value;
            (Some(first), name)
        } else {
            (None, first)
        };

        if !(matches!(self.peek().kind, TokenKind::Punctuation) && self.peek().value == "(") {
            self.pos = start_pos;
            return None;
        }

        if depth >= MAX_CALL_DEPTH {
            let open = self.pos;
            let close = self.matching_close(open, "(", ")");
            let span = start_span.merge(&self.at(close).span);
            self.diagnostics.push(Diagnostic::parse(
                format!("call nesting exceeds maximum depth of {}", MAX_CALL_DEPTH),
                span,
            ));
            self.pos = close + 1;
            return Some(FunctionCall {
                name,
                namespace,
                args: Vec::new(),
                span,
            });
        }

        self.advance(); // '('
        let close = self.matching_close(self.pos - 1, "(", ")");
        let args = self.parse_args(close, depth + 1);
        let end_span = self.at(close).span;
        self.pos = close + 1;

        Some(FunctionCall {
            name,
            namespace,
            args,
            span: start_span.merge(&end_span),
        })
    }

    /// Find the index of the token that matches the bracket opened at
    /// `open_pos` (whose value is `open`), scanning forward and tracking
    /// nested depth. Returns the index of `Eof` if unmatched.
    fn matching_close(&self, open_pos: usize, open: &str, close: &str) -> usize {
        let mut depth = 0i32;
        let mut i = open_pos;
        loop {
            let t = self.at(i);
            if matches!(t.kind, TokenKind::Eof) {
                return i;
            }
            if matches!(t.kind, TokenKind::Punctuation) {
                if t.value == open {
                    depth += 1;
                } else if t.value == close {
                    depth -= 1;
                    if depth == 0 {
                        return i;
                    }
                }
            }
            i += 1;
        }
    }

    /// Split the argument list between `self.pos` (just past `(`) and
    /// `close` (the matching `)`) on top-level commas, then parse each.
    fn parse_args(&mut self, close: usize, depth: u32) -> Vec<Arg> {
        let mut args = Vec::new();
        let mut i = self.pos;
        let mut arg_start = self.pos;
        let mut bracket_depth = 0i32;
        let mut position: u16 = 0;

        while i < close {
            let t = self.at(i);
            match t.kind {
                TokenKind::Punctuation if t.value == "(" || t.value == "[" => {
                    bracket_depth += 1;
                    i += 1;
                }
                TokenKind::Punctuation if t.value == ")" || t.value == "]" => {
                    bracket_depth -= 1;
                    i += 1;
                }
                TokenKind::Punctuation if t.value == "," && bracket_depth == 0 => {
                    if i > arg_start {
                        args.push(self.parse_arg(arg_start, i, position, depth));
                        position += 1;
                    }
                    i += 1;
                    arg_start = i;
                }
                _ => i += 1,
            }
        }
        if close > arg_start {
            args.push(self.parse_arg(arg_start, close, position, depth));
        }
        args
    }

    fn parse_arg(&mut self, start: usize, end: usize, position: u16, depth: u32) -> Arg {
        let span = self.at(start).span.merge(&self.at(end.saturating_sub(1)).span);

        // Named argument: `Identifier '=' ...` where the `=` directly
        // follows the identifier.
        let is_named = end.saturating_sub(start) >= 2
            && matches!(self.at(start).kind, TokenKind::Identifier)
            && matches!(self.at(start + 1).kind, TokenKind::Operator)
            && self.at(start + 1).value == "=";

        if is_named {
            let name = self.at(start).value.clone();
            let value = self.parse_value_range(start + 2, end, depth);
            Arg {
                position,
                name: Some(name),
                value,
                span,
            }
        } else {
            let value = self.parse_value_range(start, end, depth);
            Arg {
                position,
                name: None,
                value,
                span,
            }
        }
    }

    /// Attempt a structured parse of `tokens[start..end]`; if the grammar
    /// can't consume the whole range, fall back to `Expr::Unknown` over
    /// that range.
    fn parse_value_range(&mut self, start: usize, end: usize, depth: u32) -> Expr {
        if start >= end {
            let span = Span::point(self.at(start).span.line, self.at(start).span.column, self.at(start).span.offset);
            return Expr::Unknown {
                raw_text: String::new(),
                span,
            };
        }
        let mut sub = ValueCursor {
            tokens: self.tokens,
            pos: start,
            end,
            diagnostics: &mut self.diagnostics,
        };
        match sub.parse_ternary(depth) {
            Some(expr) if sub.pos >= end => expr,
            _ => {
                let span = self.at(start).span.merge(&self.at(end - 1).span);
                Expr::Unknown {
                    raw_text: self.text_between(start, end),
                    span,
                }
            }
        }
    }
}

/// A bounded sub-parser used for expression values inside an argument or
/// assignment RHS. Operates over `tokens[pos..end)`, skipping `Newline`
/// tokens transparently.
struct ValueCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    end: usize,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl<'a> ValueCursor<'a> {
    fn skip_newlines(&mut self) {
        while self.pos < self.end && matches!(self.tokens[self.pos].kind, TokenKind::Newline | TokenKind::Comment) {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<&Token> {
        self.skip_newlines();
        if self.pos < self.end {
            Some(&self.tokens[self.pos])
        } else {
            None
        }
    }

    fn peek_at(&self, extra_skip_from: usize) -> Option<&Token> {
        let mut i = extra_skip_from;
        while i < self.end && matches!(self.tokens[i].kind, TokenKind::Newline | TokenKind::Comment) {
            i += 1;
        }
        if i < self.end {
            Some(&self.tokens[i])
        } else {
            None
        }
    }

    fn advance(&mut self) -> Option<Token> {
        self.skip_newlines();
        if self.pos < self.end {
            let t = self.tokens[self.pos].clone();
            self.pos += 1;
            Some(t)
        } else {
            None
        }
    }

    fn parse_ternary(&mut self, depth: u32) -> Option<Expr> {
        let cond = self.parse_postfix(depth)?;
        self.skip_newlines();
        if let Some(t) = self.peek() {
            if matches!(t.kind, TokenKind::Operator) && t.value == "?" {
                let q_tok = self.advance().unwrap();
                let then_expr = self.parse_ternary(depth)?;
                self.skip_newlines();
                let colon = self.peek()?;
                if !(matches!(colon.kind, TokenKind::Operator) && colon.value == ":") {
                    return None;
                }
                let colon_tok = self.advance().unwrap();
                let else_expr = self.parse_ternary(depth)?;
                let span = cond.span().merge(&else_expr.span());
                return Some(Expr::Ternary {
                    cond: Box::new(cond),
                    then_expr: Box::new(then_expr),
                    else_expr: Box::new(else_expr),
                    q_span: q_tok.span,
                    colon_span: colon_tok.span,
                    span,
                });
            }
        }
        Some(cond)
    }

    fn parse_postfix(&mut self, depth: u32) -> Option<Expr> {
        let mut base = self.parse_primary(depth)?;
        loop {
            self.skip_newlines();
            let Some(t) = self.peek() else { break };
            if matches!(t.kind, TokenKind::Punctuation) && t.value == "." {
                if matches!(self.peek_at(self.pos + 1).map(|t| &t.kind), Some(TokenKind::Identifier)) {
                    self.advance(); // '.'
                    let field_tok = self.advance().unwrap();
                    let span = base.span().merge(&field_tok.span);
                    base = Expr::FieldAccess {
                        object: Box::new(base),
                        field: field_tok.value,
                        span,
                    };
                    continue;
                } else {
                    break;
                }
            }
            if matches!(t.kind, TokenKind::Punctuation) && t.value == "[" {
                let open_pos = self.pos;
                self.skip_newlines();
                let close = self.matching_close_in(open_pos, "[", "]");
                if close >= self.end {
                    break;
                }
                self.advance(); // '['
                let mut inner = ValueCursor {
                    tokens: self.tokens,
                    pos: self.pos,
                    end: close,
                    diagnostics: self.diagnostics,
                };
                let index_expr = inner.parse_ternary(depth);
                let Some(index_expr) = index_expr else { break };
                if inner.pos < close {
                    break;
                }
                self.pos = close + 1;
                let span = base.span().merge(&self.tokens[close].span);
                base = Expr::HistoryAccess {
                    target: Box::new(base),
                    index_expr: Box::new(index_expr),
                    span,
                };
                continue;
            }
            break;
        }
        Some(base)
    }

    fn matching_close_in(&self, open_pos: usize, open: &str, close: &str) -> usize {
        let mut depth = 0i32;
        let mut i = open_pos;
        while i < self.end {
            let t = &self.tokens[i];
            if matches!(t.kind, TokenKind::Punctuation) {
                if t.value == open {
                    depth += 1;
                } else if t.value == close {
                    depth -= 1;
                    if depth == 0 {
                        return i;
                    }
                }
            }
            i += 1;
        }
        self.end
    }

    fn parse_primary(&mut self, depth: u32) -> Option<Expr> {
        let t = self.peek()?.clone();
        match t.kind {
            TokenKind::String => {
                self.advance();
                Some(Expr::Literal {
                    value: Literal::String(t.value),
                    span: t.span,
                })
            }
            TokenKind::Integer => {
                self.advance();
                let v: i64 = t.value.parse().unwrap_or(0);
                Some(Expr::Literal {
                    value: Literal::Int(v),
                    span: t.span,
                })
            }
            TokenKind::Float => {
                self.advance();
                let v: f64 = t.value.parse().unwrap_or(0.0);
                Some(Expr::Literal {
                    value: Literal::Float(v),
                    span: t.span,
                })
            }
            TokenKind::Operator if t.value == "-" || t.value == "+" => {
                let next = self.peek_at(self.pos + 1)?.clone();
                let negate = t.value == "-";
                match next.kind {
                    TokenKind::Integer => {
                        self.advance();
                        self.advance();
                        let v: i64 = next.value.parse().unwrap_or(0);
                        Some(Expr::Literal {
                            value: Literal::Int(if negate { -v } else { v }),
                            span: t.span.merge(&next.span),
                        })
                    }
                    TokenKind::Float => {
                        self.advance();
                        self.advance();
                        let v: f64 = next.value.parse().unwrap_or(0.0);
                        Some(Expr::Literal {
                            value: Literal::Float(if negate { -v } else { v }),
                            span: t.span.merge(&next.span),
                        })
                    }
                    _ => None,
                }
            }
            TokenKind::Keyword if t.value == "true" || t.value == "false" => {
                self.advance();
                Some(Expr::Literal {
                    value: Literal::Bool(t.value == "true"),
                    span: t.span,
                })
            }
            TokenKind::Keyword if t.value == "na" => {
                self.advance();
                Some(Expr::Literal {
                    value: Literal::NaLit,
                    span: t.span,
                })
            }
            TokenKind::Punctuation if t.value == "(" => {
                let open_pos = self.pos;
                let close = self.matching_close_in(open_pos, "(", ")");
                if close >= self.end {
                    return None;
                }
                self.advance(); // '('
                let mut inner = ValueCursor {
                    tokens: self.tokens,
                    pos: self.pos,
                    end: close,
                    diagnostics: self.diagnostics,
                };
                let expr = inner.parse_ternary(depth)?;
                if inner.pos < close {
                    return None;
                }
                self.pos = close + 1;
                Some(expr)
            }
            TokenKind::Identifier => self.parse_identifier_or_call(depth),
            _ => None,
        }
    }

    fn skip_trivia_from(&self, mut i: usize) -> usize {
        while i < self.end && matches!(self.tokens[i].kind, TokenKind::Newline | TokenKind::Comment) {
            i += 1;
        }
        i
    }

    fn parse_identifier_or_call(&mut self, depth: u32) -> Option<Expr> {
        let first = self.advance()?;

        let i1 = self.skip_trivia_from(self.pos);
        let dot_here =
            i1 < self.end && matches!(self.tokens[i1].kind, TokenKind::Punctuation) && self.tokens[i1].value == ".";
        let i2 = if dot_here { self.skip_trivia_from(i1 + 1) } else { i1 };
        let ident_after_dot = dot_here && i2 < self.end && matches!(self.tokens[i2].kind, TokenKind::Identifier);
        let i3 = if ident_after_dot { self.skip_trivia_from(i2 + 1) } else { i2 };
        let paren_after_ident = ident_after_dot
            && i3 < self.end
            && matches!(self.tokens[i3].kind, TokenKind::Punctuation)
            && self.tokens[i3].value == "(";
        let is_namespaced_call = dot_here && ident_after_dot && paren_after_ident;

        let (namespace, name) = if is_namespaced_call {
            let name_tok = self.tokens[i2].clone();
            self.pos = i2 + 1;
            (Some(first.value.clone()), name_tok.value)
        } else {
            (None, first.value.clone())
        };

        let is_call = {
            let j = self.skip_trivia_from(self.pos);
            j < self.end && matches!(self.tokens[j].kind, TokenKind::Punctuation) && self.tokens[j].value == "("
        };

        if !is_call {
            return Some(Expr::Identifier {
                name: first.value,
                span: first.span,
            });
        }

        if depth >= MAX_CALL_DEPTH {
            let open_pos = self.pos;
            let close = self.matching_close_in(open_pos, "(", ")");
            let span = first.span.merge(&self.tokens[close.min(self.end - 1)].span);
            self.diagnostics.push(Diagnostic::parse(
                format!("call nesting exceeds maximum depth of {}", MAX_CALL_DEPTH),
                span,
            ));
            self.pos = (close + 1).min(self.end);
            return Some(Expr::Unknown {
                raw_text: format!("{}(...)", name),
                span,
            });
        }

        self.advance(); // '('
        let open_pos = self.pos - 1;
        let close = self.matching_close_in(open_pos, "(", ")");
        if close >= self.end {
            return None;
        }
        let args = self.parse_call_args(close, depth + 1);
        let end_span = self.tokens[close].span;
        self.pos = close + 1;
        Some(Expr::Call(Box::new(FunctionCall {
            name,
            namespace,
            args,
            span: first.span.merge(&end_span),
        })))
    }

    fn parse_call_args(&mut self, close: usize, depth: u32) -> Vec<Arg> {
        let mut args = Vec::new();
        let mut i = self.pos;
        let mut arg_start = self.pos;
        let mut bracket_depth = 0i32;
        let mut position: u16 = 0;

        while i < close {
            let t = &self.tokens[i];
            match t.kind {
                TokenKind::Punctuation if t.value == "(" || t.value == "[" => {
                    bracket_depth += 1;
                    i += 1;
                }
                TokenKind::Punctuation if t.value == ")" || t.value == "]" => {
                    bracket_depth -= 1;
                    i += 1;
                }
                TokenKind::Punctuation if t.value == "," && bracket_depth == 0 => {
                    if i > arg_start {
                        args.push(self.parse_one_arg(arg_start, i, position, depth));
                        position += 1;
                    }
                    i += 1;
                    arg_start = i;
                }
                _ => i += 1,
            }
        }
        if close > arg_start {
            args.push(self.parse_one_arg(arg_start, close, position, depth));
        }
        self.pos = close;
        args
    }

    fn parse_one_arg(&mut self, start: usize, end: usize, position: u16, depth: u32) -> Arg {
        let span = self.tokens[start].span.merge(&self.tokens[end - 1].span);
        let is_named = end.saturating_sub(start) >= 2
            && matches!(self.tokens[start].kind, TokenKind::Identifier)
            && matches!(self.tokens[start + 1].kind, TokenKind::Operator)
            && self.tokens[start + 1].value == "=";

        let (name, value_start) = if is_named {
            (Some(self.tokens[start].value.clone()), start + 2)
        } else {
            (None, start)
        };

        let mut sub = ValueCursor {
            tokens: self.tokens,
            pos: value_start,
            end,
            diagnostics: self.diagnostics,
        };
        let value = match sub.parse_ternary(depth) {
            Some(v) if sub.pos >= end => v,
            _ => Expr::Unknown {
                raw_text: self.tokens[value_start..end]
                    .iter()
                    .map(|t| t.value.clone())
                    .collect::<Vec<_>>()
                    .join(" "),
                span,
            },
        };

        Arg {
            position,
            name,
            value,
            span,
        }
    }
}

impl Token {
    fn column(&self) -> u32 {
        self.span.column
    }
}
