//! Line-continuation validation.
//!
//! The parser treats a bare newline after a token that
//! `expects_right_operand()` as a candidate continuation so the statement
//! still parses as one expression (see `parser::find_statement_end`); this
//! validator is what actually judges the continuation illegal when it
//! happens outside brackets. Only ternary contexts are flagged — a newline
//! between a `Ternary`'s `?` and `:`, or between its `:` and the else
//! branch, outside brackets — not every newline after a right-operand token
//! (ordinary continuations like `x = a and\n b` are left alone).

use crate::ast::Expr;
use crate::catalog::DiagnosticCode;
use crate::diagnostic::Diagnostic;
use crate::token::TokenKind;

use super::context::ReviewContext;

/// Byte ranges, within a ternary, where a newline outside brackets is illegal:
/// from just after `?` to `:`, and from just after `:` to the end of the
/// ternary (covering the else branch).
fn ternary_ranges(expr: &Expr, out: &mut Vec<(u32, u32)>) {
    if let Expr::Ternary {
        cond,
        then_expr,
        else_expr,
        q_span,
        colon_span,
        span,
    } = expr
    {
        out.push((q_span.end_offset(), colon_span.offset));
        out.push((colon_span.end_offset(), span.end_offset()));
        ternary_ranges(cond, out);
        ternary_ranges(then_expr, out);
        ternary_ranges(else_expr, out);
    }
}

fn in_any_range(offset: u32, ranges: &[(u32, u32)]) -> bool {
    ranges.iter().any(|(start, end)| offset >= *start && offset < *end)
}

pub fn check(ctx: &ReviewContext) -> Vec<Diagnostic> {
    let mut ranges = Vec::new();
    for expr in ctx.all_exprs() {
        ternary_ranges(expr, &mut ranges);
    }
    if ranges.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut depth: i32 = 0;
    for (i, tok) in ctx.tokens.iter().enumerate() {
        match tok.kind {
            TokenKind::Punctuation if tok.value == "(" || tok.value == "[" => depth += 1,
            TokenKind::Punctuation if tok.value == ")" || tok.value == "]" => depth -= 1,
            TokenKind::Newline if depth <= 0 && i > 0 => {
                let prev = &ctx.tokens[i - 1];
                if prev.expects_right_operand() && in_any_range(prev.span.end_offset(), &ranges) {
                    out.push(
                        Diagnostic::new(
                            DiagnosticCode::InvalidLineContinuation,
                            DiagnosticCode::InvalidLineContinuation.default_severity(),
                            prev.span,
                            format!(
                                "'{}' cannot continue onto the next line outside brackets",
                                prev.value
                            ),
                        )
                        .with_meta("token", prev.value.clone()),
                    );
                }
            }
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CATALOG;
    use crate::lexer::lex;
    use crate::parser::parse;
    use std::time::Duration;

    fn run(src: &str) -> Vec<Diagnostic> {
        let tokens = lex(src).tokens;
        let script = parse(&tokens).script;
        let ctx = ReviewContext::new(&script, &tokens, &CATALOG, Duration::from_millis(50));
        check(&ctx)
    }

    #[test]
    fn ternary_operator_newline_outside_brackets_is_flagged() {
        let diags = run("x = cond ?\n    a : b");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::InvalidLineContinuation);
        assert_eq!(diags[0].line, 1);
    }

    #[test]
    fn multiline_call_inside_parens_is_not_flagged() {
        let diags = run("plot(\n    close,\n    color=color.red\n)");
        assert!(diags.is_empty());
    }

    #[test]
    fn single_line_statement_passes() {
        assert!(run("x = close + 1").is_empty());
    }

    #[test]
    fn and_continuation_outside_a_ternary_is_not_flagged() {
        assert!(run("x = close and\n    open").is_empty());
    }

    #[test]
    fn colon_newline_before_else_branch_is_flagged() {
        let diags = run("x = cond ? a :\n    b");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::InvalidLineContinuation);
    }
}
