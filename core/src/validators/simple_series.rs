//! Simple-where-series validation.

use crate::ast::Expr;
use crate::catalog::DiagnosticCode;
use crate::diagnostic::Diagnostic;
use crate::types::infer_kind;

use super::context::{resolve_param_name, ReviewContext};

pub fn check(ctx: &ReviewContext) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for call in ctx.all_calls() {
        let Some(entry) = ctx.catalog.guarded_function(&call.qualified_name()) else {
            continue;
        };
        if entry.simple_required_positions.is_empty() {
            continue;
        }
        for arg in &call.args {
            if !entry.simple_required_positions.contains(&arg.position) {
                continue;
            }
            if !is_series_violation(&arg.value, ctx) {
                continue;
            }
            let param_name = resolve_param_name(entry, arg).unwrap_or_else(|| arg.position.to_string());
            out.push(
                Diagnostic::new(
                    DiagnosticCode::SeriesTypeWhereSimpleExpected,
                    DiagnosticCode::SeriesTypeWhereSimpleExpected.default_severity(),
                    arg.value.span(),
                    format!(
                        "'{}' of '{}' requires a simple value but a series expression was passed",
                        param_name,
                        call.qualified_name()
                    ),
                )
                .with_meta("function_name", call.qualified_name())
                .with_meta("parameter_name", param_name)
                .with_meta("parameter_index", arg.position),
            );
        }
    }
    out
}

/// Does `expr`, passed where a *simple* value is required, actually resolve
/// to something series-typed?
///
/// `int(expr)` does not launder series-ness even though it isn't itself
/// known to the catalog as returning a series kind — an explicit cast is
/// special-cased to look through to its argument.
fn is_series_violation(expr: &Expr, ctx: &ReviewContext) -> bool {
    match expr {
        Expr::HistoryAccess { .. } => true,
        Expr::Call(c) if c.namespace.is_none() && c.name == "int" && c.args.len() == 1 => {
            is_series_violation(&c.args[0].value, ctx)
        }
        Expr::Call(c) => ctx
            .catalog
            .guarded_function(&c.qualified_name())
            .and_then(|e| e.return_kind)
            .map(|k| k.is_series())
            .unwrap_or_else(|| infer_kind(expr, ctx.catalog, &ctx.udts, &ctx.bindings).is_series()),
        _ => infer_kind(expr, ctx.catalog, &ctx.udts, &ctx.bindings).is_series(),
    }
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
    fn macd_with_non_simple_udt_fields_is_flagged_three_times() {
        let src = "type MarketSettings\n    float adaptiveFast\n    float adaptiveSlow\n    float dynamicSignal\n\nvar market = MarketSettings.new()\nh = ta.macd(close, market.adaptiveFast, market.adaptiveSlow, market.dynamicSignal)\n";
        let diags = run(src);
        assert_eq!(diags.len(), 3);
        for d in &diags {
            assert_eq!(d.code, DiagnosticCode::SeriesTypeWhereSimpleExpected);
        }
    }

    #[test]
    fn simple_qualified_udt_field_passes() {
        let tokens = lex("type S\n    simple float v\nvar S s = S.new()\nx = ta.sma(close, s.v)\n").tokens;
        let script = parse(&tokens).script;
        let ctx = ReviewContext::new(&script, &tokens, &CATALOG, Duration::from_millis(50));
        assert!(check(&ctx).is_empty());
    }

    #[test]
    fn history_access_in_simple_position_is_flagged() {
        let diags = run("x = ta.sma(close, len[1])");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn int_cast_does_not_launder_series() {
        let diags = run("x = ta.sma(close, int(close))");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn literal_length_passes() {
        assert!(run("x = ta.sma(close, 14)").is_empty());
    }
}
