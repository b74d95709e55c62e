//! Numeric range validation.
//!
//! Specific codes (`INVALID_PRECISION`, `INVALID_MAX_BARS_BACK`, the four
//! drawing-object codes) take precedence over the generic
//! `PARAMETER_RANGE_VALIDATION`.

use crate::ast::Arg;
use crate::catalog::{Catalog, DiagnosticCode, RangeConstraint};
use crate::diagnostic::Diagnostic;

use super::context::{resolve_param_name, ReviewContext};

pub fn check(ctx: &ReviewContext) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for call in ctx.all_calls() {
        let Some(entry) = ctx.catalog.guarded_function(&call.qualified_name()) else {
            continue;
        };
        if entry.range_constraints.is_empty() {
            continue;
        }
        for arg in &call.args {
            let Some(param_name) = resolve_param_name(entry, arg) else {
                continue;
            };
            let Some(constraint) = entry.range_constraints.get(param_name.as_str()) else {
                continue;
            };
            let Some((value, is_int_literal)) = arg.value.as_number_literal() else {
                continue;
            };
            let code = specific_code(&param_name);

            if constraint.integer && !is_int_literal {
                out.push(make_diag(
                    code,
                    call,
                    &param_name,
                    arg,
                    value,
                    is_int_literal,
                    constraint,
                    "must be an integer",
                ));
                continue;
            }
            if value < constraint.min || value > constraint.max {
                out.push(make_diag(
                    code,
                    call,
                    &param_name,
                    arg,
                    value,
                    is_int_literal,
                    constraint,
                    "is out of range",
                ));
            }
        }
    }
    out
}

fn specific_code(param_name: &str) -> DiagnosticCode {
    if let Some(code) = Catalog::drawing_count_code(param_name) {
        return code;
    }
    match param_name {
        "precision" => DiagnosticCode::InvalidPrecision,
        "max_bars_back" => DiagnosticCode::InvalidMaxBarsBack,
        _ => DiagnosticCode::ParameterRangeValidation,
    }
}

#[allow(clippy::too_many_arguments)]
fn make_diag(
    code: DiagnosticCode,
    call: &crate::ast::FunctionCall,
    param_name: &str,
    arg: &Arg,
    value: f64,
    is_int: bool,
    constraint: &RangeConstraint,
    reason: &str,
) -> Diagnostic {
    let mut d = Diagnostic::new(
        code,
        code.default_severity(),
        arg.value.span(),
        format!(
            "'{}' {} (expected [{}, {}]{})",
            param_name,
            reason,
            fmt_num(constraint.min),
            fmt_num(constraint.max),
            if constraint.integer { ", integer" } else { "" }
        ),
    )
    .with_meta("function_name", call.qualified_name())
    .with_meta("parameter_name", param_name.to_string())
    .with_meta("parameter_index", arg.position)
    .with_meta("min", constraint.min)
    .with_meta("max", constraint.max);

    d = if is_int {
        d.with_meta("actual_value", value as i64)
    } else {
        d.with_meta("actual_value", value)
    };
    d
}

fn fmt_num(v: f64) -> String {
    if v == v.trunc() && v.is_finite() {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
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
    fn negative_precision_is_flagged() {
        let diags = run(r#"indicator("Test", precision=-1)"#);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::InvalidPrecision);
    }

    #[test]
    fn precision_zero_and_eight_pass() {
        assert!(run(r#"indicator("Test", precision=0)"#).is_empty());
        assert!(run(r#"indicator("Test", precision=8)"#).is_empty());
    }

    #[test]
    fn precision_nine_fails() {
        let diags = run(r#"indicator("Test", precision=9)"#);
        assert_eq!(diags[0].code, DiagnosticCode::InvalidPrecision);
    }

    #[test]
    fn max_bars_back_boundaries() {
        assert!(run(r#"indicator("T", max_bars_back=1)"#).is_empty());
        assert!(run(r#"indicator("T", max_bars_back=5000)"#).is_empty());
        assert_eq!(
            run(r#"indicator("T", max_bars_back=0)"#)[0].code,
            DiagnosticCode::InvalidMaxBarsBack
        );
        assert_eq!(
            run(r#"indicator("T", max_bars_back=5001)"#)[0].code,
            DiagnosticCode::InvalidMaxBarsBack
        );
    }

    #[test]
    fn drawing_object_counts_use_specific_codes() {
        assert_eq!(
            run(r#"indicator("T", max_lines_count=0)"#)[0].code,
            DiagnosticCode::InvalidMaxLinesCount
        );
        assert_eq!(
            run(r#"indicator("T", max_boxes_count=501)"#)[0].code,
            DiagnosticCode::InvalidMaxBoxesCount
        );
        assert!(run(r#"indicator("T", max_labels_count=500)"#).is_empty());
        assert!(run(r#"indicator("T", max_polylines_count=1)"#).is_empty());
    }

    #[test]
    fn non_integer_precision_is_flagged() {
        let diags = run(r#"indicator("T", precision=2.5)"#);
        assert_eq!(diags[0].code, DiagnosticCode::InvalidPrecision);
    }
}
