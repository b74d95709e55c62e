//! Type-kind inference & mismatch.

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
        if entry.expected_kinds.is_empty() {
            continue;
        }
        for arg in &call.args {
            let Some(&expected) = entry.expected_kinds.get(&arg.position) else {
                continue;
            };
            let actual = infer_kind(&arg.value, ctx.catalog, &ctx.udts, &ctx.bindings);
            if actual.assignable_to(expected) {
                continue;
            }
            let param_name = resolve_param_name(entry, arg).unwrap_or_else(|| arg.position.to_string());
            out.push(
                Diagnostic::new(
                    DiagnosticCode::InputTypeMismatch,
                    DiagnosticCode::InputTypeMismatch.default_severity(),
                    arg.value.span(),
                    format!(
                        "'{}' of '{}' expects {} but got {}",
                        param_name,
                        call.qualified_name(),
                        expected.as_str(),
                        actual.as_str()
                    ),
                )
                .with_meta("function_name", call.qualified_name())
                .with_meta("parameter_name", param_name)
                .with_meta("parameter_index", arg.position)
                .with_meta("expected", expected.as_str())
                .with_meta("actual", actual.as_str()),
            );
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
    fn string_where_int_expected_is_flagged() {
        let diags = run(r#"input.int("not a number", "Length")"#);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::InputTypeMismatch);
    }

    #[test]
    fn int_where_float_expected_is_assignable() {
        assert!(run(r#"input.float(5, "Mult")"#).is_empty());
    }

    #[test]
    fn na_is_always_assignable() {
        assert!(run(r#"input.bool(na, "Flag")"#).is_empty());
    }

    #[test]
    fn unguarded_position_is_not_checked() {
        // position 1 (`title`) has no expected_kinds entry for input.int.
        assert!(run(r#"input.int(5, close)"#).is_empty());
    }
}
