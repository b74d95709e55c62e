//! Length validation.

use crate::catalog::DiagnosticCode;
use crate::diagnostic::Diagnostic;

use super::context::{resolve_param_name, ReviewContext};

pub fn check(ctx: &ReviewContext) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for call in ctx.all_calls() {
        let Some(entry) = ctx.catalog.guarded_function(&call.qualified_name()) else {
            continue;
        };
        if entry.length_constraints.is_empty() {
            continue;
        }
        for arg in &call.args {
            let Some(param_name) = resolve_param_name(entry, arg) else {
                continue;
            };
            let Some(constraint) = entry.length_constraints.get(param_name.as_str()) else {
                continue;
            };
            let Some(value) = arg.value.as_string_literal() else {
                continue;
            };
            if value.len() > constraint.max_length {
                out.push(
                    Diagnostic::new(
                        DiagnosticCode::ShortTitleTooLong,
                        DiagnosticCode::ShortTitleTooLong.default_severity(),
                        arg.value.span(),
                        format!(
                            "'{}' is {} characters, exceeding the {}-character limit for '{}'",
                            value,
                            value.len(),
                            constraint.max_length,
                            param_name
                        ),
                    )
                    .with_meta("function_name", call.qualified_name())
                    .with_meta("parameter_name", param_name)
                    .with_meta("parameter_index", arg.position)
                    .with_meta("actual_value", value.to_string())
                    .with_meta("length", value.len())
                    .with_meta("max_length", constraint.max_length),
                );
            }
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
    fn flags_shorttitle_over_ten_chars() {
        let diags = run(r#"strategy("EMA Ribbon MACD v1.1", "RIBBON_v1.1", overlay = false)"#);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::ShortTitleTooLong);
        assert_eq!(
            diags[0].metadata.get("parameter_name").unwrap(),
            &crate::diagnostic::MetaValue::Str("shorttitle".into())
        );
    }

    #[test]
    fn ten_char_shorttitle_passes() {
        let diags = run(r#"strategy("title", "0123456789", overlay=false)"#);
        assert!(diags.is_empty());
    }
}
