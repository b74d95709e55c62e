//! Deprecated-alias validation.

use crate::catalog::DiagnosticCode;
use crate::diagnostic::Diagnostic;

use super::context::ReviewContext;

pub fn check(ctx: &ReviewContext) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for call in ctx.all_calls() {
        let Some(entry) = ctx.catalog.guarded_function(&call.qualified_name()) else {
            continue;
        };
        if entry.deprecated_param_aliases.is_empty() {
            continue;
        }
        for arg in &call.args {
            let Some(name) = &arg.name else { continue };
            let Some(&canonical) = entry.deprecated_param_aliases.get(name.as_str()) else {
                continue;
            };
            out.push(
                Diagnostic::new(
                    DiagnosticCode::DeprecatedParameterName,
                    DiagnosticCode::DeprecatedParameterName.default_severity(),
                    arg.span,
                    format!(
                        "'{}' is deprecated in '{}'; use '{}' instead",
                        name,
                        call.qualified_name(),
                        canonical
                    ),
                )
                .with_meta("function_name", call.qualified_name())
                .with_meta("parameter_name", name.clone())
                .with_meta("suggested_parameter", canonical),
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
    fn textcolor_alias_is_flagged() {
        let diags = run(r#"table.cell(t, 0, 0, text="x", textColor=color.red)"#);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::DeprecatedParameterName);
        assert_eq!(
            diags[0].metadata.get("suggested_parameter"),
            Some(&crate::diagnostic::MetaValue::Str("text_color".into()))
        );
    }

    #[test]
    fn canonical_name_passes() {
        assert!(run(r#"table.cell(t, 0, 0, text="x", text_color=color.red)"#).is_empty());
    }

    #[test]
    fn bgcolor_alias_is_flagged() {
        let diags = run(r#"table.cell(t, 0, 0, bgColor=color.blue)"#);
        assert_eq!(diags.len(), 1);
    }
}
