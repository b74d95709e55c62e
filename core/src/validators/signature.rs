//! Call-signature validation: missing required arguments,
//! unknown named parameters with a Levenshtein-suggested fix.

use crate::catalog::DiagnosticCode;
use crate::diagnostic::Diagnostic;

use super::context::ReviewContext;

pub fn check(ctx: &ReviewContext) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for call in ctx.all_calls() {
        let Some(entry) = ctx.catalog.guarded_function(&call.qualified_name()) else {
            continue;
        };

        let mut named_args = Vec::new();
        let mut positional_count = 0u16;
        for arg in &call.args {
            match &arg.name {
                Some(name) => {
                    named_args.push(name.as_str());
                    if entry.position_of(name).is_some() || entry.deprecated_param_aliases.contains_key(name.as_str()) {
                        continue;
                    }
                    out.push(unknown_parameter(entry, call, arg, name));
                }
                None => positional_count = positional_count.max(arg.position + 1),
            }
        }

        for &required in &entry.required_names {
            let position = entry.position_of(required);
            let satisfied = named_args.contains(&required)
                || position.map(|p| p < positional_count).unwrap_or(false);
            if !satisfied {
                out.push(
                    Diagnostic::new(
                        DiagnosticCode::FunctionSignatureValidation,
                        DiagnosticCode::FunctionSignatureValidation.default_severity(),
                        call.span,
                        format!(
                            "'{}' is missing required argument '{}'",
                            call.qualified_name(),
                            required
                        ),
                    )
                    .with_meta("function_name", call.qualified_name())
                    .with_meta("parameter_name", required.to_string()),
                );
            }
        }
    }
    out
}

fn unknown_parameter(
    entry: &crate::catalog::FunctionEntry,
    call: &crate::ast::FunctionCall,
    arg: &crate::ast::Arg,
    name: &str,
) -> Diagnostic {
    let mut candidates = entry.all_named_parameters();
    for &alias in entry.deprecated_param_aliases.keys() {
        if !candidates.contains(&alias) {
            candidates.push(alias);
        }
    }
    let suggestion = best_suggestion(name, &candidates);

    let mut d = Diagnostic::new(
        DiagnosticCode::UnknownFunctionParameter,
        DiagnosticCode::UnknownFunctionParameter.default_severity(),
        arg.span,
        match &suggestion {
            Some(s) => format!(
                "'{}' is not a known parameter of '{}'; did you mean '{}'?",
                name,
                call.qualified_name(),
                s
            ),
            None => format!("'{}' is not a known parameter of '{}'", name, call.qualified_name()),
        },
    )
    .with_meta("function_name", call.qualified_name())
    .with_meta("parameter_name", name.to_string());

    if let Some(s) = suggestion {
        d = d.with_meta("suggested_parameter", s);
    }
    d
}

/// Nearest known parameter name within edit distance 2, ties broken
/// alphabetically.
fn best_suggestion(name: &str, candidates: &[&'static str]) -> Option<&'static str> {
    candidates
        .iter()
        .map(|&c| (strsim::levenshtein(name, c), c))
        .filter(|&(dist, _)| dist <= 2)
        .min_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)))
        .map(|(_, c)| c)
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
    fn missing_required_title_is_flagged() {
        let diags = run(r#"indicator(overlay=true)"#);
        assert!(diags
            .iter()
            .any(|d| d.code == DiagnosticCode::FunctionSignatureValidation));
    }

    #[test]
    fn complete_call_passes() {
        assert!(run(r#"indicator("My Indicator")"#).is_empty());
    }

    #[test]
    fn unknown_named_parameter_suggests_nearest() {
        let diags = run(r#"table.cell(t, 0, 0, text="x", textColour=color.red)"#);
        let d = diags
            .iter()
            .find(|d| d.code == DiagnosticCode::UnknownFunctionParameter)
            .expect("expected unknown parameter diagnostic");
        assert_eq!(
            d.metadata.get("suggested_parameter"),
            Some(&crate::diagnostic::MetaValue::Str("textColor".into()))
        );
    }

    #[test]
    fn unknown_parameter_with_no_close_match_has_no_suggestion() {
        let diags = run(r#"table.cell(t, 0, 0, zzzzzzzzzzz=1)"#);
        let d = diags
            .iter()
            .find(|d| d.code == DiagnosticCode::UnknownFunctionParameter)
            .expect("expected unknown parameter diagnostic");
        assert!(!d.metadata.contains_key("suggested_parameter"));
    }
}
