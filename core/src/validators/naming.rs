//! Parameter-naming-convention validation.
//!
//! Pine Script v6 parameter names are snake_case. A name already covered by
//! a deprecated-alias rename is left to `deprecated.rs` —
//! flagging both would double-report the same argument.

use crate::catalog::DiagnosticCode;
use crate::diagnostic::Diagnostic;

use super::context::ReviewContext;

pub fn check(ctx: &ReviewContext) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for call in ctx.all_calls() {
        let Some(entry) = ctx.catalog.guarded_function(&call.qualified_name()) else {
            continue;
        };
        for arg in &call.args {
            let Some(name) = &arg.name else { continue };
            if entry.deprecated_param_aliases.contains_key(name.as_str()) {
                continue;
            }
            let Some((convention, suggested)) = classify(name) else {
                continue;
            };
            out.push(
                Diagnostic::new(
                    DiagnosticCode::InvalidParameterNamingConvention,
                    DiagnosticCode::InvalidParameterNamingConvention.default_severity(),
                    arg.span,
                    format!(
                        "'{}' does not follow snake_case convention ({}); did you mean '{}'?",
                        name, convention, suggested
                    ),
                )
                .with_meta("function_name", call.qualified_name())
                .with_meta("parameter_name", name.clone())
                .with_meta("detected_convention", convention)
                .with_meta("suggested_fix", suggested),
            );
        }
    }
    out
}

/// Classifies a non-conforming name, returning `(detected_convention,
/// suggested_fix)`. `None` means the name already conforms.
fn classify(name: &str) -> Option<(&'static str, String)> {
    if name.chars().count() == 1 {
        return Some(("single_char", format!("{}_value", name)));
    }
    if is_snake_case(name) {
        return None;
    }
    if is_all_caps(name) {
        return Some(("ALL_CAPS", name.to_lowercase()));
    }
    let convention = if name.chars().next().map(|c| c.is_ascii_uppercase()).unwrap_or(false) {
        "PascalCase"
    } else {
        "camelCase"
    };
    Some((convention, to_snake_case(name)))
}

fn is_snake_case(name: &str) -> bool {
    !name.chars().any(|c| c.is_ascii_uppercase())
}

fn is_all_caps(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_alphabetic())
        && !name.chars().any(|c| c.is_ascii_lowercase())
}

/// Literal char-by-char conversion — every uppercase letter becomes its own
/// `_x` segment, with no run-collapsing (`HTTPURL` -> `h_t_t_p_u_r_l`).
fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
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
    fn to_snake_case_collapses_runs_literally() {
        assert_eq!(to_snake_case("textHAlign"), "text_h_align");
        assert_eq!(to_snake_case("HTTPURL"), "h_t_t_p_u_r_l");
    }

    #[test]
    fn camel_case_named_arg_is_flagged() {
        let diags = run(r#"plot(close, lineWidth=2)"#);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::InvalidParameterNamingConvention);
        assert_eq!(
            diags[0].metadata.get("suggested_fix"),
            Some(&crate::diagnostic::MetaValue::Str("line_width".into()))
        );
    }

    #[test]
    fn snake_case_named_arg_passes() {
        assert!(run(r#"plot(close, linewidth=2)"#).is_empty());
    }

    #[test]
    fn deprecated_alias_is_not_double_flagged() {
        assert!(run(r#"table.cell(t, 0, 0, textColor=color.red)"#).is_empty());
    }

    #[test]
    fn all_caps_named_arg_is_flagged() {
        let diags = run(r#"plot(close, WIDTH=2)"#);
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].metadata.get("detected_convention"),
            Some(&crate::diagnostic::MetaValue::Str("ALL_CAPS".into()))
        );
        assert_eq!(
            diags[0].metadata.get("suggested_fix"),
            Some(&crate::diagnostic::MetaValue::Str("width".into()))
        );
    }

    #[test]
    fn single_char_named_arg_is_flagged() {
        let diags = run(r#"plot(close, w=2)"#);
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].metadata.get("detected_convention"),
            Some(&crate::diagnostic::MetaValue::Str("single_char".into()))
        );
        assert_eq!(
            diags[0].metadata.get("suggested_fix"),
            Some(&crate::diagnostic::MetaValue::Str("w_value".into()))
        );
    }
}
