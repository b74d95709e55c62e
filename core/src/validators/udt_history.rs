//! UDT history-access syntax validation.
//!
//! `x.f[n]` — indexing the *result* of a field access — is illegal; history
//! must be taken on the object first: `(x[n]).f`. Structurally the parser
//! turns the illegal form into `HistoryAccess { target: FieldAccess { .. } }`
//! and the legal form into `FieldAccess { object: HistoryAccess { .. } } }`,
//! so the two are distinguished without re-parsing.

use crate::ast::Expr;
use crate::catalog::DiagnosticCode;
use crate::diagnostic::Diagnostic;

use super::context::ReviewContext;

pub fn check(ctx: &ReviewContext) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for expr in ctx.all_exprs() {
        let Expr::HistoryAccess { target, index_expr, .. } = expr else {
            continue;
        };
        let Expr::FieldAccess { object, field, .. } = target.as_ref() else {
            continue;
        };
        let Some(root) = root_identifier(object) else {
            continue;
        };
        let Some(udt_name) = ctx.bindings.get(root) else {
            continue;
        };
        if !ctx.udts.contains_key(udt_name) {
            continue;
        }
        let index_text = index_literal_text(index_expr);
        out.push(
            Diagnostic::new(
                DiagnosticCode::UdtHistorySyntaxError,
                DiagnosticCode::UdtHistorySyntaxError.default_severity(),
                expr.span(),
                format!(
                    "'{}.{}[{}]' is illegal; take history on the object first, e.g. '({}[{}]).{}'",
                    root, field, index_text, root, index_text, field
                ),
            )
            .with_meta("variable_name", root.to_string())
            .with_meta("field_name", field.clone())
            .with_meta("suggested_fix", format!("({}[{}]).{}", root, index_text, field)),
        );
    }
    out
}

/// Renders the index expression back to source text when it's a simple
/// integer literal, so the suggested fix reads `(s[1]).v` rather than a
/// generic `(s[n]).v` placeholder.
fn index_literal_text(index_expr: &Expr) -> String {
    match index_expr.as_number_literal() {
        Some((v, true)) => format!("{}", v as i64),
        Some((v, false)) => format!("{}", v),
        None => "n".to_string(),
    }
}

fn root_identifier(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Identifier { name, .. } => Some(name),
        Expr::FieldAccess { object, .. } => root_identifier(object),
        _ => None,
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
    fn field_then_history_on_udt_variable_is_illegal() {
        let src = "type S\n    float v\nvar s = S.new()\nx = s.v[1]\n";
        let diags = run(src);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::UdtHistorySyntaxError);
        assert_eq!(
            diags[0].metadata.get("suggested_fix"),
            Some(&crate::diagnostic::MetaValue::Str("(s[1]).v".into()))
        );
    }

    #[test]
    fn history_then_field_is_legal() {
        let src = "type S\n    float v\nvar s = S.new()\nx = (s[1]).v\n";
        assert!(run(src).is_empty());
    }

    #[test]
    fn history_access_on_plain_identifier_is_unaffected() {
        assert!(run("x = close[1]").is_empty());
    }
}
