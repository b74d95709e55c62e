//! Shared per-review state handed to every validator.
//!
//! Built once per `review()` call and passed by shared reference — validators
//! run independently over the same `ReviewContext` with no synchronization.

use std::collections::HashMap;
use std::time::Duration;

use crate::ast::{Arg, Expr, FunctionCall, Script, TopLevel, UdtDecl};
use crate::catalog::{Catalog, FunctionEntry};
use crate::token::Token;
use crate::types::UdtBindings;

pub struct ReviewContext<'a> {
    pub script: &'a Script,
    pub tokens: &'a [Token],
    pub catalog: &'a Catalog,
    pub udts: HashMap<String, UdtDecl>,
    pub bindings: UdtBindings,
    /// Soft per-validator time budget.
    pub budget: Duration,
}

impl<'a> ReviewContext<'a> {
    pub fn new(script: &'a Script, tokens: &'a [Token], catalog: &'a Catalog, budget: Duration) -> Self {
        let udts = collect_udts(script);
        let bindings = collect_bindings(script, &udts);
        ReviewContext {
            script,
            tokens,
            catalog,
            udts,
            bindings,
            budget,
        }
    }

    /// Every `FunctionCall` reachable from the script, top-level and nested
    /// inside argument expressions to unlimited depth.
    pub fn all_calls(&self) -> Vec<&FunctionCall> {
        let mut out = Vec::new();
        for item in &self.script.body {
            match item {
                TopLevel::Call(c) => collect_calls_from_call(c, &mut out),
                TopLevel::Assignment(a) => collect_calls_from_expr(&a.value, &mut out),
                TopLevel::UdtDecl(_) | TopLevel::Unknown { .. } => {}
            }
        }
        out
    }

    /// Every expression node reachable from the script, including nested
    /// sub-expressions — used by validators that inspect expression shape
    /// directly rather than call arguments (UDT history syntax, ternary line
    /// continuation).
    pub fn all_exprs(&self) -> Vec<&Expr> {
        let mut out = Vec::new();
        for item in &self.script.body {
            match item {
                TopLevel::Call(c) => {
                    for arg in &c.args {
                        collect_exprs_from_expr(&arg.value, &mut out);
                    }
                }
                TopLevel::Assignment(a) => collect_exprs_from_expr(&a.value, &mut out),
                TopLevel::UdtDecl(_) | TopLevel::Unknown { .. } => {}
            }
        }
        out
    }
}

fn collect_udts(script: &Script) -> HashMap<String, UdtDecl> {
    let mut out = HashMap::new();
    for item in &script.body {
        if let TopLevel::UdtDecl(decl) = item {
            out.insert(decl.name.clone(), decl.clone());
        }
    }
    out
}

/// Resolve variable -> UDT-name bindings from top-level assignments whose
/// RHS is `TypeName.new(...)` or whose declared type annotation names a
/// known UDT.
fn collect_bindings(script: &Script, udts: &HashMap<String, UdtDecl>) -> UdtBindings {
    let mut out = HashMap::new();
    for item in &script.body {
        if let TopLevel::Assignment(a) = item {
            if let Some(declared) = &a.declared_type {
                if udts.contains_key(declared) {
                    out.insert(a.target.clone(), declared.clone());
                    continue;
                }
            }
            if let Expr::Call(call) = &a.value {
                if call.name == "new" {
                    if let Some(ns) = &call.namespace {
                        if udts.contains_key(ns) {
                            out.insert(a.target.clone(), ns.clone());
                        }
                    }
                }
            }
        }
    }
    out
}

fn collect_calls_from_call<'a>(call: &'a FunctionCall, out: &mut Vec<&'a FunctionCall>) {
    out.push(call);
    for arg in &call.args {
        collect_calls_from_expr(&arg.value, out);
    }
}

fn collect_calls_from_expr<'a>(expr: &'a Expr, out: &mut Vec<&'a FunctionCall>) {
    match expr {
        Expr::Call(c) => collect_calls_from_call(c, out),
        Expr::FieldAccess { object, .. } => collect_calls_from_expr(object, out),
        Expr::HistoryAccess { target, index_expr, .. } => {
            collect_calls_from_expr(target, out);
            collect_calls_from_expr(index_expr, out);
        }
        Expr::Ternary { cond, then_expr, else_expr, .. } => {
            collect_calls_from_expr(cond, out);
            collect_calls_from_expr(then_expr, out);
            collect_calls_from_expr(else_expr, out);
        }
        Expr::Literal { .. } | Expr::Identifier { .. } | Expr::Unknown { .. } => {}
    }
}

fn collect_exprs_from_expr<'a>(expr: &'a Expr, out: &mut Vec<&'a Expr>) {
    out.push(expr);
    match expr {
        Expr::Call(c) => {
            for arg in &c.args {
                collect_exprs_from_expr(&arg.value, out);
            }
        }
        Expr::FieldAccess { object, .. } => collect_exprs_from_expr(object, out),
        Expr::HistoryAccess { target, index_expr, .. } => {
            collect_exprs_from_expr(target, out);
            collect_exprs_from_expr(index_expr, out);
        }
        Expr::Ternary { cond, then_expr, else_expr, .. } => {
            collect_exprs_from_expr(cond, out);
            collect_exprs_from_expr(then_expr, out);
            collect_exprs_from_expr(else_expr, out);
        }
        Expr::Literal { .. } | Expr::Identifier { .. } | Expr::Unknown { .. } => {}
    }
}

/// The effective parameter name an argument binds to: its explicit name, or
/// the catalog's positional name at its index.
pub fn resolve_param_name(entry: &FunctionEntry, arg: &Arg) -> Option<String> {
    if let Some(name) = &arg.name {
        return Some(name.clone());
    }
    entry
        .positional_names
        .get(arg.position as usize)
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn ctx_for(src: &str) -> (Script, Vec<Token>) {
        let tokens = lex(src).tokens;
        let script = parse(&tokens).script;
        (script, tokens)
    }

    #[test]
    fn binds_declared_type_annotation_to_udt() {
        let (script, tokens) = ctx_for("type S\n    float v\nvar S s = S.new()\n");
        let ctx = ReviewContext::new(&script, &tokens, &crate::catalog::CATALOG, Duration::from_millis(50));
        assert_eq!(ctx.bindings.get("s"), Some(&"S".to_string()));
    }

    #[test]
    fn binds_bare_new_call_without_annotation() {
        let (script, tokens) = ctx_for(
            "type MarketSettings\n    float adaptiveFast\nvar market = MarketSettings.new()\n",
        );
        let ctx = ReviewContext::new(&script, &tokens, &crate::catalog::CATALOG, Duration::from_millis(50));
        assert_eq!(ctx.bindings.get("market"), Some(&"MarketSettings".to_string()));
    }

    #[test]
    fn all_calls_includes_nested_calls() {
        let (script, tokens) = ctx_for("plot(ta.sma(close, 14))");
        let ctx = ReviewContext::new(&script, &tokens, &crate::catalog::CATALOG, Duration::from_millis(50));
        let names: Vec<_> = ctx.all_calls().iter().map(|c| c.qualified_name()).collect();
        assert!(names.contains(&"plot".to_string()));
        assert!(names.contains(&"ta.sma".to_string()));
    }
}
