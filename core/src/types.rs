//! Type-kind inference and assignability.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ast::{Expr, Literal, UdtDecl};
use crate::catalog::Catalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeKind {
    Int,
    Float,
    Bool,
    String,
    Color,
    SeriesInt,
    SeriesFloat,
    SeriesBool,
    SeriesString,
    Na,
    Unknown,
}

impl TypeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Int => "int",
            TypeKind::Float => "float",
            TypeKind::Bool => "bool",
            TypeKind::String => "string",
            TypeKind::Color => "color",
            TypeKind::SeriesInt => "series_int",
            TypeKind::SeriesFloat => "series_float",
            TypeKind::SeriesBool => "series_bool",
            TypeKind::SeriesString => "series_string",
            TypeKind::Na => "na",
            TypeKind::Unknown => "unknown",
        }
    }

    pub fn is_series(&self) -> bool {
        matches!(
            self,
            TypeKind::SeriesInt | TypeKind::SeriesFloat | TypeKind::SeriesBool | TypeKind::SeriesString
        )
    }

    /// Lift a simple kind to its series form; series kinds are unchanged.
    pub fn to_series(&self) -> TypeKind {
        match self {
            TypeKind::Int => TypeKind::SeriesInt,
            TypeKind::Float => TypeKind::SeriesFloat,
            TypeKind::Bool => TypeKind::SeriesBool,
            TypeKind::String => TypeKind::SeriesString,
            other => *other,
        }
    }

    fn base_name_kind(name: &str) -> TypeKind {
        match name {
            "int" => TypeKind::Int,
            "float" => TypeKind::Float,
            "bool" => TypeKind::Bool,
            "string" => TypeKind::String,
            "color" => TypeKind::Color,
            _ => TypeKind::Unknown,
        }
    }

    /// Is `self` assignable where `expected` is required.
    pub fn assignable_to(&self, expected: TypeKind) -> bool {
        if *self == expected {
            return true;
        }
        if *self == TypeKind::Unknown || expected == TypeKind::Unknown {
            return true;
        }
        if *self == TypeKind::Na {
            return true;
        }
        match (*self, expected) {
            (TypeKind::Int, TypeKind::Float) => true,
            (TypeKind::Int, TypeKind::SeriesInt) => true,
            (TypeKind::Float, TypeKind::SeriesFloat) => true,
            (TypeKind::Int, TypeKind::SeriesFloat) => true,
            (TypeKind::Bool, TypeKind::SeriesBool) => true,
            (TypeKind::String, TypeKind::SeriesString) => true,
            _ => false,
        }
    }
}

/// Well-known Pine builtins with a fixed series kind.
fn builtin_identifier_kind(name: &str) -> Option<TypeKind> {
    match name {
        "close" | "open" | "high" | "low" | "volume" => Some(TypeKind::SeriesFloat),
        "time" => Some(TypeKind::SeriesInt),
        _ => None,
    }
}

/// Per-variable UDT binding, built by scanning top-level assignments whose
/// RHS is `TypeName.new(...)` or whose declared type annotation names a
/// known UDT.
pub type UdtBindings = HashMap<String, String>;

/// Join two branch kinds of a ternary: numeric
/// widening `int ⊑ float`, lifted to series if either side is series.
pub fn join_kinds(a: TypeKind, b: TypeKind) -> TypeKind {
    if a == b {
        return a;
    }
    if a == TypeKind::Unknown || b == TypeKind::Unknown {
        return TypeKind::Unknown;
    }
    if a == TypeKind::Na {
        return b;
    }
    if b == TypeKind::Na {
        return a;
    }

    let series = a.is_series() || b.is_series();
    let base = |k: TypeKind| -> TypeKind {
        match k {
            TypeKind::SeriesInt => TypeKind::Int,
            TypeKind::SeriesFloat => TypeKind::Float,
            TypeKind::SeriesBool => TypeKind::Bool,
            TypeKind::SeriesString => TypeKind::String,
            other => other,
        }
    };
    let (ba, bb) = (base(a), base(b));
    let joined = if ba == bb {
        ba
    } else if matches!((ba, bb), (TypeKind::Int, TypeKind::Float) | (TypeKind::Float, TypeKind::Int)) {
        TypeKind::Float
    } else {
        TypeKind::Unknown
    };

    if series {
        joined.to_series()
    } else {
        joined
    }
}

/// Infer the type kind of an expression. `udts` maps UDT name to its declaration; `bindings` maps a
/// variable name to the UDT it was constructed as, when known.
pub fn infer_kind(
    expr: &Expr,
    catalog: &Catalog,
    udts: &HashMap<String, UdtDecl>,
    bindings: &UdtBindings,
) -> TypeKind {
    match expr {
        Expr::Literal { value, .. } => match value {
            Literal::Int(_) => TypeKind::Int,
            Literal::Float(_) => TypeKind::Float,
            Literal::Bool(_) => TypeKind::Bool,
            Literal::String(_) => TypeKind::String,
            Literal::NaLit => TypeKind::Na,
        },
        Expr::Identifier { name, .. } => {
            builtin_identifier_kind(name).unwrap_or(TypeKind::Unknown)
        }
        Expr::Call(call) => catalog
            .guarded_function(&call.qualified_name())
            .and_then(|e| e.return_kind)
            .unwrap_or(TypeKind::Unknown),
        Expr::FieldAccess { object, field, .. } => {
            if let Some(obj_name) = object.as_identifier() {
                if let Some(udt_name) = bindings.get(obj_name) {
                    if let Some(decl) = udts.get(udt_name) {
                        if let Some(f) = decl.fields.iter().find(|f| f.name == *field) {
                            let base = TypeKind::base_name_kind(&f.declared_type);
                            return if f.is_simple_qualified {
                                base
                            } else {
                                base.to_series()
                            };
                        }
                    }
                }
            }
            TypeKind::Unknown
        }
        Expr::HistoryAccess { target, .. } => {
            let inner = infer_kind(target, catalog, udts, bindings);
            inner.to_series()
        }
        Expr::Ternary {
            then_expr,
            else_expr,
            ..
        } => {
            let a = infer_kind(then_expr, catalog, udts, bindings);
            let b = infer_kind(else_expr, catalog, udts, bindings);
            join_kinds(a, b)
        }
        Expr::Unknown { .. } => TypeKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::UdtField;
    use crate::span::Span;

    fn sp() -> Span {
        Span::point(1, 1, 0)
    }

    #[test]
    fn int_assignable_to_float_and_series_int() {
        assert!(TypeKind::Int.assignable_to(TypeKind::Float));
        assert!(TypeKind::Int.assignable_to(TypeKind::SeriesInt));
        assert!(!TypeKind::Float.assignable_to(TypeKind::Int));
    }

    #[test]
    fn na_assignable_to_everything() {
        assert!(TypeKind::Na.assignable_to(TypeKind::Color));
    }

    #[test]
    fn unknown_is_assignable_both_ways() {
        assert!(TypeKind::Unknown.assignable_to(TypeKind::Int));
        assert!(TypeKind::Int.assignable_to(TypeKind::Unknown));
    }

    #[test]
    fn builtin_close_is_series_float() {
        let catalog_free = HashMap::new();
        let bindings = HashMap::new();
        let expr = Expr::Identifier {
            name: "close".to_string(),
            span: sp(),
        };
        let kind = infer_kind(&expr, &crate::catalog::CATALOG, &catalog_free, &bindings);
        assert_eq!(kind, TypeKind::SeriesFloat);
    }

    #[test]
    fn unqualified_udt_field_access_lifts_to_series_when_not_simple() {
        let mut udts = HashMap::new();
        udts.insert(
            "MarketSettings".to_string(),
            UdtDecl {
                name: "MarketSettings".to_string(),
                fields: vec![UdtField {
                    name: "adaptiveFast".to_string(),
                    declared_type: "float".to_string(),
                    is_simple_qualified: false,
                }],
                span: sp(),
            },
        );
        let mut bindings = HashMap::new();
        bindings.insert("market".to_string(), "MarketSettings".to_string());

        let expr = Expr::FieldAccess {
            object: Box::new(Expr::Identifier {
                name: "market".to_string(),
                span: sp(),
            }),
            field: "adaptiveFast".to_string(),
            span: sp(),
        };
        let kind = infer_kind(&expr, &crate::catalog::CATALOG, &udts, &bindings);
        assert_eq!(kind, TypeKind::SeriesFloat);
    }

    #[test]
    fn ternary_widens_int_and_float() {
        assert_eq!(join_kinds(TypeKind::Int, TypeKind::Float), TypeKind::Float);
        assert_eq!(
            join_kinds(TypeKind::SeriesInt, TypeKind::Float),
            TypeKind::SeriesFloat
        );
    }
}
