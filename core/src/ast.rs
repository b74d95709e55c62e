//! Shallow AST node variants.

use serde::{Deserialize, Serialize};

use crate::span::Span;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    pub body: Vec<TopLevel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TopLevel {
    Assignment(Assignment),
    UdtDecl(UdtDecl),
    Call(FunctionCall),
    Unknown { raw_text: String, span: Span },
}

impl TopLevel {
    pub fn span(&self) -> Span {
        match self {
            TopLevel::Assignment(a) => a.span,
            TopLevel::UdtDecl(u) => u.span,
            TopLevel::Call(c) => c.span,
            TopLevel::Unknown { span, .. } => *span,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub namespace: Option<String>,
    pub args: Vec<Arg>,
    pub span: Span,
}

impl FunctionCall {
    /// `namespace.name`, or bare `name` when unqualified — the key the
    /// catalog is indexed by.
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arg {
    pub position: u16,
    pub name: Option<String>,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Literal {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    NaLit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    Literal {
        value: Literal,
        span: Span,
    },
    Identifier {
        name: String,
        span: Span,
    },
    FieldAccess {
        object: Box<Expr>,
        field: String,
        span: Span,
    },
    HistoryAccess {
        target: Box<Expr>,
        index_expr: Box<Expr>,
        span: Span,
    },
    Ternary {
        cond: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
        q_span: Span,
        colon_span: Span,
        span: Span,
    },
    Call(Box<FunctionCall>),
    /// Recovery fallback — validators treat this as untyped.
    Unknown {
        raw_text: String,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal { span, .. }
            | Expr::Identifier { span, .. }
            | Expr::FieldAccess { span, .. }
            | Expr::HistoryAccess { span, .. }
            | Expr::Ternary { span, .. }
            | Expr::Unknown { span, .. } => *span,
            Expr::Call(c) => c.span,
        }
    }

    pub fn as_string_literal(&self) -> Option<&str> {
        match self {
            Expr::Literal {
                value: Literal::String(s),
                ..
            } => Some(s),
            _ => None,
        }
    }

    pub fn as_number_literal(&self) -> Option<(f64, bool)> {
        match self {
            Expr::Literal {
                value: Literal::Int(i),
                ..
            } => Some((*i as f64, true)),
            Expr::Literal {
                value: Literal::Float(f),
                ..
            } => Some((*f, false)),
            _ => None,
        }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Expr::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub target: String,
    /// Explicit type annotation, if the statement was `[var] Type name = ...`
    /// rather than bare `name = ...` — needed to resolve UDT field access.
    pub declared_type: Option<String>,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UdtField {
    pub name: String,
    pub declared_type: String,
    pub is_simple_qualified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UdtDecl {
    pub name: String,
    pub fields: Vec<UdtField>,
    pub span: Span,
}
