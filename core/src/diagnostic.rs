//! Diagnostics and severities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::DiagnosticCode;
use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Suggestion,
}

/// A scalar metadata value. Diagnostics carry a small bag of these keyed by
/// name (`function_name`, `parameter_name`, `actual_value`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<&str> for MetaValue {
    fn from(v: &str) -> Self {
        MetaValue::Str(v.to_string())
    }
}
impl From<String> for MetaValue {
    fn from(v: String) -> Self {
        MetaValue::Str(v)
    }
}
impl From<i64> for MetaValue {
    fn from(v: i64) -> Self {
        MetaValue::Int(v)
    }
}
impl From<u16> for MetaValue {
    fn from(v: u16) -> Self {
        MetaValue::Int(v as i64)
    }
}
impl From<usize> for MetaValue {
    fn from(v: usize) -> Self {
        MetaValue::Int(v as i64)
    }
}
impl From<f64> for MetaValue {
    fn from(v: f64) -> Self {
        MetaValue::Float(v)
    }
}

/// A single emitted finding. `line`/`column` are denormalized from `span`
/// because they are what the wire format and the ordering
/// invariant key off of directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub line: u32,
    pub column: u32,
    pub message: String,
    pub category: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub metadata: BTreeMap<String, MetaValue>,
    #[serde(skip)]
    pub span: Span,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, severity: Severity, span: Span, message: impl Into<String>) -> Self {
        Self {
            category: code.category().to_string(),
            code,
            severity,
            line: span.line,
            column: span.column,
            message: message.into(),
            metadata: BTreeMap::new(),
            span,
        }
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// Internal, process-local marker for a validator that exceeded its
    /// soft time budget. Never surfaced to
    /// the dispatcher — the review engine strips these before encoding.
    pub fn validator_timeout(span: Span, validator: &str) -> Self {
        Diagnostic::new(
            DiagnosticCode::ValidatorTimeout,
            Severity::Suggestion,
            span,
            format!("validator '{}' exceeded its soft time budget", validator),
        )
    }

    /// Lexical errors (unterminated string, illegal byte) are surfaced as
    /// diagnostics, never as a hard failure.
    pub fn lexical(message: impl Into<String>, span: Span) -> Self {
        Diagnostic::new(DiagnosticCode::LexicalError, Severity::Error, span, message)
    }

    pub fn parse(message: impl Into<String>, span: Span) -> Self {
        Diagnostic::new(DiagnosticCode::ParseError, Severity::Error, span, message)
    }

    /// Sort key used to order diagnostics and to deduplicate them.
    pub fn sort_key(&self) -> (u32, u32, &'static str) {
        (self.line, self.column, self.code.as_str())
    }

    pub fn dedup_key(&self) -> (&'static str, u32, u32, Option<String>) {
        let param = self
            .metadata
            .get("parameter_name")
            .and_then(|v| match v {
                MetaValue::Str(s) => Some(s.clone()),
                _ => None,
            });
        (self.code.as_str(), self.line, self.column, param)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_orders_by_line_then_column_then_code() {
        let a = Diagnostic::new(
            DiagnosticCode::InvalidPrecision,
            Severity::Error,
            Span::point(1, 5, 0),
            "x",
        );
        let b = Diagnostic::new(
            DiagnosticCode::InvalidPrecision,
            Severity::Error,
            Span::point(1, 2, 0),
            "x",
        );
        assert!(b.sort_key() < a.sort_key());
    }
}
