//! Wire DTOs for the two tools' JSON response bodies.
//!
//! `pinelint_core::Diagnostic` is the internal shape validators build;
//! `ViolationDto` is the stable external shape the spec's wire contract
//! names (`rule` rather than `code`, a flattened `suggested_fix`). Keeping
//! the two separate lets the core crate evolve its internal representation
//! without breaking the documented response schema.

use serde::{Deserialize, Serialize};

use pinelint_core::diagnostic::{Diagnostic, MetaValue};
use pinelint_core::review::{DirectorySummary, ReviewResult, Summary};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationDto {
    pub line: u32,
    pub column: u32,
    pub rule: &'static str,
    pub severity: &'static str,
    pub message: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<MetaValue>,
    #[serde(skip_serializing_if = "std::collections::BTreeMap::is_empty", default)]
    pub metadata: std::collections::BTreeMap<String, MetaValue>,
}

impl From<&Diagnostic> for ViolationDto {
    fn from(d: &Diagnostic) -> Self {
        let mut metadata = d.metadata.clone();
        let suggested_fix = metadata
            .remove("suggested_fix")
            .or_else(|| metadata.get("suggested_parameter").cloned());
        ViolationDto {
            line: d.line,
            column: d.column,
            rule: d.code.as_str(),
            severity: severity_str(d.severity),
            message: d.message.clone(),
            category: d.category.clone(),
            suggested_fix,
            metadata,
        }
    }
}

fn severity_str(s: pinelint_core::diagnostic::Severity) -> &'static str {
    use pinelint_core::diagnostic::Severity;
    match s {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Suggestion => "suggestion",
    }
}

/// Non-stream `code_review` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeReviewResponse {
    pub summary: Summary,
    pub violations: Vec<ViolationDto>,
    pub reviewed_lines: u32,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_pragma: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "is_false", default)]
    pub incomplete: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl CodeReviewResponse {
    pub fn from_result(result: &ReviewResult, file_path: Option<String>) -> Self {
        CodeReviewResponse {
            summary: result.summary.clone(),
            violations: result.violations.iter().map(ViolationDto::from).collect(),
            reviewed_lines: result.reviewed_lines,
            version: result.version.clone(),
            version_pragma: result.version_pragma.clone(),
            file_path,
            incomplete: result.incomplete,
        }
    }
}

/// One stream chunk, re-encoded with `ViolationDto`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunkDto {
    pub chunk_index: i64,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub violations: Vec<ViolationDto>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub summary: Option<Summary>,
    #[serde(skip_serializing_if = "is_false", default)]
    pub done: bool,
}

/// Per-file entry inside a directory review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryFileEntry {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CodeReviewResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryReviewResponse {
    pub directory_path: String,
    pub summary: DirectorySummary,
    pub files: Vec<DirectoryFileEntry>,
}

/// Reference-lookup response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceResult {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub examples: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceLookupResponse {
    pub query: String,
    pub results: Vec<ReferenceResult>,
    pub total_found: usize,
}

/// The uniform error body every failed tool call returns inside its
/// envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolErrorBody {
    pub error: ToolErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolErrorDetail {
    pub kind: &'static str,
    pub message: String,
}
