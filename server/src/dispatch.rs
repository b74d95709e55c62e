//! Tool routing: input validation, delegation to
//! `pinelint_core::review` / `pinelint_core::reference`, and delegation to
//! `pinelint_tools::scanner` for file/directory reads.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use pinelint_core::catalog::DiagnosticCode;
use pinelint_core::reference::ReferenceIndex;
use pinelint_core::review::{self, OutputFormat, ReviewOpts, SeverityFilter};

use pinelint_tools::scanner::{self, ScanOptions};

use crate::error::{DispatchError, DispatchResult};
use crate::wire::{
    CodeReviewResponse, DirectoryFileEntry, DirectoryReviewResponse, ReferenceLookupResponse,
    ReferenceResult, StreamChunkDto,
};

/// `reference_lookup` tool arguments.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceLookupParams {
    pub query: String,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "v6".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Code,
    File,
    Directory,
}

/// `code_review` tool arguments. Every field beyond
/// `source_type` is optional and validated against `source_type` by
/// [`Dispatcher::code_review`].
#[derive(Debug, Clone, Deserialize)]
pub struct CodeReviewParams {
    pub source_type: SourceType,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub directory_path: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub severity_filter: Option<String>,
    #[serde(default)]
    pub recursive: Option<bool>,
    #[serde(default)]
    pub file_extensions: Option<Vec<String>>,
    #[serde(default)]
    pub chunk_size: Option<u32>,
    #[serde(default)]
    pub rule_filter: Option<Vec<String>>,
}

/// The result of a successful tool call, already shaped for the
/// `content: [{type: "text", text: <json>}]` envelope.
pub enum ToolOutcome {
    /// A single JSON value (non-stream `code_review`, `reference_lookup`,
    /// directory review).
    Value(serde_json::Value),
    /// A `stream`-format `code_review`: one JSON value per chunk, in order.
    Stream(Vec<serde_json::Value>),
}

/// Runtime configuration the binary resolves from `PinelintConfig`.
#[derive(Debug, Clone)]
pub struct DispatcherLimits {
    pub scan_root: PathBuf,
    pub default_severity_filter: SeverityFilter,
    pub default_chunk_size: u32,
    pub request_timeout: Duration,
    pub validator_timeout: Duration,
    pub max_request_bytes: u64,
}

impl Default for DispatcherLimits {
    fn default() -> Self {
        DispatcherLimits {
            scan_root: PathBuf::from("."),
            default_severity_filter: SeverityFilter::All,
            default_chunk_size: 20,
            request_timeout: review::DEFAULT_REQUEST_BUDGET,
            validator_timeout: review::DEFAULT_VALIDATOR_BUDGET,
            max_request_bytes: 16 * 1024 * 1024,
        }
    }
}

pub struct Dispatcher {
    reference_index: ReferenceIndex,
    limits: DispatcherLimits,
}

impl Dispatcher {
    pub fn new(reference_index: ReferenceIndex, limits: DispatcherLimits) -> Self {
        Dispatcher {
            reference_index,
            limits,
        }
    }

    /// Routes a tool call by name. Mirrors the
    /// teacher's `McpProtocolHandler::handle_request` switch over `method`.
    pub fn call_tool(&self, name: &str, arguments: serde_json::Value) -> DispatchResult<ToolOutcome> {
        match name {
            "reference_lookup" => {
                let params: ReferenceLookupParams = serde_json::from_value(arguments)
                    .map_err(|e| DispatchError::InvalidRequest(format!("invalid reference_lookup arguments: {e}")))?;
                self.reference_lookup(params).map(ToolOutcome::Value)
            }
            "code_review" => {
                let params: CodeReviewParams = serde_json::from_value(arguments)
                    .map_err(|e| DispatchError::InvalidRequest(format!("invalid code_review arguments: {e}")))?;
                self.code_review(params)
            }
            other => Err(DispatchError::InvalidRequest(format!("unknown tool '{}'", other))),
        }
    }

    pub fn reference_lookup(&self, params: ReferenceLookupParams) -> DispatchResult<serde_json::Value> {
        if params.query.trim().is_empty() {
            return Err(DispatchError::InvalidRequest("query must not be empty".to_string()));
        }
        let entries = self.reference_index.lookup(&params.query, &params.version);
        let results: Vec<ReferenceResult> = entries
            .iter()
            .map(|e| ReferenceResult {
                title: e.title.clone(),
                content: e.content.clone(),
                examples: e.examples.clone(),
            })
            .collect();
        let response = ReferenceLookupResponse {
            query: params.query,
            total_found: results.len(),
            results,
        };
        Ok(serde_json::to_value(response).expect("ReferenceLookupResponse always serializes"))
    }

    pub fn code_review(&self, params: CodeReviewParams) -> DispatchResult<ToolOutcome> {
        validate_source_type(&params)?;

        let opts = self.review_opts(&params)?;
        let format = opts.format;

        match params.source_type {
            SourceType::Code => {
                let source = params.code.expect("validated above");
                self.check_request_size(source.len() as u64)?;
                let result = review::review(&source, &opts);
                let response = CodeReviewResponse::from_result(&result, None);
                self.encode(&result, response, format, opts.chunk_size)
            }
            SourceType::File => {
                let file_path = params.file_path.expect("validated above");
                let path = self.resolve_path(&file_path)?;
                let source = std::fs::read_to_string(&path)
                    .map_err(|e| DispatchError::NotFound(format!("cannot read '{}': {}", path.display(), e)))?;
                self.check_request_size(source.len() as u64)?;
                let result = review::review(&source, &opts);
                let response = CodeReviewResponse::from_result(&result, Some(file_path));
                self.encode(&result, response, format, opts.chunk_size)
            }
            SourceType::Directory => {
                let directory_path = params.directory_path.expect("validated above");
                let root = self.resolve_path(&directory_path)?;
                let scan_opts = ScanOptions {
                    recursive: params.recursive.unwrap_or(true),
                    extensions: params
                        .file_extensions
                        .clone()
                        .unwrap_or_else(|| vec!["pine".to_string()]),
                    max_file_bytes: scanner::DEFAULT_MAX_FILE_BYTES,
                };
                let items = scanner::scan(&root, &scan_opts)
                    .map_err(|e| DispatchError::NotFound(format!("cannot scan '{}': {}", root.display(), e)))?;

                let mut files = Vec::with_capacity(items.len());
                let mut results = BTreeMap::new();
                for item in &items {
                    let display_path = item.path.display().to_string();
                    let result = review::review(&item.contents, &opts);
                    let response = CodeReviewResponse::from_result(&result, Some(display_path.clone()));
                    files.push(DirectoryFileEntry {
                        path: display_path.clone(),
                        result: Some(response),
                        error: None,
                    });
                    results.insert(display_path, result);
                }
                let summary = review::aggregate_directory_summary(&results);
                let response = DirectoryReviewResponse {
                    directory_path,
                    summary,
                    files,
                };
                Ok(ToolOutcome::Value(
                    serde_json::to_value(response).expect("DirectoryReviewResponse always serializes"),
                ))
            }
        }
    }

    fn encode(
        &self,
        result: &pinelint_core::review::ReviewResult,
        response: CodeReviewResponse,
        format: OutputFormat,
        chunk_size: u32,
    ) -> DispatchResult<ToolOutcome> {
        match format {
            OutputFormat::Stream => {
                let chunks = review::into_stream_chunks(result, chunk_size);
                let values: Vec<serde_json::Value> = chunks
                    .into_iter()
                    .map(|c| {
                        let dto = StreamChunkDto {
                            chunk_index: c.chunk_index,
                            violations: c.violations.iter().map(crate::wire::ViolationDto::from).collect(),
                            summary: c.summary,
                            done: c.done,
                        };
                        serde_json::to_value(dto).expect("StreamChunkDto always serializes")
                    })
                    .collect();
                Ok(ToolOutcome::Stream(values))
            }
            // Markdown rendering is an encoding choice over the same
            // response body;
            // the dispatcher still returns JSON with a `markdown` field
            // alongside the structured body so JSON-only clients keep
            // working.
            OutputFormat::Markdown => {
                let markdown = render_markdown(&response);
                let mut value = serde_json::to_value(&response).expect("CodeReviewResponse always serializes");
                if let serde_json::Value::Object(ref mut map) = value {
                    map.insert("markdown".to_string(), serde_json::Value::String(markdown));
                }
                Ok(ToolOutcome::Value(value))
            }
            OutputFormat::Json => Ok(ToolOutcome::Value(
                serde_json::to_value(&response).expect("CodeReviewResponse always serializes"),
            )),
        }
    }

    fn review_opts(&self, params: &CodeReviewParams) -> DispatchResult<ReviewOpts> {
        let severity_filter = match &params.severity_filter {
            None => self.limits.default_severity_filter,
            Some(s) => parse_severity_filter(s)?,
        };
        let format = match &params.format {
            None => OutputFormat::Json,
            Some(s) => parse_format(s)?,
        };
        let rule_filter = match &params.rule_filter {
            None => Vec::new(),
            Some(codes) => codes
                .iter()
                .map(|c| parse_rule_code(c))
                .collect::<DispatchResult<Vec<_>>>()?,
        };
        Ok(ReviewOpts {
            severity_filter,
            rule_filter,
            format,
            chunk_size: params.chunk_size.unwrap_or(self.limits.default_chunk_size),
            validator_budget: self.limits.validator_timeout,
            request_budget: self.limits.request_timeout,
        })
    }

    fn check_request_size(&self, bytes: u64) -> DispatchResult<()> {
        if bytes > self.limits.max_request_bytes {
            return Err(DispatchError::ResourceExhausted(format!(
                "source is {} bytes, exceeding the {}-byte request ceiling",
                bytes, self.limits.max_request_bytes
            )));
        }
        Ok(())
    }

    /// Rejects any path that resolves outside `scan_root`.
    fn resolve_path(&self, raw: &str) -> DispatchResult<PathBuf> {
        let candidate = Path::new(raw);
        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.limits.scan_root.join(candidate)
        };
        let canonical_root = std::fs::canonicalize(&self.limits.scan_root)
            .map_err(|e| DispatchError::NotFound(format!("configured root is unreadable: {}", e)))?;
        let canonical = std::fs::canonicalize(&joined)
            .map_err(|e| DispatchError::NotFound(format!("cannot resolve '{}': {}", raw, e)))?;
        if !canonical.starts_with(&canonical_root) {
            return Err(DispatchError::InvalidRequest(format!(
                "'{}' resolves outside the configured root",
                raw
            )));
        }
        Ok(canonical)
    }
}

fn validate_source_type(params: &CodeReviewParams) -> DispatchResult<()> {
    match params.source_type {
        SourceType::Code => {
            if params.code.is_none() {
                return Err(DispatchError::InvalidRequest(
                    "source_type 'code' requires 'code'".to_string(),
                ));
            }
            if params.file_path.is_some() || params.directory_path.is_some() {
                return Err(DispatchError::InvalidRequest(
                    "'file_path'/'directory_path' are mutually exclusive with source_type 'code'".to_string(),
                ));
            }
        }
        SourceType::File => {
            if params.file_path.is_none() {
                return Err(DispatchError::InvalidRequest(
                    "source_type 'file' requires 'file_path'".to_string(),
                ));
            }
            if params.code.is_some() || params.directory_path.is_some() {
                return Err(DispatchError::InvalidRequest(
                    "'code'/'directory_path' are mutually exclusive with source_type 'file'".to_string(),
                ));
            }
        }
        SourceType::Directory => {
            if params.directory_path.is_none() {
                return Err(DispatchError::InvalidRequest(
                    "source_type 'directory' requires 'directory_path'".to_string(),
                ));
            }
            if params.code.is_some() || params.file_path.is_some() {
                return Err(DispatchError::InvalidRequest(
                    "'code'/'file_path' are mutually exclusive with source_type 'directory'".to_string(),
                ));
            }
        }
    }
    Ok(())
}

fn parse_severity_filter(s: &str) -> DispatchResult<SeverityFilter> {
    match s {
        "all" => Ok(SeverityFilter::All),
        "error" => Ok(SeverityFilter::Error),
        "warning" => Ok(SeverityFilter::Warning),
        "suggestion" => Ok(SeverityFilter::Suggestion),
        other => Err(DispatchError::InvalidRequest(format!(
            "unknown severity_filter '{}'",
            other
        ))),
    }
}

fn parse_format(s: &str) -> DispatchResult<OutputFormat> {
    match s {
        "json" => Ok(OutputFormat::Json),
        "markdown" => Ok(OutputFormat::Markdown),
        "stream" => Ok(OutputFormat::Stream),
        other => Err(DispatchError::InvalidRequest(format!("unknown format '{}'", other))),
    }
}

fn parse_rule_code(s: &str) -> DispatchResult<DiagnosticCode> {
    ALL_CODES
        .iter()
        .find(|c| c.as_str() == s)
        .copied()
        .ok_or_else(|| DispatchError::InvalidRequest(format!("unknown rule code '{}'", s)))
}

const ALL_CODES: &[DiagnosticCode] = &[
    DiagnosticCode::ShortTitleTooLong,
    DiagnosticCode::InvalidPrecision,
    DiagnosticCode::InvalidMaxBarsBack,
    DiagnosticCode::InvalidMaxLinesCount,
    DiagnosticCode::InvalidMaxBoxesCount,
    DiagnosticCode::InvalidMaxLabelsCount,
    DiagnosticCode::InvalidMaxPolylinesCount,
    DiagnosticCode::ParameterRangeValidation,
    DiagnosticCode::InputTypeMismatch,
    DiagnosticCode::SeriesTypeWhereSimpleExpected,
    DiagnosticCode::FunctionSignatureValidation,
    DiagnosticCode::UnknownFunctionParameter,
    DiagnosticCode::DeprecatedParameterName,
    DiagnosticCode::InvalidParameterNamingConvention,
    DiagnosticCode::UdtHistorySyntaxError,
    DiagnosticCode::InvalidLineContinuation,
];

fn render_markdown(response: &CodeReviewResponse) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# Pine Script review ({} issue{})\n\n",
        response.summary.total_issues,
        if response.summary.total_issues == 1 { "" } else { "s" }
    ));
    if response.violations.is_empty() {
        out.push_str("No issues found.\n");
        return out;
    }
    for v in &response.violations {
        out.push_str(&format!(
            "- **{}** ({}) at {}:{} — {}\n",
            v.rule, v.severity, v.line, v.column, v.message
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(ReferenceIndex::from_entries(vec![]), DispatcherLimits::default())
    }

    #[test]
    fn code_without_code_field_is_invalid_request() {
        let d = dispatcher();
        let params = CodeReviewParams {
            source_type: SourceType::Code,
            code: None,
            file_path: None,
            directory_path: None,
            format: None,
            severity_filter: None,
            recursive: None,
            file_extensions: None,
            chunk_size: None,
            rule_filter: None,
        };
        assert!(matches!(d.code_review(params), Err(DispatchError::InvalidRequest(_))));
    }

    #[test]
    fn code_review_reports_short_title_violation() {
        let d = dispatcher();
        let params = CodeReviewParams {
            source_type: SourceType::Code,
            code: Some(r#"strategy("EMA Ribbon MACD v1.1", "RIBBON_v1.1", overlay = false)"#.to_string()),
            file_path: None,
            directory_path: None,
            format: None,
            severity_filter: None,
            recursive: None,
            file_extensions: None,
            chunk_size: None,
            rule_filter: None,
        };
        let outcome = d.code_review(params).expect("review succeeds");
        let ToolOutcome::Value(value) = outcome else {
            panic!("expected a single JSON value");
        };
        assert_eq!(value["summary"]["total_issues"], 1);
        assert_eq!(value["violations"][0]["rule"], "SHORT_TITLE_TOO_LONG");
    }

    #[test]
    fn mutually_exclusive_fields_are_rejected() {
        let d = dispatcher();
        let params = CodeReviewParams {
            source_type: SourceType::Code,
            code: Some("indicator(\"T\")".to_string()),
            file_path: Some("x.pine".to_string()),
            directory_path: None,
            format: None,
            severity_filter: None,
            recursive: None,
            file_extensions: None,
            chunk_size: None,
            rule_filter: None,
        };
        assert!(matches!(d.code_review(params), Err(DispatchError::InvalidRequest(_))));
    }

    #[test]
    fn stream_format_produces_chunks_with_terminal_done() {
        let d = dispatcher();
        let params = CodeReviewParams {
            source_type: SourceType::Code,
            code: Some("indicator(\"T\", precision=9)\nplot(close, lineWidth=2)\n".to_string()),
            file_path: None,
            directory_path: None,
            format: Some("stream".to_string()),
            severity_filter: None,
            recursive: None,
            file_extensions: None,
            chunk_size: Some(1),
            rule_filter: None,
        };
        let outcome = d.code_review(params).expect("review succeeds");
        let ToolOutcome::Stream(chunks) = outcome else {
            panic!("expected a stream of chunks");
        };
        assert!(chunks.len() >= 2);
        let last = chunks.last().unwrap();
        assert_eq!(last["done"], true);
    }

    #[test]
    fn empty_query_is_invalid_request() {
        let d = dispatcher();
        let params = ReferenceLookupParams {
            query: "   ".to_string(),
            version: "v6".to_string(),
        };
        assert!(matches!(d.reference_lookup(params), Err(DispatchError::InvalidRequest(_))));
    }
}
