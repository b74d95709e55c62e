//! The review engine: lex -> parse -> validate -> merge.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, DiagnosticCode, CATALOG};
use crate::diagnostic::{Diagnostic, Severity};
use crate::lexer::lex;
use crate::parser::parse;
use crate::validators::{ReviewContext, ALL};

/// Default per-validator soft time budget.
pub const DEFAULT_VALIDATOR_BUDGET: Duration = Duration::from_millis(50);
/// Default whole-request wall-clock budget.
pub const DEFAULT_REQUEST_BUDGET: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeverityFilter {
    #[default]
    All,
    Error,
    Warning,
    Suggestion,
}

impl SeverityFilter {
    fn passes(&self, severity: Severity) -> bool {
        match self {
            SeverityFilter::All => true,
            SeverityFilter::Error => severity == Severity::Error,
            SeverityFilter::Warning => matches!(severity, Severity::Error | Severity::Warning),
            SeverityFilter::Suggestion => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
    Stream,
}

/// Options accepted by `review()`.
#[derive(Debug, Clone)]
pub struct ReviewOpts {
    pub severity_filter: SeverityFilter,
    /// Rule codes this review is restricted to; empty means all rules run.
    pub rule_filter: Vec<DiagnosticCode>,
    pub format: OutputFormat,
    pub chunk_size: u32,
    pub validator_budget: Duration,
    pub request_budget: Duration,
}

impl Default for ReviewOpts {
    fn default() -> Self {
        ReviewOpts {
            severity_filter: SeverityFilter::All,
            rule_filter: Vec::new(),
            format: OutputFormat::Json,
            chunk_size: 20,
            validator_budget: DEFAULT_VALIDATOR_BUDGET,
            request_budget: DEFAULT_REQUEST_BUDGET,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    pub total_issues: usize,
    pub errors: usize,
    pub warnings: usize,
    pub suggestions: usize,
    pub filtered_count: usize,
    pub severity_filter: SeverityFilter,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewResult {
    pub summary: Summary,
    pub violations: Vec<Diagnostic>,
    pub reviewed_lines: u32,
    pub version: String,
    pub version_pragma: Option<String>,
    pub incomplete: bool,
}

/// Run the full pipeline over `source`.
pub fn review(source: &str, opts: &ReviewOpts) -> ReviewResult {
    let started = Instant::now();
    let normalized = source.replace("\r\n", "\n");

    let lexed = lex(&normalized);
    let parsed = parse(&lexed.tokens);

    let mut incomplete = false;

    let validator_diags = if started.elapsed() >= opts.request_budget {
        incomplete = true;
        Vec::new()
    } else {
        run_validators(&parsed.script, &lexed.tokens, &CATALOG, opts, started)
    };
    if started.elapsed() >= opts.request_budget {
        incomplete = true;
    }

    let mut all: Vec<Diagnostic> = Vec::with_capacity(
        lexed.diagnostics.len() + parsed.diagnostics.len() + validator_diags.len(),
    );
    all.extend(lexed.diagnostics);
    all.extend(parsed.diagnostics);
    all.extend(validator_diags);

    // `ValidatorTimeout` is an internal budget-overrun marker, never surfaced
    // to callers (diagnostic.rs). It folds into `incomplete` instead.
    let had_timeout = all.iter().any(|d| d.code == DiagnosticCode::ValidatorTimeout);
    incomplete = incomplete || had_timeout;
    all.retain(|d| d.code != DiagnosticCode::ValidatorTimeout);

    all = apply_rule_filter(all, &opts.rule_filter);
    let (kept, filtered_out) = apply_severity_filter(all, opts.severity_filter);

    let deduped = dedup_and_sort(kept);

    let summary = build_summary(&deduped, filtered_out, opts.severity_filter);
    let reviewed_lines = normalized.lines().count().max(if normalized.is_empty() { 0 } else { 1 }) as u32;

    ReviewResult {
        summary,
        violations: deduped,
        reviewed_lines,
        version: "v6".to_string(),
        version_pragma: lexed.metadata.version_pragma,
        incomplete,
    }
}

fn run_validators(
    script: &crate::ast::Script,
    tokens: &[crate::token::Token],
    catalog: &Catalog,
    opts: &ReviewOpts,
    started: Instant,
) -> Vec<Diagnostic> {
    use rayon::prelude::*;

    let ctx = ReviewContext::new(script, tokens, catalog, opts.validator_budget);
    if started.elapsed() >= opts.request_budget {
        return Vec::new();
    }

    ALL.par_iter()
        .flat_map(|(name, check)| {
            let validator_start = Instant::now();
            let mut diags = check(&ctx);
            if validator_start.elapsed() > ctx.budget {
                diags.push(Diagnostic::validator_timeout(
                    crate::span::Span::point(1, 1, 0),
                    name,
                ));
            }
            diags
        })
        .collect()
}

fn apply_rule_filter(diags: Vec<Diagnostic>, rule_filter: &[DiagnosticCode]) -> Vec<Diagnostic> {
    if rule_filter.is_empty() {
        return diags;
    }
    diags.into_iter().filter(|d| rule_filter.contains(&d.code)).collect()
}

fn apply_severity_filter(diags: Vec<Diagnostic>, filter: SeverityFilter) -> (Vec<Diagnostic>, usize) {
    let total = diags.len();
    let kept: Vec<Diagnostic> = diags.into_iter().filter(|d| filter.passes(d.severity)).collect();
    let filtered_count = total - kept.len();
    (kept, filtered_count)
}

/// Deduplicate on `(code, line, column, parameter_name)` and sort by
/// `(line, column, code)`.
fn dedup_and_sort(mut diags: Vec<Diagnostic>) -> Vec<Diagnostic> {
    diags.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    let mut seen = std::collections::HashSet::new();
    diags.retain(|d| seen.insert(d.dedup_key()));
    diags
}

fn build_summary(diags: &[Diagnostic], filtered_count: usize, severity_filter: SeverityFilter) -> Summary {
    let mut errors = 0;
    let mut warnings = 0;
    let mut suggestions = 0;
    for d in diags {
        match d.severity {
            Severity::Error => errors += 1,
            Severity::Warning => warnings += 1,
            Severity::Suggestion => suggestions += 1,
        }
    }
    Summary {
        total_issues: diags.len(),
        errors,
        warnings,
        suggestions,
        filtered_count,
        severity_filter,
    }
}

/// One chunk of the `stream` output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChunk {
    pub chunk_index: i64,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub violations: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub summary: Option<Summary>,
    #[serde(skip_serializing_if = "is_false", default)]
    pub done: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Split `result.violations` into `chunk_size`-sized chunks followed by a
/// terminal `done: true` chunk carrying the summary.
pub fn into_stream_chunks(result: &ReviewResult, chunk_size: u32) -> Vec<StreamChunk> {
    let chunk_size = chunk_size.max(1) as usize;
    let mut chunks: Vec<StreamChunk> = result
        .violations
        .chunks(chunk_size)
        .enumerate()
        .map(|(i, v)| StreamChunk {
            chunk_index: i as i64,
            violations: v.to_vec(),
            summary: None,
            done: false,
        })
        .collect();
    chunks.push(StreamChunk {
        chunk_index: -1,
        violations: Vec::new(),
        summary: Some(result.summary.clone()),
        done: true,
    });
    chunks
}

/// Aggregate per-file results for a directory review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectorySummary {
    pub total_files: usize,
    pub total_issues: usize,
    pub files_with_issues: usize,
}

pub fn aggregate_directory_summary(results: &BTreeMap<String, ReviewResult>) -> DirectorySummary {
    let total_files = results.len();
    let total_issues = results.values().map(|r| r.summary.total_issues).sum();
    let files_with_issues = results.values().filter(|r| r.summary.total_issues > 0).count();
    DirectorySummary {
        total_files,
        total_issues,
        files_with_issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_produces_no_violations() {
        let result = review("", &ReviewOpts::default());
        assert!(result.violations.is_empty());
        assert_eq!(result.summary.total_issues, 0);
        assert!(!result.incomplete);
    }

    #[test]
    fn shorttitle_violation_is_reported_and_summarized() {
        let src = r#"strategy("EMA Ribbon MACD v1.1", "RIBBON_v1.1", overlay = false)"#;
        let result = review(src, &ReviewOpts::default());
        assert_eq!(result.summary.total_issues, 1);
        assert_eq!(result.summary.errors, 1);
        assert_eq!(result.violations[0].code, DiagnosticCode::ShortTitleTooLong);
    }

    #[test]
    fn diagnostics_are_sorted_and_deduplicated() {
        let src = "indicator(\"T\", precision=9)\nindicator(\"U\", precision=9)\n";
        let result = review(src, &ReviewOpts::default());
        for pair in result.violations.windows(2) {
            assert!(pair[0].sort_key() <= pair[1].sort_key());
        }
    }

    #[test]
    fn severity_filter_error_drops_suggestions() {
        let src = r#"plot(close, lineWidth=2)"#;
        let all = review(src, &ReviewOpts::default());
        assert!(all.summary.suggestions >= 1);

        let mut opts = ReviewOpts::default();
        opts.severity_filter = SeverityFilter::Error;
        let errors_only = review(src, &opts);
        assert_eq!(errors_only.summary.suggestions, 0);
        assert!(errors_only.summary.filtered_count >= 1);
    }

    #[test]
    fn version_pragma_is_recorded_but_does_not_gate_the_catalog() {
        let src = "//@version=6\nindicator(\"T\", precision=9)\n";
        let result = review(src, &ReviewOpts::default());
        assert_eq!(result.version_pragma.as_deref(), Some("6"));
        assert_eq!(result.summary.errors, 1);
    }

    #[test]
    fn determinism_same_input_same_output() {
        let src = r#"strategy("EMA Ribbon MACD v1.1", "RIBBON_v1.1", overlay = false)"#;
        let a = review(src, &ReviewOpts::default());
        let b = review(src, &ReviewOpts::default());
        assert_eq!(
            serde_json::to_string(&a.violations).unwrap(),
            serde_json::to_string(&b.violations).unwrap()
        );
    }

    #[test]
    fn stream_chunks_split_and_terminate_with_done() {
        let src = "indicator(\"T\", precision=9)\nplot(close, lineWidth=2)\n";
        let result = review(src, &ReviewOpts::default());
        let chunks = into_stream_chunks(&result, 1);
        assert!(chunks.len() >= 2);
        let last = chunks.last().unwrap();
        assert!(last.done);
        assert_eq!(last.chunk_index, -1);
        assert!(last.summary.is_some());
    }
}
