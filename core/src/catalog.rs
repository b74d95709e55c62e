//! The static rule catalog.
//!
//! This is the single source of truth for diagnostic codes and per-function
//! constraint bundles. Validators never hard-code function names — they
//! always go through `Catalog::guarded_function`.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::diagnostic::Severity;
use crate::types::TypeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    ShortTitleTooLong,
    InvalidPrecision,
    InvalidMaxBarsBack,
    InvalidMaxLinesCount,
    InvalidMaxBoxesCount,
    InvalidMaxLabelsCount,
    InvalidMaxPolylinesCount,
    ParameterRangeValidation,
    InputTypeMismatch,
    SeriesTypeWhereSimpleExpected,
    FunctionSignatureValidation,
    UnknownFunctionParameter,
    DeprecatedParameterName,
    InvalidParameterNamingConvention,
    UdtHistorySyntaxError,
    InvalidLineContinuation,
    /// Internal, not part of the closed user-facing set.
    ValidatorTimeout,
    LexicalError,
    ParseError,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::ShortTitleTooLong => "SHORT_TITLE_TOO_LONG",
            DiagnosticCode::InvalidPrecision => "INVALID_PRECISION",
            DiagnosticCode::InvalidMaxBarsBack => "INVALID_MAX_BARS_BACK",
            DiagnosticCode::InvalidMaxLinesCount => "INVALID_MAX_LINES_COUNT",
            DiagnosticCode::InvalidMaxBoxesCount => "INVALID_MAX_BOXES_COUNT",
            DiagnosticCode::InvalidMaxLabelsCount => "INVALID_MAX_LABELS_COUNT",
            DiagnosticCode::InvalidMaxPolylinesCount => "INVALID_MAX_POLYLINES_COUNT",
            DiagnosticCode::ParameterRangeValidation => "PARAMETER_RANGE_VALIDATION",
            DiagnosticCode::InputTypeMismatch => "INPUT_TYPE_MISMATCH",
            DiagnosticCode::SeriesTypeWhereSimpleExpected => "SERIES_TYPE_WHERE_SIMPLE_EXPECTED",
            DiagnosticCode::FunctionSignatureValidation => "FUNCTION_SIGNATURE_VALIDATION",
            DiagnosticCode::UnknownFunctionParameter => "UNKNOWN_FUNCTION_PARAMETER",
            DiagnosticCode::DeprecatedParameterName => "DEPRECATED_PARAMETER_NAME",
            DiagnosticCode::InvalidParameterNamingConvention => {
                "INVALID_PARAMETER_NAMING_CONVENTION"
            }
            DiagnosticCode::UdtHistorySyntaxError => "UDT_HISTORY_SYNTAX_ERROR",
            DiagnosticCode::InvalidLineContinuation => "INVALID_LINE_CONTINUATION",
            DiagnosticCode::ValidatorTimeout => "VALIDATOR_TIMEOUT",
            DiagnosticCode::LexicalError => "LEXICAL_ERROR",
            DiagnosticCode::ParseError => "PARSE_ERROR",
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            DiagnosticCode::InvalidParameterNamingConvention | DiagnosticCode::ValidatorTimeout => {
                Severity::Suggestion
            }
            _ => Severity::Error,
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            DiagnosticCode::ShortTitleTooLong => "length",
            DiagnosticCode::InvalidPrecision
            | DiagnosticCode::InvalidMaxBarsBack
            | DiagnosticCode::InvalidMaxLinesCount
            | DiagnosticCode::InvalidMaxBoxesCount
            | DiagnosticCode::InvalidMaxLabelsCount
            | DiagnosticCode::InvalidMaxPolylinesCount
            | DiagnosticCode::ParameterRangeValidation => "range",
            DiagnosticCode::InputTypeMismatch | DiagnosticCode::SeriesTypeWhereSimpleExpected => {
                "type"
            }
            DiagnosticCode::FunctionSignatureValidation
            | DiagnosticCode::UnknownFunctionParameter => "signature",
            DiagnosticCode::DeprecatedParameterName
            | DiagnosticCode::InvalidParameterNamingConvention => "style",
            DiagnosticCode::UdtHistorySyntaxError => "udt",
            DiagnosticCode::InvalidLineContinuation => "layout",
            DiagnosticCode::ValidatorTimeout => "internal",
            DiagnosticCode::LexicalError | DiagnosticCode::ParseError => "syntax",
        }
    }
}

/// A numeric/integer range constraint on a named parameter.
#[derive(Debug, Clone, Copy)]
pub struct RangeConstraint {
    pub min: f64,
    pub max: f64,
    pub integer: bool,
}

/// A string-length constraint on a named parameter.
#[derive(Debug, Clone, Copy)]
pub struct LengthConstraint {
    pub max_length: usize,
}

/// The constraint bundle for one guarded function.
#[derive(Debug, Clone, Default)]
pub struct FunctionEntry {
    pub qualified_name: &'static str,
    /// Parameter names in positional order.
    pub positional_names: Vec<&'static str>,
    /// Parameter names that must be supplied (used by the signature rule).
    pub required_names: Vec<&'static str>,
    /// Expected type per positional index (absent = unconstrained).
    pub expected_kinds: HashMap<u16, TypeKind>,
    /// Positions that must resolve to a *simple* (non-series) value.
    pub simple_required_positions: Vec<u16>,
    pub range_constraints: HashMap<&'static str, RangeConstraint>,
    pub length_constraints: HashMap<&'static str, LengthConstraint>,
    /// Old name -> canonical new name (v5 -> v6 renames).
    pub deprecated_param_aliases: HashMap<&'static str, &'static str>,
    /// The "kind" a call to this function produces, for type inference
    /// rule 3. `None` means `unknown`.
    pub return_kind: Option<TypeKind>,
}

impl FunctionEntry {
    /// All parameter names this function accepts (positional + any named-only
    /// extras implied by `range_constraints`/`length_constraints`), used by
    /// the unknown-parameter check.
    pub fn all_named_parameters(&self) -> Vec<&'static str> {
        let mut set: Vec<&'static str> = self.positional_names.clone();
        for k in self.range_constraints.keys() {
            if !set.contains(k) {
                set.push(k);
            }
        }
        for k in self.length_constraints.keys() {
            if !set.contains(k) {
                set.push(k);
            }
        }
        for k in self.deprecated_param_aliases.values() {
            if !set.contains(k) {
                set.push(k);
            }
        }
        set
    }

    pub fn position_of(&self, name: &str) -> Option<u16> {
        self.positional_names
            .iter()
            .position(|n| *n == name)
            .map(|i| i as u16)
    }
}

/// The full catalog: diagnostic metadata (carried via `DiagnosticCode`
/// itself) plus the guarded-function table, keyed by `namespace.name` or
/// bare `name` for unqualified calls.
pub struct Catalog {
    functions: HashMap<&'static str, FunctionEntry>,
}

impl Catalog {
    pub fn guarded_function(&self, qualified_name: &str) -> Option<&FunctionEntry> {
        self.functions.get(qualified_name)
    }

    pub fn drawing_count_code(param_name: &str) -> Option<DiagnosticCode> {
        match param_name {
            "max_lines_count" => Some(DiagnosticCode::InvalidMaxLinesCount),
            "max_boxes_count" => Some(DiagnosticCode::InvalidMaxBoxesCount),
            "max_labels_count" => Some(DiagnosticCode::InvalidMaxLabelsCount),
            "max_polylines_count" => Some(DiagnosticCode::InvalidMaxPolylinesCount),
            _ => None,
        }
    }
}

fn range(min: f64, max: f64, integer: bool) -> RangeConstraint {
    RangeConstraint { min, max, integer }
}

fn drawing_constraints() -> HashMap<&'static str, RangeConstraint> {
    let mut m = HashMap::new();
    m.insert("max_lines_count", range(1.0, 500.0, true));
    m.insert("max_boxes_count", range(1.0, 500.0, true));
    m.insert("max_labels_count", range(1.0, 500.0, true));
    m.insert("max_polylines_count", range(1.0, 500.0, true));
    m
}

/// Built once, at process start. The guarded set
/// covers what the worked examples in anything not
/// listed here is deliberately left unconstrained.
pub static CATALOG: Lazy<Catalog> = Lazy::new(build_catalog);

fn build_catalog() -> Catalog {
    let mut functions = HashMap::new();

    for name in ["indicator", "strategy"] {
        let mut range_constraints = drawing_constraints();
        range_constraints.insert("precision", range(0.0, 8.0, true));
        range_constraints.insert("max_bars_back", range(1.0, 5000.0, true));

        let mut length_constraints = HashMap::new();
        length_constraints.insert("shorttitle", LengthConstraint { max_length: 10 });

        functions.insert(
            name,
            FunctionEntry {
                qualified_name: name,
                positional_names: vec![
                    "title",
                    "shorttitle",
                    "overlay",
                    "format",
                    "precision",
                    "scale",
                    "max_bars_back",
                ],
                required_names: vec!["title"],
                expected_kinds: HashMap::new(),
                simple_required_positions: vec![],
                range_constraints,
                length_constraints,
                deprecated_param_aliases: HashMap::new(),
                return_kind: None,
            },
        );
    }

    functions.insert(
        "ta.macd",
        FunctionEntry {
            qualified_name: "ta.macd",
            positional_names: vec![
                "source",
                "fast_length",
                "slow_length",
                "signal_length",
            ],
            required_names: vec!["source", "fast_length", "slow_length", "signal_length"],
            expected_kinds: HashMap::new(),
            simple_required_positions: vec![1, 2, 3],
            range_constraints: HashMap::new(),
            length_constraints: HashMap::new(),
            deprecated_param_aliases: HashMap::new(),
            return_kind: Some(TypeKind::SeriesFloat),
        },
    );

    for (name, positions) in [("ta.sma", 2usize), ("ta.ema", 2)] {
        functions.insert(
            name,
            FunctionEntry {
                qualified_name: name,
                positional_names: vec!["source", "length"][..positions].to_vec(),
                required_names: vec!["source", "length"],
                expected_kinds: HashMap::new(),
                simple_required_positions: vec![1],
                range_constraints: HashMap::new(),
                length_constraints: HashMap::new(),
                deprecated_param_aliases: HashMap::new(),
                return_kind: Some(TypeKind::SeriesFloat),
            },
        );
    }

    let mut table_cell_aliases = HashMap::new();
    table_cell_aliases.insert("textColor", "text_color");
    table_cell_aliases.insert("bgColor", "bgcolor");
    functions.insert(
        "table.cell",
        FunctionEntry {
            qualified_name: "table.cell",
            positional_names: vec![
                "table_id", "column", "row", "text", "width", "height", "text_color", "bgcolor",
            ],
            required_names: vec!["table_id", "column", "row"],
            expected_kinds: HashMap::new(),
            simple_required_positions: vec![],
            range_constraints: HashMap::new(),
            length_constraints: HashMap::new(),
            deprecated_param_aliases: table_cell_aliases,
            return_kind: None,
        },
    );

    for name in ["input.int", "input.float"] {
        let mut rc = HashMap::new();
        rc.insert("minval", range(f64::MIN, f64::MAX, false));
        let mut expected_kinds = HashMap::new();
        expected_kinds.insert(
            0,
            if name == "input.int" {
                TypeKind::Int
            } else {
                TypeKind::Float
            },
        );
        functions.insert(
            name,
            FunctionEntry {
                qualified_name: name,
                positional_names: vec!["defval", "title", "minval", "maxval", "step", "tooltip"],
                required_names: vec!["defval"],
                expected_kinds,
                simple_required_positions: vec![],
                range_constraints: rc,
                length_constraints: HashMap::new(),
                deprecated_param_aliases: HashMap::new(),
                return_kind: if name == "input.int" {
                    Some(TypeKind::Int)
                } else {
                    Some(TypeKind::Float)
                },
            },
        );
    }

    let mut input_bool_kinds = HashMap::new();
    input_bool_kinds.insert(0, TypeKind::Bool);
    functions.insert(
        "input.bool",
        FunctionEntry {
            qualified_name: "input.bool",
            positional_names: vec!["defval", "title", "tooltip"],
            required_names: vec!["defval"],
            expected_kinds: input_bool_kinds,
            return_kind: Some(TypeKind::Bool),
            ..Default::default()
        },
    );
    let mut input_string_kinds = HashMap::new();
    input_string_kinds.insert(0, TypeKind::String);
    functions.insert(
        "input.string",
        FunctionEntry {
            qualified_name: "input.string",
            positional_names: vec!["defval", "title", "options", "tooltip"],
            required_names: vec!["defval"],
            expected_kinds: input_string_kinds,
            return_kind: Some(TypeKind::String),
            ..Default::default()
        },
    );

    functions.insert(
        "plot",
        FunctionEntry {
            qualified_name: "plot",
            positional_names: vec!["series", "title", "color", "linewidth", "style"],
            required_names: vec!["series"],
            ..Default::default()
        },
    );

    for name in ["line.new", "box.new", "label.new", "polyline.new"] {
        functions.insert(
            name,
            FunctionEntry {
                qualified_name: name,
                positional_names: vec![],
                required_names: vec![],
                return_kind: Some(TypeKind::SeriesFloat),
                ..Default::default()
            },
        );
    }

    for name in ["strategy.entry", "strategy.exit"] {
        functions.insert(
            name,
            FunctionEntry {
                qualified_name: name,
                positional_names: vec!["id", "direction"],
                required_names: vec!["id"],
                ..Default::default()
            },
        );
    }

    let mut color_new_kinds = HashMap::new();
    color_new_kinds.insert(0, TypeKind::Color);
    color_new_kinds.insert(1, TypeKind::Float);
    functions.insert(
        "color.new",
        FunctionEntry {
            qualified_name: "color.new",
            positional_names: vec!["color", "transp"],
            required_names: vec!["color", "transp"],
            expected_kinds: color_new_kinds,
            return_kind: Some(TypeKind::Color),
            ..Default::default()
        },
    );

    functions.insert(
        "array.new_float",
        FunctionEntry {
            qualified_name: "array.new_float",
            positional_names: vec!["size", "initial_value"],
            required_names: vec![],
            return_kind: None,
            ..Default::default()
        },
    );

    Catalog { functions }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_has_shorttitle_length_constraint() {
        let entry = CATALOG.guarded_function("indicator").unwrap();
        assert_eq!(entry.length_constraints["shorttitle"].max_length, 10);
    }

    #[test]
    fn macd_requires_simple_for_length_params() {
        let entry = CATALOG.guarded_function("ta.macd").unwrap();
        assert_eq!(entry.simple_required_positions, vec![1, 2, 3]);
    }

    #[test]
    fn unlisted_function_returns_none() {
        assert!(CATALOG.guarded_function("totally.unknown_fn").is_none());
    }

    #[test]
    fn drawing_count_param_maps_to_specific_code() {
        assert_eq!(
            Catalog::drawing_count_code("max_lines_count"),
            Some(DiagnosticCode::InvalidMaxLinesCount)
        );
        assert_eq!(Catalog::drawing_count_code("unrelated"), None);
    }
}
