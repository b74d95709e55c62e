//! The closed validator set.
//!
//! `ALL` is a fixed array, not a runtime-extensible registry — the catalog of
//! checks a review runs is closed at compile time. Each validator is a pure
//! function over a shared [`ReviewContext`] and can run independently in
//! parallel with no synchronization.

mod context;
mod deprecated;
mod length;
mod line_continuation;
mod naming;
mod range;
mod signature;
mod simple_series;
mod type_mismatch;
mod udt_history;

pub use context::ReviewContext;

use crate::diagnostic::Diagnostic;

pub type ValidatorFn = fn(&ReviewContext) -> Vec<Diagnostic>;

/// Every validator, paired with a stable name used for timeout attribution
/// and for the review summary.
pub static ALL: &[(&str, ValidatorFn)] = &[
    ("length", length::check),
    ("range", range::check),
    ("type_mismatch", type_mismatch::check),
    ("simple_series", simple_series::check),
    ("signature", signature::check),
    ("deprecated", deprecated::check),
    ("naming", naming::check),
    ("udt_history", udt_history::check),
    ("line_continuation", line_continuation::check),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_validator_names_are_unique() {
        let mut names: Vec<&str> = ALL.iter().map(|(n, _)| *n).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALL.len());
    }
}
