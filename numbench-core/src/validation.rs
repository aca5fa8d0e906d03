//! Correctness Check
//!
//! Compares a candidate's output with the reference output for the same input.
//! The reference decides the rule: sequences must match exactly, scalars must
//! be within an absolute tolerance.

use crate::value::Value;
use std::fmt;

/// Outcome of comparing a candidate output with the reference output
#[derive(Debug, Clone, PartialEq)]
pub enum Agreement {
    /// Outputs agree
    Match,
    /// Sequence outputs differ
    SequenceMismatch {
        /// First position where the sequences differ (may equal the shorter length)
        first_difference: usize,
        /// Reference length
        expected_len: usize,
        /// Candidate length
        actual_len: usize,
    },
    /// Scalar outputs differ by more than the tolerance (or are NaN)
    OutOfTolerance {
        /// Reference value
        expected: f64,
        /// Candidate value
        actual: f64,
        /// Absolute deviation
        deviation: f64,
    },
    /// Candidate returned a different kind of output than the reference
    ShapeMismatch,
}

impl Agreement {
    /// Whether the outputs agree
    pub fn is_match(&self) -> bool {
        matches!(self, Agreement::Match)
    }
}

impl fmt::Display for Agreement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Agreement::Match => f.write_str("outputs agree"),
            Agreement::SequenceMismatch {
                first_difference,
                expected_len,
                actual_len,
            } => write!(
                f,
                "sequence differs at index {first_difference} (reference length {expected_len}, candidate length {actual_len})"
            ),
            Agreement::OutOfTolerance {
                expected,
                actual,
                deviation,
            } => write!(f, "{actual} != {expected} (deviation {deviation:e})"),
            Agreement::ShapeMismatch => f.write_str("output shape differs from reference"),
        }
    }
}

/// Compare `candidate` against `reference`
///
/// Scalar comparison is absolute: `|candidate - reference| <= tolerance`.
pub fn check_agreement(reference: &Value, candidate: &Value, tolerance: f64) -> Agreement {
    match (reference, candidate) {
        (Value::Sequence(expected), Value::Sequence(actual)) => {
            if expected == actual {
                return Agreement::Match;
            }
            let first_difference = expected
                .iter()
                .zip(actual.iter())
                .position(|(e, a)| e != a)
                .unwrap_or_else(|| expected.len().min(actual.len()));
            Agreement::SequenceMismatch {
                first_difference,
                expected_len: expected.len(),
                actual_len: actual.len(),
            }
        }
        (Value::Scalar(expected), Value::Scalar(actual)) => {
            let deviation = (actual - expected).abs();
            if deviation <= tolerance {
                Agreement::Match
            } else {
                Agreement::OutOfTolerance {
                    expected: *expected,
                    actual: *actual,
                    deviation,
                }
            }
        }
        _ => Agreement::ShapeMismatch,
    }
}
