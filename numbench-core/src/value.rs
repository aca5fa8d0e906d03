//! Uniform Calling Convention
//!
//! Every implementation, whatever it was loaded from, is called as
//! `Fn(&[Arg]) -> Result<Value, ImplError>`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A positional call argument
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Arg {
    /// Integer argument (sizes, counts)
    Int(i64),
    /// Floating-point argument (bounds, coefficients)
    Float(f64),
}

impl Arg {
    /// Integer value, if this is an integer argument
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Arg::Int(v) => Some(v),
            Arg::Float(_) => None,
        }
    }

    /// Floating-point value; integers widen to `f64`
    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Arg::Int(v) => Some(v as f64),
            Arg::Float(v) => Some(v),
        }
    }
}

impl From<i64> for Arg {
    fn from(v: i64) -> Self {
        Arg::Int(v)
    }
}

impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        Arg::Float(v)
    }
}

/// Output of one implementation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Ordered sequence output (sequence-shaped algorithms)
    Sequence(Vec<i64>),
    /// Single numeric output (scalar-shaped algorithms)
    Scalar(f64),
}

impl Value {
    /// Sequence contents, if sequence-shaped
    pub fn as_sequence(&self) -> Option<&[i64]> {
        match self {
            Value::Sequence(v) => Some(v),
            Value::Scalar(_) => None,
        }
    }

    /// Scalar value, if scalar-shaped
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(v) => Some(*v),
            Value::Sequence(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(v) => write!(f, "{v}"),
            Value::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Failure raised by an implementation call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ImplError {
    /// Wrong number of arguments
    #[error("expected {expected} argument(s), got {actual}")]
    Arity {
        /// Number of arguments the implementation takes
        expected: usize,
        /// Number of arguments supplied
        actual: usize,
    },

    /// Argument has the wrong type or is out of range
    #[error("argument {index} must be {expected}")]
    InvalidArg {
        /// Zero-based argument position
        index: usize,
        /// Description of the accepted values
        expected: &'static str,
    },

    /// Foreign function reported failure through its return value
    #[error("foreign call returned error status {0}")]
    Foreign(i64),

    /// Implementation panicked
    #[error("panicked: {0}")]
    Panicked(String),

    /// Any other failure
    #[error("{0}")]
    Failed(String),
}

/// Check that exactly `expected` arguments were supplied
pub fn check_arity(args: &[Arg], expected: usize) -> Result<(), ImplError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ImplError::Arity {
            expected,
            actual: args.len(),
        })
    }
}

/// Read argument `index` as a non-negative integer
pub fn size_arg(args: &[Arg], index: usize) -> Result<usize, ImplError> {
    args.get(index)
        .and_then(Arg::as_int)
        .and_then(|v| usize::try_from(v).ok())
        .ok_or(ImplError::InvalidArg {
            index,
            expected: "a non-negative integer",
        })
}

/// Read argument `index` as a float
pub fn float_arg(args: &[Arg], index: usize) -> Result<f64, ImplError> {
    args.get(index)
        .and_then(Arg::as_float)
        .ok_or(ImplError::InvalidArg {
            index,
            expected: "a number",
        })
}

type CallFn = dyn Fn(&[Arg]) -> Result<Value, ImplError>;

/// A callable honoring the uniform calling convention
///
/// Owns whatever the call needs (closures over bounds, library handles).
pub struct Implementation {
    call: Box<CallFn>,
}

impl Implementation {
    /// Wrap a callable
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Arg]) -> Result<Value, ImplError> + 'static,
    {
        Self { call: Box::new(f) }
    }

    /// Invoke the implementation
    #[inline]
    pub fn call(&self, args: &[Arg]) -> Result<Value, ImplError> {
        (self.call)(args)
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Implementation").finish_non_exhaustive()
    }
}
