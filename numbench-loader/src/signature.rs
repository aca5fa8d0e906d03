//! Foreign Signatures
//!
//! Per-algorithm description of the C-ABI parameter and return types a
//! foreign library exports.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// C type at a foreign boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CType {
    /// `int`
    Int,
    /// `double`
    Double,
    /// Caller-allocated `int*` output buffer
    IntBuffer,
}

/// Parameter and return types of a foreign function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Parameter types in order
    pub params: Vec<CType>,
    /// Return type
    pub returns: CType,
}

impl Signature {
    /// Build a signature
    pub fn new(params: impl Into<Vec<CType>>, returns: CType) -> Self {
        Self {
            params: params.into(),
            returns,
        }
    }
}

/// Algorithm name → foreign signature
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureTable {
    entries: BTreeMap<String, Signature>,
}

impl SignatureTable {
    /// Empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Signatures of the bundled algorithms
    ///
    /// - `sieve(int n, int* out) -> int` writes primes ≤ n and returns the count
    /// - `trapezoid(double a, double b, int n) -> double`
    pub fn builtin() -> Self {
        let mut table = Self::new();
        table.insert("sieve", Signature::new([CType::Int, CType::IntBuffer], CType::Int));
        table.insert(
            "trapezoid",
            Signature::new([CType::Double, CType::Double, CType::Int], CType::Double),
        );
        table
    }

    /// Add or replace an algorithm's signature
    pub fn insert(&mut self, algorithm: impl Into<String>, signature: Signature) {
        self.entries.insert(algorithm.into(), signature);
    }

    /// Signature for `algorithm`
    pub fn get(&self, algorithm: &str) -> Option<&Signature> {
        self.entries.get(algorithm)
    }

    /// Algorithms with a declared signature
    pub fn algorithms(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
