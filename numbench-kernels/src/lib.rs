//! Reference Kernels
//!
//! The in-process implementations every other language is checked against,
//! plus their uniform-call entry points.

#![warn(missing_docs)]

use numbench_core::{Arg, ImplError, Value, check_arity, float_arg, size_arg};

/// Integrand used by [`trapezoid`]
#[inline]
pub fn square(x: f64) -> f64 {
    x * x
}

/// All primes `<= n`, ascending (Sieve of Eratosthenes)
pub fn sieve(n: usize) -> Vec<i64> {
    if n < 2 {
        return Vec::new();
    }

    let mut is_prime = vec![true; n + 1];
    is_prime[0] = false;
    is_prime[1] = false;

    let mut p = 2;
    while p * p <= n {
        if is_prime[p] {
            for k in (p * p..=n).step_by(p) {
                is_prime[k] = false;
            }
        }
        p += 1;
    }

    is_prime
        .iter()
        .enumerate()
        .filter_map(|(i, &prime)| prime.then_some(i as i64))
        .collect()
}

/// Trapezoidal rule for `x²` over `[a, b]` with `n` subintervals
///
/// `n` must be at least 1.
pub fn trapezoid(a: f64, b: f64, n: usize) -> f64 {
    let h = (b - a) / n as f64;
    let mut s = 0.5 * (square(a) + square(b));
    for i in 1..n {
        s += square(a + i as f64 * h);
    }
    s * h
}

/// `[Int(n)] → Sequence(primes ≤ n)`
pub fn sieve_native(args: &[Arg]) -> Result<Value, ImplError> {
    check_arity(args, 1)?;
    Ok(Value::Sequence(sieve(size_arg(args, 0)?)))
}

/// `[Float(a), Float(b), Int(n)] → Scalar(∫ x² dx)`
pub fn trapezoid_native(args: &[Arg]) -> Result<Value, ImplError> {
    check_arity(args, 3)?;
    let a = float_arg(args, 0)?;
    let b = float_arg(args, 1)?;
    let n = size_arg(args, 2)?;
    if n == 0 {
        return Err(ImplError::InvalidArg {
            index: 2,
            expected: "at least one subinterval",
        });
    }
    Ok(Value::Scalar(trapezoid(a, b, n)))
}

/// Uniform-call function pointer
pub type Entry = fn(&[Arg]) -> Result<Value, ImplError>;

/// `(name, entry)` for every kernel, named the way the native loader looks them up
pub fn entries() -> Vec<(&'static str, Entry)> {
    vec![
        ("sieve_native", sieve_native as Entry),
        ("trapezoid_native", trapezoid_native as Entry),
    ]
}
