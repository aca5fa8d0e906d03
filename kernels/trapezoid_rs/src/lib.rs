//! `double trapezoid_rs(double a, double b, int n)`: trapezoidal rule for
//! `x²` over `[a, b]`.

use std::ffi::{c_double, c_int};

/// Returns NaN when `n < 1`.
#[unsafe(no_mangle)]
pub extern "C" fn trapezoid_rs(a: c_double, b: c_double, n: c_int) -> c_double {
    if n < 1 {
        return f64::NAN;
    }
    let h = (b - a) / f64::from(n);
    let mut s = 0.5 * (a * a + b * b);
    for i in 1..n {
        let x = a + f64::from(i) * h;
        s += x * x;
    }
    s * h
}
