//! Sieve of Eratosthenes behind the C buffer convention:
//! `int sieve_rs(int n, int* out)`.

use std::ffi::c_int;

/// Writes every prime `<= n` to `out` and returns how many were written.
///
/// Returns `-1` if `out` is null.
///
/// # Safety
///
/// `out` must point to at least `n + 1` writable `int`s.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn sieve_rs(n: c_int, out: *mut c_int) -> c_int {
    if out.is_null() {
        return -1;
    }
    if n < 2 {
        return 0;
    }

    let n = n as usize;
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

    let mut count = 0usize;
    for (i, _) in is_prime.iter().enumerate().filter(|(_, prime)| **prime) {
        // SAFETY: count <= i <= n, inside the caller's n + 1 buffer.
        unsafe { *out.add(count) = i as c_int };
        count += 1;
    }
    count as c_int
}

#[cfg(test)]
mod tests {
    use super::*;

    fn primes(n: c_int) -> Vec<c_int> {
        let mut buf = vec![0; n.max(0) as usize + 1];
        let count = unsafe { sieve_rs(n, buf.as_mut_ptr()) };
        buf.truncate(count as usize);
        buf
    }

    #[test]
    fn test_sieve_rs() {
        assert_eq!(primes(10), vec![2, 3, 5, 7]);
        assert_eq!(primes(2), vec![2]);
        assert!(primes(1).is_empty());
        assert_eq!(primes(100_000).len(), 9592);
    }

    #[test]
    fn test_null_buffer() {
        assert_eq!(unsafe { sieve_rs(10, std::ptr::null_mut()) }, -1);
    }
}
