//! Foreign Calls
//!
//! Symbols resolved from shared libraries, plus the argument marshalling that
//! puts them behind the uniform calling convention.

use crate::signature::{CType, Signature};
use libloading::Library;
use numbench_core::{Arg, ImplError, Value, check_arity, float_arg};
use std::ffi::{c_double, c_int};
use std::fmt;
use std::sync::Arc;

/// `int f(int n, int* out)`: writes up to `n + 1` values, returns the count
pub type IntBufferFn = unsafe extern "C" fn(c_int, *mut c_int) -> c_int;

/// `double f(double a, double b, int n)`
pub type IntervalFn = unsafe extern "C" fn(c_double, c_double, c_int) -> c_double;

/// Supported foreign calling shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignAbi {
    /// See [`IntBufferFn`]
    IntBuffer,
    /// See [`IntervalFn`]
    Interval,
}

impl ForeignAbi {
    /// ABI matching `signature`, if it is one we can marshal
    pub fn for_signature(signature: &Signature) -> Option<Self> {
        match (signature.params.as_slice(), signature.returns) {
            ([CType::Int, CType::IntBuffer], CType::Int) => Some(ForeignAbi::IntBuffer),
            ([CType::Double, CType::Double, CType::Int], CType::Double) => {
                Some(ForeignAbi::Interval)
            }
            _ => None,
        }
    }
}

/// A typed foreign function pointer
#[derive(Clone, Copy)]
pub enum ForeignFn {
    /// Sequence-producing buffer function
    IntBuffer(IntBufferFn),
    /// Scalar function over an interval
    Interval(IntervalFn),
}

impl ForeignFn {
    /// Calling shape of this pointer
    pub fn abi(&self) -> ForeignAbi {
        match self {
            ForeignFn::IntBuffer(_) => ForeignAbi::IntBuffer,
            ForeignFn::Interval(_) => ForeignAbi::Interval,
        }
    }
}

/// A resolved foreign function and the library that keeps it valid
#[derive(Clone)]
pub struct ForeignSymbol {
    name: String,
    func: ForeignFn,
    _library: Option<Arc<Library>>,
}

impl ForeignSymbol {
    /// Wrap a function pointer that lives for the whole process
    ///
    /// # Safety
    ///
    /// `func` must honor the contract of its ABI. For [`ForeignFn::IntBuffer`]
    /// that means writing at most `n + 1` values to the buffer.
    pub unsafe fn from_fn(name: impl Into<String>, func: ForeignFn) -> Self {
        Self {
            name: name.into(),
            func,
            _library: None,
        }
    }

    /// Wrap a pointer resolved from `library`
    ///
    /// # Safety
    ///
    /// Same contract as [`from_fn`](Self::from_fn), and `func` must come from
    /// `library`.
    pub(crate) unsafe fn from_library(
        name: impl Into<String>,
        func: ForeignFn,
        library: Arc<Library>,
    ) -> Self {
        Self {
            name: name.into(),
            func,
            _library: Some(library),
        }
    }

    /// Exported symbol name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calling shape
    pub fn abi(&self) -> ForeignAbi {
        self.func.abi()
    }

    /// Marshal `args`, call the foreign function, and convert the result
    pub fn call(&self, args: &[Arg]) -> Result<Value, ImplError> {
        match self.func {
            ForeignFn::IntBuffer(f) => call_int_buffer(f, args),
            ForeignFn::Interval(f) => call_interval(f, args),
        }
    }
}

impl fmt::Debug for ForeignSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignSymbol")
            .field("name", &self.name)
            .field("abi", &self.abi())
            .field("owns_library", &self._library.is_some())
            .finish()
    }
}

fn c_int_arg(args: &[Arg], index: usize) -> Result<c_int, ImplError> {
    args.get(index)
        .and_then(Arg::as_int)
        .and_then(|v| c_int::try_from(v).ok())
        .ok_or(ImplError::InvalidArg {
            index,
            expected: "an integer within C int range",
        })
}

fn call_int_buffer(f: IntBufferFn, args: &[Arg]) -> Result<Value, ImplError> {
    check_arity(args, 1)?;
    let n = c_int_arg(args, 0)?;
    let capacity = usize::try_from(n).map_err(|_| ImplError::InvalidArg {
        index: 0,
        expected: "a non-negative integer",
    })? + 1;

    let mut buffer: Vec<c_int> = vec![0; capacity];
    // SAFETY: buffer holds n + 1 ints, the most the callee may write.
    let count = unsafe { f(n, buffer.as_mut_ptr()) };

    let count = usize::try_from(count).map_err(|_| ImplError::Foreign(i64::from(count)))?;
    if count > capacity {
        return Err(ImplError::Failed(format!(
            "foreign call reported {count} values for a buffer of {capacity}"
        )));
    }

    buffer.truncate(count);
    Ok(Value::Sequence(buffer.into_iter().map(i64::from).collect()))
}

fn call_interval(f: IntervalFn, args: &[Arg]) -> Result<Value, ImplError> {
    check_arity(args, 3)?;
    let a = float_arg(args, 0)?;
    let b = float_arg(args, 1)?;
    let n = c_int_arg(args, 2)?;
    // SAFETY: plain scalar arguments.
    let result = unsafe { f(a, b, n) };
    Ok(Value::Scalar(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe extern "C" fn evens(n: c_int, out: *mut c_int) -> c_int {
        let mut count = 0;
        for v in (0..=n).filter(|v| v % 2 == 0) {
            unsafe { *out.add(count as usize) = v };
            count += 1;
        }
        count
    }

    unsafe extern "C" fn failing(_: c_int, _: *mut c_int) -> c_int {
        -3
    }

    unsafe extern "C" fn width(a: c_double, b: c_double, n: c_int) -> c_double {
        (b - a) * f64::from(n)
    }

    #[test]
    fn test_abi_for_signature() {
        let sieve = Signature::new([CType::Int, CType::IntBuffer], CType::Int);
        let trap = Signature::new([CType::Double, CType::Double, CType::Int], CType::Double);
        let odd = Signature::new([CType::Double], CType::Int);

        assert_eq!(ForeignAbi::for_signature(&sieve), Some(ForeignAbi::IntBuffer));
        assert_eq!(ForeignAbi::for_signature(&trap), Some(ForeignAbi::Interval));
        assert_eq!(ForeignAbi::for_signature(&odd), None);
    }

    #[test]
    fn test_int_buffer_call() {
        let sym = unsafe { ForeignSymbol::from_fn("evens", ForeignFn::IntBuffer(evens)) };
        assert_eq!(
            sym.call(&[Arg::Int(6)]),
            Ok(Value::Sequence(vec![0, 2, 4, 6]))
        );
        assert_eq!(sym.call(&[Arg::Int(0)]), Ok(Value::Sequence(vec![0])));
    }

    #[test]
    fn test_int_buffer_rejects_bad_input() {
        let sym = unsafe { ForeignSymbol::from_fn("evens", ForeignFn::IntBuffer(evens)) };
        assert!(matches!(
            sym.call(&[Arg::Int(-1)]),
            Err(ImplError::InvalidArg { index: 0, .. })
        ));
        assert!(sym.call(&[Arg::Int(i64::MAX)]).is_err());
        assert!(matches!(sym.call(&[]), Err(ImplError::Arity { .. })));
    }

    #[test]
    fn test_negative_count_is_foreign_error() {
        let sym = unsafe { ForeignSymbol::from_fn("failing", ForeignFn::IntBuffer(failing)) };
        assert_eq!(sym.call(&[Arg::Int(5)]), Err(ImplError::Foreign(-3)));
    }

    #[test]
    fn test_interval_call() {
        let sym = unsafe { ForeignSymbol::from_fn("width", ForeignFn::Interval(width)) };
        assert_eq!(
            sym.call(&[Arg::Float(1.0), Arg::Float(3.0), Arg::Int(4)]),
            Ok(Value::Scalar(8.0))
        );
        assert!(sym.call(&[Arg::Int(4)]).is_err());
    }
}
