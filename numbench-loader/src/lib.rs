//! Numbench Implementation Loader
//!
//! Turns `(algorithm, language)` pairs into [`numbench_core::Implementation`]s:
//! in-process functions from a [`NativeRegistry`], foreign functions from
//! shared libraries resolved with `libloading`. Foreign calling conventions
//! (caller-allocated output buffers, fixed leading arguments) are adapted so
//! every result has the same call shape.

#![warn(missing_docs)]

mod foreign;
mod language;
mod loader;
mod native;
mod platform;
mod signature;

pub use foreign::{ForeignAbi, ForeignFn, ForeignSymbol, IntBufferFn, IntervalFn};
pub use language::Language;
pub use loader::{Binding, LoadError, Loader};
pub use native::{NativeFn, NativeRegistry};
pub use platform::Platform;
pub use signature::{CType, Signature, SignatureTable};
