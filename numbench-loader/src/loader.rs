//! Implementation Loader
//!
//! Resolves `(algorithm, language)` to a callable behind the uniform calling
//! convention. Every problem on the way (missing library, missing symbol,
//! unsupported signature, unknown native function) makes the implementation
//! absent rather than failing the run.

use crate::foreign::{ForeignAbi, ForeignFn, ForeignSymbol, IntBufferFn, IntervalFn};
use crate::language::Language;
use crate::native::{NativeFn, NativeRegistry};
use crate::platform::Platform;
use crate::signature::SignatureTable;
use libloading::Library;
use numbench_core::{Arg, ImplError, Implementation, Value};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Why an implementation could not be resolved
#[derive(Debug, Error)]
pub enum LoadError {
    /// No in-process function under any candidate name
    #[error("no native function named {}", .candidates.join(" or "))]
    UnknownNative {
        /// Names that were tried, in order
        candidates: Vec<String>,
    },

    /// No foreign signature declared for the algorithm
    #[error("no signature declared for algorithm '{0}'")]
    UnknownAlgorithm(String),

    /// The declared signature has no marshalling support
    #[error("unsupported signature for algorithm '{0}'")]
    UnsupportedSignature(String),

    /// Library file does not exist
    #[error("library not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Library exists but could not be opened
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        /// Library path
        path: PathBuf,
        /// Underlying loader error
        source: libloading::Error,
    },

    /// Library has no such exported symbol
    #[error("symbol '{symbol}' missing from {}: {source}", .path.display())]
    MissingSymbol {
        /// Symbol that was looked up
        symbol: String,
        /// Library path
        path: PathBuf,
        /// Underlying loader error
        source: libloading::Error,
    },
}

/// A resolved but not yet normalized function
#[derive(Clone)]
pub enum Binding {
    /// In-process function
    Native(NativeFn),
    /// Function from a shared library
    Foreign(ForeignSymbol),
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Native(_) => f.write_str("Binding::Native"),
            Binding::Foreign(symbol) => f.debug_tuple("Binding::Foreign").field(symbol).finish(),
        }
    }
}

impl Binding {
    /// Call with the full argument list
    pub fn call(&self, args: &[Arg]) -> Result<Value, ImplError> {
        match self {
            Binding::Native(f) => f(args),
            Binding::Foreign(symbol) => symbol.call(args),
        }
    }

    /// Wrap into an [`Implementation`], fixing `bound` as leading arguments
    ///
    /// With bound `[a, b]`, calling the result with `[n]` calls the binding
    /// with `[a, b, n]`.
    pub fn into_implementation(self, bound: Vec<Arg>) -> Implementation {
        if bound.is_empty() {
            return match self {
                Binding::Native(f) => Implementation::new(f),
                Binding::Foreign(symbol) => Implementation::new(move |args| symbol.call(args)),
            };
        }

        Implementation::new(move |args| {
            let mut full = Vec::with_capacity(bound.len() + args.len());
            full.extend_from_slice(&bound);
            full.extend_from_slice(args);
            self.call(&full)
        })
    }
}

/// Resolves implementations from the native registry and shared libraries
#[derive(Debug, Clone)]
pub struct Loader {
    root: PathBuf,
    dirs: HashMap<Language, PathBuf>,
    platform: Platform,
    signatures: SignatureTable,
    natives: NativeRegistry,
    bound_args: HashMap<String, Vec<Arg>>,
}

impl Loader {
    /// Loader over `natives` with the built-in signature table, libraries under `.`
    pub fn new(natives: NativeRegistry) -> Self {
        Self {
            root: PathBuf::from("."),
            dirs: HashMap::new(),
            platform: Platform::current(),
            signatures: SignatureTable::builtin(),
            natives,
            bound_args: HashMap::new(),
        }
    }

    /// Directory that per-language library directories are relative to
    pub fn with_library_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Library directory for `language` (relative to the root unless absolute)
    pub fn with_library_dir(mut self, language: Language, dir: impl Into<PathBuf>) -> Self {
        self.dirs.insert(language, dir.into());
        self
    }

    /// Platform used for library file names
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Replace the signature table
    pub fn with_signatures(mut self, signatures: SignatureTable) -> Self {
        self.signatures = signatures;
        self
    }

    /// Fix leading arguments for every implementation of `algorithm`
    pub fn with_bound_args(mut self, algorithm: impl Into<String>, args: Vec<Arg>) -> Self {
        self.bound_args.insert(algorithm.into(), args);
        self
    }

    /// Directory searched for `language`'s libraries
    pub fn library_dir(&self, language: Language) -> PathBuf {
        match self.dirs.get(&language) {
            Some(dir) => self.root.join(dir),
            None => self.root.join("native").join(language.key()),
        }
    }

    /// Expected library path for a foreign implementation
    pub fn library_path(&self, algorithm: &str, language: Language) -> Option<PathBuf> {
        let base = language.library_base(algorithm)?;
        Some(
            self.library_dir(language)
                .join(self.platform.library_filename(&base)),
        )
    }

    /// Resolve without normalizing
    pub fn resolve(&self, algorithm: &str, language: Language) -> Result<Binding, LoadError> {
        if language.is_foreign() {
            self.resolve_foreign(algorithm, language)
        } else {
            self.resolve_native(algorithm)
        }
    }

    /// Load `algorithm` in `language`, or `None` if it is unavailable
    pub fn load(&self, algorithm: &str, language: Language) -> Option<Implementation> {
        tracing::debug!(algorithm, language = %language, "Loading implementation");

        match self.resolve(algorithm, language) {
            Ok(binding) => {
                let bound = self.bound_args.get(algorithm).cloned().unwrap_or_default();
                Some(binding.into_implementation(bound))
            }
            Err(e) => {
                tracing::info!(
                    algorithm,
                    language = %language,
                    reason = %e,
                    "Implementation unavailable"
                );
                None
            }
        }
    }

    /// Load every available language, returning `(label, implementation)` in language order
    pub fn load_all(
        &self,
        algorithm: &str,
        languages: &[Language],
    ) -> Vec<(String, Implementation)> {
        languages
            .iter()
            .filter_map(|&language| {
                self.load(algorithm, language)
                    .map(|imp| (language.label().to_string(), imp))
            })
            .collect()
    }

    fn resolve_native(&self, algorithm: &str) -> Result<Binding, LoadError> {
        let candidates = Language::native_candidates(algorithm);
        candidates
            .iter()
            .find_map(|name| self.natives.get(name))
            .map(Binding::Native)
            .ok_or_else(|| LoadError::UnknownNative {
                candidates: candidates.to_vec(),
            })
    }

    fn resolve_foreign(&self, algorithm: &str, language: Language) -> Result<Binding, LoadError> {
        let signature = self
            .signatures
            .get(algorithm)
            .ok_or_else(|| LoadError::UnknownAlgorithm(algorithm.to_string()))?;
        let abi = ForeignAbi::for_signature(signature)
            .ok_or_else(|| LoadError::UnsupportedSignature(algorithm.to_string()))?;

        let path = self
            .library_path(algorithm, language)
            .ok_or_else(|| LoadError::UnknownAlgorithm(algorithm.to_string()))?;
        if !path.is_file() {
            return Err(LoadError::NotFound(path));
        }

        // SAFETY: opening a library runs its initializers; the library
        // directories are trusted build outputs.
        let library = unsafe { Library::new(&path) }.map_err(|source| LoadError::Open {
            path: path.clone(),
            source,
        })?;

        let symbol = language.symbol_name(algorithm);
        // SAFETY: the pointer type comes from the declared signature.
        let func = unsafe { lookup(&library, &symbol, abi) }.map_err(|source| {
            LoadError::MissingSymbol {
                symbol: symbol.clone(),
                path: path.clone(),
                source,
            }
        })?;

        tracing::debug!(symbol = %symbol, path = %path.display(), "Resolved foreign symbol");

        // SAFETY: `func` was resolved from `library`, which the symbol keeps alive.
        let symbol = unsafe { ForeignSymbol::from_library(symbol, func, Arc::new(library)) };
        Ok(Binding::Foreign(symbol))
    }
}

/// # Safety
///
/// The symbol named `name` must have the C type described by `abi`.
unsafe fn lookup(
    library: &Library,
    name: &str,
    abi: ForeignAbi,
) -> Result<ForeignFn, libloading::Error> {
    let symbol = name.as_bytes();
    let func = unsafe {
        match abi {
            ForeignAbi::IntBuffer => ForeignFn::IntBuffer(*library.get::<IntBufferFn>(symbol)?),
            ForeignAbi::Interval => ForeignFn::Interval(*library.get::<IntervalFn>(symbol)?),
        }
    };
    Ok(func)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{CType, Signature};
    use numbench_core::{check_arity, float_arg, size_arg};

    fn count_up(args: &[Arg]) -> Result<Value, ImplError> {
        check_arity(args, 1)?;
        let n = size_arg(args, 0)? as i64;
        Ok(Value::Sequence((1..=n).collect()))
    }

    fn width(args: &[Arg]) -> Result<Value, ImplError> {
        check_arity(args, 3)?;
        let (a, b, n) = (float_arg(args, 0)?, float_arg(args, 1)?, size_arg(args, 2)?);
        Ok(Value::Scalar((b - a) * n as f64))
    }

    fn natives() -> NativeRegistry {
        NativeRegistry::new()
            .with("count_native", count_up)
            .with("width", width)
    }

    #[test]
    fn test_native_prefers_language_suffix() {
        let registry = natives().with("count", |_| Ok(Value::Sequence(vec![])));
        let loader = Loader::new(registry);
        let imp = loader.load("count", Language::Native).unwrap();
        assert_eq!(imp.call(&[Arg::Int(3)]), Ok(Value::Sequence(vec![1, 2, 3])));
    }

    #[test]
    fn test_native_falls_back_to_bare_name() {
        let loader = Loader::new(natives());
        assert!(matches!(
            loader.resolve("width", Language::Native),
            Ok(Binding::Native(_))
        ));
    }

    #[test]
    fn test_unknown_native_is_absent() {
        let loader = Loader::new(natives());
        assert!(loader.load("fft", Language::Native).is_none());
        let Err(LoadError::UnknownNative { candidates }) = loader.resolve("fft", Language::Native)
        else {
            panic!("expected an unknown native error");
        };
        assert_eq!(candidates, vec!["fft_native".to_string(), "fft".to_string()]);
    }

    #[test]
    fn test_bound_args_are_prepended() {
        let loader = Loader::new(natives())
            .with_bound_args("width", vec![Arg::Float(1.0), Arg::Float(3.0)]);
        let imp = loader.load("width", Language::Native).unwrap();
        assert_eq!(imp.call(&[Arg::Int(4)]), Ok(Value::Scalar(8.0)));
    }

    #[test]
    fn test_library_paths() {
        let loader = Loader::new(natives())
            .with_library_root("/opt/bench")
            .with_library_dir(Language::Rust, "target/release")
            .with_platform(Platform::Unix);

        assert_eq!(
            loader.library_path("sieve", Language::C),
            Some(PathBuf::from("/opt/bench/native/c/libsieve.so"))
        );
        assert_eq!(
            loader.library_path("sieve", Language::Rust),
            Some(PathBuf::from("/opt/bench/target/release/libsieve_rs.so"))
        );
        assert_eq!(loader.library_path("sieve", Language::Native), None);

        let windows = loader.with_platform(Platform::Windows);
        assert_eq!(
            windows.library_path("trapezoid", Language::Cpp),
            Some(PathBuf::from("/opt/bench/native/cpp/libtrapezoid_cpp.dll"))
        );
    }

    #[test]
    fn test_missing_library_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let loader = Loader::new(natives()).with_library_root(dir.path());

        assert!(loader.load("sieve", Language::C).is_none());
        assert!(matches!(
            loader.resolve("sieve", Language::Cpp),
            Err(LoadError::NotFound(_))
        ));
    }

    #[test]
    fn test_corrupt_library_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let loader = Loader::new(natives()).with_library_root(dir.path());
        let path = loader.library_path("sieve", Language::Rust).unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"not a shared library").unwrap();

        assert!(matches!(
            loader.resolve("sieve", Language::Rust),
            Err(LoadError::Open { .. })
        ));
        assert!(loader.load("sieve", Language::Rust).is_none());
    }

    #[test]
    fn test_unsupported_signature_is_absent() {
        let mut signatures = SignatureTable::builtin();
        signatures.insert("fft", Signature::new([CType::IntBuffer], CType::Double));
        let loader = Loader::new(natives()).with_signatures(signatures);

        assert!(matches!(
            loader.resolve("fft", Language::C),
            Err(LoadError::UnsupportedSignature(_))
        ));
        assert!(matches!(
            loader.resolve("nope", Language::C),
            Err(LoadError::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn test_load_all_keeps_language_order() {
        let dir = tempfile::tempdir().unwrap();
        let loader = Loader::new(natives()).with_library_root(dir.path());
        let loaded = loader.load_all("count", &Language::ALL);

        let labels: Vec<&str> = loaded.iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(labels, vec!["Native"]);
    }

    #[test]
    fn test_foreign_binding_with_bound_args() {
        unsafe extern "C" fn span(a: f64, b: f64, n: std::ffi::c_int) -> f64 {
            (b - a) / f64::from(n)
        }
        let symbol = unsafe { ForeignSymbol::from_fn("span", ForeignFn::Interval(span)) };
        let imp = Binding::Foreign(symbol)
            .into_implementation(vec![Arg::Float(0.0), Arg::Float(1.0)]);
        assert_eq!(imp.call(&[Arg::Int(4)]), Ok(Value::Scalar(0.25)));
    }
}
