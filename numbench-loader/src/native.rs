//! In-process implementations registered by name

use numbench_core::{Arg, ImplError, Value};
use std::collections::HashMap;
use std::fmt;

/// Function pointer honoring the uniform calling convention
pub type NativeFn = fn(&[Arg]) -> Result<Value, ImplError>;

/// Name → in-process function lookup
#[derive(Clone, Default)]
pub struct NativeRegistry {
    functions: HashMap<String, NativeFn>,
}

impl NativeRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `f` under `name`, replacing any previous entry
    pub fn register(&mut self, name: impl Into<String>, f: NativeFn) {
        self.functions.insert(name.into(), f);
    }

    /// Builder form of [`register`](Self::register)
    pub fn with(mut self, name: impl Into<String>, f: NativeFn) -> Self {
        self.register(name, f);
        self
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<NativeFn> {
        self.functions.get(name).copied()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, NativeFn)> for NativeRegistry {
    fn from_iter<I: IntoIterator<Item = (S, NativeFn)>>(iter: I) -> Self {
        let mut registry = Self::new();
        for (name, f) in iter {
            registry.register(name, f);
        }
        registry
    }
}

impl fmt::Debug for NativeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeRegistry")
            .field("functions", &self.names())
            .finish()
    }
}
