//! Implementation Languages
//!
//! Each language knows its report label and, for foreign languages, how its
//! library files and exported symbols are named.

use numbench_core::REFERENCE_LABEL;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where an implementation comes from
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// In-process Rust functions (the reference)
    Native,
    /// C shared library
    C,
    /// C++ shared library
    Cpp,
    /// Rust cdylib
    Rust,
}

impl Language {
    /// Every supported language, reference first
    pub const ALL: [Language; 4] = [Language::Native, Language::C, Language::Cpp, Language::Rust];

    /// Configuration key
    pub fn key(self) -> &'static str {
        match self {
            Language::Native => "native",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Rust => "rust",
        }
    }

    /// Report label
    pub fn label(self) -> &'static str {
        match self {
            Language::Native => REFERENCE_LABEL,
            Language::C => "C",
            Language::Cpp => "C++",
            Language::Rust => "Rust",
        }
    }

    /// Whether implementations are loaded from a shared library
    pub fn is_foreign(self) -> bool {
        !matches!(self, Language::Native)
    }

    /// Library file name without platform suffix, e.g. `libsieve_cpp`
    pub fn library_base(self, algorithm: &str) -> Option<String> {
        match self {
            Language::Native => None,
            Language::C => Some(format!("lib{algorithm}")),
            Language::Cpp => Some(format!("lib{algorithm}_cpp")),
            Language::Rust => Some(format!("lib{algorithm}_rs")),
        }
    }

    /// Name of the function implementing `algorithm`
    ///
    /// The C sieve is exported as `sieve_c`; every other C symbol is the bare
    /// algorithm name.
    pub fn symbol_name(self, algorithm: &str) -> String {
        match self {
            Language::Native => format!("{algorithm}_native"),
            Language::C if algorithm == "sieve" => "sieve_c".to_string(),
            Language::C => algorithm.to_string(),
            Language::Cpp => format!("{algorithm}_cpp"),
            Language::Rust => format!("{algorithm}_rs"),
        }
    }

    /// Native lookup order: `{algorithm}_native`, then `{algorithm}`
    pub fn native_candidates(algorithm: &str) -> [String; 2] {
        [
            Language::Native.symbol_name(algorithm),
            algorithm.to_string(),
        ]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "native" => Ok(Language::Native),
            "c" => Ok(Language::C),
            "cpp" | "c++" => Ok(Language::Cpp),
            "rust" | "rs" => Ok(Language::Rust),
            other => Err(format!("Unknown language: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_bases() {
        assert_eq!(Language::C.library_base("sieve").as_deref(), Some("libsieve"));
        assert_eq!(
            Language::Cpp.library_base("trapezoid").as_deref(),
            Some("libtrapezoid_cpp")
        );
        assert_eq!(Language::Rust.library_base("sieve").as_deref(), Some("libsieve_rs"));
        assert_eq!(Language::Native.library_base("sieve"), None);
    }

    #[test]
    fn test_symbol_names() {
        assert_eq!(Language::C.symbol_name("sieve"), "sieve_c");
        assert_eq!(Language::C.symbol_name("trapezoid"), "trapezoid");
        assert_eq!(Language::Cpp.symbol_name("sieve"), "sieve_cpp");
        assert_eq!(Language::Rust.symbol_name("trapezoid"), "trapezoid_rs");
    }

    #[test]
    fn test_labels() {
        assert_eq!(Language::Native.label(), REFERENCE_LABEL);
        assert_eq!(Language::Cpp.label(), "C++");
    }

    #[test]
    fn test_parse() {
        assert_eq!("C++".parse::<Language>(), Ok(Language::Cpp));
        assert_eq!("rust".parse::<Language>(), Ok(Language::Rust));
        assert!("cobol".parse::<Language>().is_err());
    }
}
