//! Shared-library file naming per target platform

use std::fmt;

/// Target platform family for library naming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Linux and other Unix-likes: `.so`
    Unix,
    /// macOS: `.dylib`
    MacOs,
    /// Windows: `.dll`
    Windows,
}

impl Platform {
    /// Platform this binary was compiled for
    pub const fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }

    /// Dynamic library file extension, including the dot
    pub fn library_suffix(self) -> &'static str {
        match self {
            Platform::Unix => ".so",
            Platform::MacOs => ".dylib",
            Platform::Windows => ".dll",
        }
    }

    /// Library file name for `base` on this platform
    pub fn library_filename(self, base: &str) -> String {
        format!("{base}{}", self.library_suffix())
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Unix => "unix",
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
        };
        f.write_str(name)
    }
}
