use thiserror::Error;

use crate::value::UnsupportedKind;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Only raised in strict mode; the lenient traversal skips these silently.
    #[error("unsupported value kind '{kind}' encountered ({count} value(s) skipped)")]
    Unsupported { kind: UnsupportedKind, count: usize },

    #[error("value nesting exceeds max depth {limit}")]
    DepthExceeded { limit: usize },
}
