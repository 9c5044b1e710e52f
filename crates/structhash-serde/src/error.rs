use std::fmt::Display;

use thiserror::Error;

/// Result type local to structhash-serde.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Raised by a `Serialize` impl through `serde::ser::Error::custom`.
    #[error("serialize error: {0}")]
    Custom(String),

    #[error(transparent)]
    Core(#[from] structhash_core::Error),
}

impl serde::ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}
