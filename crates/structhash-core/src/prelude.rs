//! Convenient re-exports for downstream crates.

pub use crate::config::{DigestConfig, MapOrder};
pub use crate::digest::{digest128, digest64, digest_with, Digest128, Digest64, Hasher};
pub use crate::error::{Error, Result};
pub use crate::sink::{Sink, Xxh128Sink, Xxh64Sink};
pub use crate::value::{Field, Value};
