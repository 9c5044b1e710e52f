#![forbid(unsafe_code)]
//! structhash-core: canonical value model, structural traversal, and digests.
//!
//! A [`Value`] tree is walked depth-first and the canonical bytes of its
//! leaves are streamed into a [`Sink`]. Two structurally equal values always
//! produce the same stream, whatever process, allocator or host byte order
//! built them.
//!
//! No I/O and no reflection live here. Producers of `Value`s (the serde
//! adapter, the CLI) sit in their own crates.

pub mod config;
pub mod digest;
pub mod error;
pub mod prelude;
pub mod sink;
pub mod traverse;
pub mod value;

pub use config::{DigestConfig, MapOrder};
pub use digest::{canonical_bytes, digest128, digest64, digest_with, Digest128, Digest64, Hasher};
pub use error::{Error, Result};
pub use sink::{Blake3Sink, CaptureSink, DigestSink, Sink, Xxh128Sink, Xxh64Sink};
pub use traverse::{traverse, traverse_with, TraversalStats};
pub use value::{Field, UnsupportedKind, Value};

/// Crate version, for provenance in stored digests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
