#![forbid(unsafe_code)]
//! structhash: deterministic structural digests of in-memory values.
//!
//! Umbrella crate over the workspace:
//! - `structhash-core`: the `Value` model, the canonical traversal, sinks
//!   and the `digest64` / `digest128` / `digest_with` entry points
//! - `structhash-serde`: the same entry points for any `Serialize` type,
//!   re-exported here as [`serde_adapter`]

pub use structhash_core::*;

pub use structhash_serde as serde_adapter;
