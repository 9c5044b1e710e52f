//! Digest entry points and fixed-width digest types.
//!
//! The free functions use the default [`DigestConfig`] (sorted maps,
//! lenient, unbounded depth) and cannot fail. [`Hasher`] carries an explicit
//! config and reports strict-mode violations as errors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::DigestConfig;
use crate::error::Result;
use crate::sink::{Sink, Xxh128Sink, Xxh64Sink};
use crate::traverse::{canonical_bytes_with, traverse_with, TraversalStats};
use crate::value::Value;

macro_rules! fixed_digest {
    ($name:ident, $len:expr, $int:ty) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }

            /// Build from a sink's output; `None` if the width is wrong.
            pub fn from_slice(bytes: &[u8]) -> Option<Self> {
                <[u8; $len]>::try_from(bytes).ok().map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl From<$name> for $int {
            fn from(d: $name) -> $int {
                <$int>::from_be_bytes(d.0)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }
    };
}

fixed_digest!(Digest64, 8, u64);
fixed_digest!(Digest128, 16, u128);

/// 64-bit XXH64 digest of `value`.
pub fn digest64(value: &Value) -> Digest64 {
    let mut sink = Xxh64Sink::new();
    traverse_with(value, &mut sink, &DigestConfig::default());
    Digest64(sink.finish_u64().to_be_bytes())
}

/// 128-bit XXH3 digest of `value`, high half first.
pub fn digest128(value: &Value) -> Digest128 {
    let mut sink = Xxh128Sink::new();
    traverse_with(value, &mut sink, &DigestConfig::default());
    Digest128(sink.finish_u128().to_be_bytes())
}

/// Digest `value` with a caller-supplied sink and return exactly
/// `sink.output_width()` bytes.
///
/// The sink must be fresh: state it already holds becomes part of the digest.
pub fn digest_with<S: Sink>(value: &Value, mut sink: S) -> Vec<u8> {
    traverse_with(value, &mut sink, &DigestConfig::default());
    sink.finalize()
}

/// The canonical byte stream of `value` under the default config.
pub fn canonical_bytes(value: &Value) -> Vec<u8> {
    canonical_bytes_with(value, &DigestConfig::default()).0
}

/// Entry points bound to an explicit [`DigestConfig`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hasher {
    config: DigestConfig,
}

impl Hasher {
    pub fn new(config: DigestConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(DigestConfig::from_env())
    }

    pub fn config(&self) -> &DigestConfig {
        &self.config
    }

    pub fn digest64(&self, value: &Value) -> Result<Digest64> {
        let mut sink = Xxh64Sink::new();
        self.run(value, &mut sink)?;
        Ok(Digest64(sink.finish_u64().to_be_bytes()))
    }

    pub fn digest128(&self, value: &Value) -> Result<Digest128> {
        let mut sink = Xxh128Sink::new();
        self.run(value, &mut sink)?;
        Ok(Digest128(sink.finish_u128().to_be_bytes()))
    }

    pub fn digest_with<S: Sink>(&self, value: &Value, mut sink: S) -> Result<Vec<u8>> {
        self.run(value, &mut sink)?;
        Ok(sink.finalize())
    }

    pub fn canonical_bytes(&self, value: &Value) -> Result<Vec<u8>> {
        let (bytes, stats) = canonical_bytes_with(value, &self.config);
        stats.check(&self.config)?;
        Ok(bytes)
    }

    /// Feed `value` into a sink the caller keeps ownership of.
    pub fn feed<S: Sink + ?Sized>(&self, value: &Value, sink: &mut S) -> Result<TraversalStats> {
        self.run(value, sink)
    }

    fn run<S: Sink + ?Sized>(&self, value: &Value, sink: &mut S) -> Result<TraversalStats> {
        let stats = traverse_with(value, sink, &self.config).check(&self.config)?;
        #[cfg(feature = "tracing")]
        tracing::trace!(
            leaves = stats.leaves,
            bytes = stats.bytes,
            width = sink.output_width(),
            "value digested"
        );
        Ok(stats)
    }
}
