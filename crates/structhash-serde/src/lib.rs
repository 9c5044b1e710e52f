#![forbid(unsafe_code)]
//! structhash-serde: structural digests of any `Serialize` type.
//!
//! The serializer in [`ser`] builds a [`Value`] tree from the serde data
//! model; hashing then goes through the same traversal as hand-built values.
//! A derived struct therefore digests exactly like the equivalent
//! `Value::Record`.
//!
//! Serde reports sets through `serialize_seq`, the same call sequences use,
//! so a set becomes a `List` in its iteration order. `MapOrder::Sorted`
//! reorders maps only. A `HashSet` therefore digests differently from run
//! to run; hash a `BTreeSet` (or sort first) when the digest must be stable.

pub mod error;
pub mod ser;

use serde::Serialize;
use structhash_core::{Digest128, Digest64, DigestConfig, Sink, Value};

pub use error::{Error, Result};
pub use ser::ValueSerializer;

/// Convert `value` into a [`Value`] tree with no depth limit.
pub fn to_value<T: ?Sized + Serialize>(value: &T) -> Result<Value> {
    value.serialize(ValueSerializer::new())
}

/// Convert `value`, honouring `config.max_depth`.
pub fn to_value_with<T: ?Sized + Serialize>(value: &T, config: &DigestConfig) -> Result<Value> {
    value.serialize(ValueSerializer::with_max_depth(config.max_depth))
}

pub fn digest64<T: ?Sized + Serialize>(value: &T) -> Result<Digest64> {
    Ok(structhash_core::digest64(&to_value(value)?))
}

pub fn digest128<T: ?Sized + Serialize>(value: &T) -> Result<Digest128> {
    Ok(structhash_core::digest128(&to_value(value)?))
}

pub fn digest_with<T: ?Sized + Serialize, S: Sink>(value: &T, sink: S) -> Result<Vec<u8>> {
    Ok(structhash_core::digest_with(&to_value(value)?, sink))
}

/// Serde-facing counterpart of [`structhash_core::Hasher`].
#[derive(Debug, Clone, Default)]
pub struct Hasher {
    inner: structhash_core::Hasher,
}

impl Hasher {
    pub fn new(config: DigestConfig) -> Self {
        Self {
            inner: structhash_core::Hasher::new(config),
        }
    }

    pub fn from_env() -> Self {
        Self {
            inner: structhash_core::Hasher::from_env(),
        }
    }

    pub fn config(&self) -> &DigestConfig {
        self.inner.config()
    }

    pub fn to_value<T: ?Sized + Serialize>(&self, value: &T) -> Result<Value> {
        let v = to_value_with(value, self.inner.config())?;
        #[cfg(feature = "tracing")]
        tracing::trace!(kind = v.kind_name(), "serialized value for hashing");
        Ok(v)
    }

    pub fn digest64<T: ?Sized + Serialize>(&self, value: &T) -> Result<Digest64> {
        Ok(self.inner.digest64(&self.to_value(value)?)?)
    }

    pub fn digest128<T: ?Sized + Serialize>(&self, value: &T) -> Result<Digest128> {
        Ok(self.inner.digest128(&self.to_value(value)?)?)
    }

    pub fn digest_with<T: ?Sized + Serialize, S: Sink>(&self, value: &T, sink: S) -> Result<Vec<u8>> {
        Ok(self.inner.digest_with(&self.to_value(value)?, sink)?)
    }

    pub fn canonical_bytes<T: ?Sized + Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        Ok(self.inner.canonical_bytes(&self.to_value(value)?)?)
    }
}
