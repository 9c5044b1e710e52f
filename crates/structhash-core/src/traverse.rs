//! Canonical traversal engine.
//!
//! Walks a [`Value`] depth-first and feeds the sink the canonical bytes of
//! every leaf:
//!
//! - bool: one byte, `0x01` / `0x00`
//! - int / uint: 8 bytes big-endian (sign- or zero-extended to 64 bits)
//! - float: the f64 bit pattern, 8 bytes big-endian
//! - complex: real then imaginary, 16 bytes
//! - text: raw UTF-8, no length prefix
//! - bytes: every byte as an 8-byte uint
//! - array / list / record: children in order, no prefix or separator
//! - map: key then value per pair, ordered by [`MapOrder`]
//! - indirect: nothing when absent, otherwise the target once
//! - unsupported: nothing
//!
//! There is no framing, so the stream is not injective across boundaries:
//! `["ab", "c"]` and `"abc"` produce the same bytes. Callers that need
//! injectivity must frame ambiguous data before hashing.
//!
//! The traversal never fails. What it skipped is reported in
//! [`TraversalStats`], which strict callers turn into errors.

use crate::config::{DigestConfig, MapOrder};
use crate::error::{Error, Result};
use crate::sink::{CaptureSink, Sink};
use crate::value::{UnsupportedKind, Value};

/// Width of the per-traversal scratch buffer; fits the widest leaf (complex).
pub const SCRATCH_LEN: usize = 16;

/// What a traversal fed to its sink and what it left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Primitive leaves written.
    pub leaves: usize,
    /// Total bytes fed to the sink.
    pub bytes: usize,
    /// Unsupported values skipped.
    pub unsupported: usize,
    pub first_unsupported: Option<UnsupportedKind>,
    /// Subtrees cut off at `max_depth`.
    pub truncated: usize,
}

impl TraversalStats {
    /// True when every reachable value made it into the stream.
    pub fn is_complete(&self) -> bool {
        self.unsupported == 0 && self.truncated == 0
    }

    /// Apply the strictness policy of `config`.
    pub fn check(self, config: &DigestConfig) -> Result<Self> {
        if self.truncated > 0 {
            if let Some(limit) = config.max_depth {
                if config.strict {
                    return Err(Error::DepthExceeded { limit });
                }
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    limit,
                    truncated = self.truncated,
                    "value nesting exceeded max depth; deeper values were not hashed"
                );
            }
        }
        if config.strict {
            if let Some(kind) = self.first_unsupported {
                return Err(Error::Unsupported {
                    kind,
                    count: self.unsupported,
                });
            }
        }
        Ok(self)
    }

    fn merge(&mut self, other: TraversalStats) {
        self.leaves += other.leaves;
        self.bytes += other.bytes;
        self.unsupported += other.unsupported;
        self.truncated += other.truncated;
        if self.first_unsupported.is_none() {
            self.first_unsupported = other.first_unsupported;
        }
    }
}

/// Traverse `value` with the default configuration.
pub fn traverse<S: Sink + ?Sized>(value: &Value, sink: &mut S) -> TraversalStats {
    traverse_with(value, sink, &DigestConfig::default())
}

pub fn traverse_with<S: Sink + ?Sized>(
    value: &Value,
    sink: &mut S,
    config: &DigestConfig,
) -> TraversalStats {
    let mut enc = Encoder::new(sink, config);
    enc.value(value, 0);
    enc.finish()
}

/// The exact byte stream `traverse_with` would feed a sink.
pub fn canonical_bytes_with(value: &Value, config: &DigestConfig) -> (Vec<u8>, TraversalStats) {
    let mut capture = CaptureSink::new();
    let stats = traverse_with(value, &mut capture, config);
    (capture.into_inner(), stats)
}

struct Encoder<'a, S: Sink + ?Sized> {
    sink: &'a mut S,
    config: &'a DigestConfig,
    scratch: [u8; SCRATCH_LEN],
    stats: TraversalStats,
}

impl<'a, S: Sink + ?Sized> Encoder<'a, S> {
    fn new(sink: &'a mut S, config: &'a DigestConfig) -> Self {
        Self {
            sink,
            config,
            scratch: [0u8; SCRATCH_LEN],
            stats: TraversalStats::default(),
        }
    }

    fn finish(self) -> TraversalStats {
        self.stats
    }

    fn value(&mut self, v: &Value, depth: usize) {
        if self.exceeds_limit(depth) {
            self.stats.truncated += 1;
            return;
        }

        match v {
            Value::Bool(b) => {
                self.scratch[0] = u8::from(*b);
                self.emit_scratch(1);
            }
            Value::Int(i) => self.put_u64(*i as u64),
            Value::Uint(u) => self.put_u64(*u),
            Value::Float(f) => self.put_u64(f.to_bits()),
            Value::Complex { re, im } => {
                self.scratch[..8].copy_from_slice(&re.to_bits().to_be_bytes());
                self.scratch[8..16].copy_from_slice(&im.to_bits().to_be_bytes());
                self.emit_scratch(16);
            }
            Value::Text(s) => self.emit_raw(s.as_bytes()),
            Value::Bytes(bytes) => {
                // Each byte sits one level down, like a list element.
                if self.exceeds_limit(depth + 1) {
                    self.stats.truncated += bytes.len();
                    return;
                }
                for &b in bytes {
                    self.put_u64(u64::from(b));
                }
            }
            Value::Array(items) | Value::List(items) => {
                for item in items {
                    self.value(item, depth + 1);
                }
            }
            Value::Record { fields, .. } => {
                for field in fields {
                    self.value(&field.value, depth + 1);
                }
            }
            Value::Map(pairs) => self.map(pairs, depth),
            Value::Indirect(Some(inner)) => self.value(inner, depth + 1),
            Value::Indirect(None) => {}
            Value::Unsupported(kind) => {
                self.stats.unsupported += 1;
                self.stats.first_unsupported.get_or_insert(*kind);
                #[cfg(feature = "tracing")]
                tracing::debug!(kind = %kind, depth, "skipping unsupported value");
            }
        }
    }

    fn exceeds_limit(&self, depth: usize) -> bool {
        self.config.max_depth.is_some_and(|limit| depth > limit)
    }

    fn map(&mut self, pairs: &[(Value, Value)], depth: usize) {
        match self.config.map_order {
            MapOrder::Iteration => {
                for (k, v) in pairs {
                    self.value(k, depth + 1);
                    self.value(v, depth + 1);
                }
            }
            MapOrder::Sorted => {
                let mut encoded: Vec<Detached> = pairs
                    .iter()
                    .map(|(k, v)| Detached::pair(self.config, k, v, depth + 1))
                    .collect();
                // Ties on key bytes are possible (no framing); the value bytes
                // and then the skipped kinds settle them so the order is total.
                encoded.sort_unstable_by(|a, b| a.sort_key().cmp(&b.sort_key()));
                for pair in encoded {
                    self.sink.update(&pair.key);
                    self.sink.update(&pair.value);
                    // Merged in sorted order so strict-mode errors do not
                    // depend on the input order.
                    self.stats.merge(pair.stats);
                }
            }
        }
    }

    fn put_u64(&mut self, n: u64) {
        self.scratch[..8].copy_from_slice(&n.to_be_bytes());
        self.emit_scratch(8);
    }

    fn emit_scratch(&mut self, len: usize) {
        self.sink.update(&self.scratch[..len]);
        self.stats.leaves += 1;
        self.stats.bytes += len;
    }

    fn emit_raw(&mut self, bytes: &[u8]) {
        self.sink.update(bytes);
        self.stats.leaves += 1;
        self.stats.bytes += bytes.len();
    }
}

/// One map entry encoded into its own buffers, with what the encoding
/// skipped. Entries are merged into the parent only after sorting.
struct Detached {
    key: Vec<u8>,
    value: Vec<u8>,
    stats: TraversalStats,
}

impl Detached {
    fn pair(config: &DigestConfig, key: &Value, value: &Value, depth: usize) -> Self {
        let (key, key_stats) = Self::encode(config, key, depth);
        let (value, value_stats) = Self::encode(config, value, depth);
        let mut stats = key_stats;
        stats.merge(value_stats);
        Self { key, value, stats }
    }

    fn encode(config: &DigestConfig, v: &Value, depth: usize) -> (Vec<u8>, TraversalStats) {
        let mut capture = CaptureSink::new();
        let stats = {
            let mut sub = Encoder::new(&mut capture, config);
            sub.value(v, depth);
            sub.finish()
        };
        (capture.into_inner(), stats)
    }

    fn sort_key(&self) -> (&[u8], &[u8], Option<UnsupportedKind>) {
        (&self.key, &self.value, self.stats.first_unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Field;

    fn bytes_of(v: &Value) -> Vec<u8> {
        canonical_bytes_with(v, &DigestConfig::default()).0
    }

    #[test]
    fn leaves_encode_big_endian() {
        assert_eq!(bytes_of(&Value::Bool(true)), vec![1]);
        assert_eq!(bytes_of(&Value::Bool(false)), vec![0]);
        assert_eq!(bytes_of(&Value::Int(1)), 1u64.to_be_bytes().to_vec());
        assert_eq!(bytes_of(&Value::Int(-1)), vec![0xff; 8]);
        assert_eq!(bytes_of(&Value::Uint(258)), vec![0, 0, 0, 0, 0, 0, 1, 2]);
        assert_eq!(
            bytes_of(&Value::Float(1.0)),
            1.0f64.to_bits().to_be_bytes().to_vec()
        );
    }

    #[test]
    fn float32_widens_before_encoding() {
        assert_eq!(
            bytes_of(&Value::from(0.1f32)),
            f64::from(0.1f32).to_bits().to_be_bytes().to_vec()
        );
    }

    #[test]
    fn complex_is_real_then_imaginary() {
        let mut expected = 1.5f64.to_bits().to_be_bytes().to_vec();
        expected.extend_from_slice(&(-2.0f64).to_bits().to_be_bytes());
        assert_eq!(bytes_of(&Value::complex(1.5, -2.0)), expected);
    }

    #[test]
    fn bytes_hash_like_a_list_of_uints() {
        let as_bytes = bytes_of(&Value::bytes(vec![1u8, 255]));
        let as_list = bytes_of(&Value::list([1u64, 255]));
        assert_eq!(as_bytes, as_list);
        assert_eq!(as_bytes.len(), 16);
    }

    #[test]
    fn sequences_concatenate_without_framing() {
        assert_eq!(bytes_of(&Value::list(["ab", "c"])), b"abc".to_vec());
        assert!(bytes_of(&Value::List(vec![])).is_empty());
    }

    #[test]
    fn record_ignores_field_names() {
        let a = Value::record("A", [Field::new("x", 1i32), Field::new("y", "z")]);
        let b = Value::record("B", [Field::new("p", 1i32), Field::new("q", "z")]);
        assert_eq!(bytes_of(&a), bytes_of(&b));
    }

    #[test]
    fn absent_and_unsupported_contribute_nothing() {
        let v = Value::list([
            Value::none(),
            Value::Unsupported(UnsupportedKind::Callable),
            Value::some(true),
        ]);
        let (bytes, stats) = canonical_bytes_with(&v, &DigestConfig::default());
        assert_eq!(bytes, vec![1]);
        assert_eq!(stats.unsupported, 1);
        assert_eq!(stats.first_unsupported, Some(UnsupportedKind::Callable));
        assert_eq!(stats.leaves, 1);
    }

    #[test]
    fn iteration_order_feeds_pairs_as_given() {
        let cfg = DigestConfig::default().with_map_order(MapOrder::Iteration);
        let v = Value::map([("b", 2u8), ("a", 1u8)]);
        let mut expected = b"b".to_vec();
        expected.extend_from_slice(&2u64.to_be_bytes());
        expected.extend_from_slice(b"a");
        expected.extend_from_slice(&1u64.to_be_bytes());
        assert_eq!(canonical_bytes_with(&v, &cfg).0, expected);
    }

    #[test]
    fn sorted_order_is_independent_of_insertion() {
        let a = Value::map([("b", 2u8), ("a", 1u8), ("c", 3u8)]);
        let b = Value::map([("c", 3u8), ("a", 1u8), ("b", 2u8)]);
        let bytes = bytes_of(&a);
        assert_eq!(bytes, bytes_of(&b));
        assert_eq!(&bytes[..1], b"a");
    }

    #[test]
    fn sorted_map_breaks_key_ties_on_value_bytes() {
        // Both keys encode to "x".
        let a = Value::map([(Value::list(["x"]), 2u8), (Value::from("x"), 1u8)]);
        let b = Value::map([(Value::from("x"), 1u8), (Value::list(["x"]), 2u8)]);
        assert_eq!(bytes_of(&a), bytes_of(&b));
    }

    #[test]
    fn sorted_map_stats_count_each_byte_once() {
        let v = Value::map([("k", 7u8)]);
        let (bytes, stats) = canonical_bytes_with(&v, &DigestConfig::default());
        assert_eq!(stats.bytes, bytes.len());
        assert_eq!(stats.leaves, 2);
    }

    #[test]
    fn max_depth_truncates_deeper_values() {
        let cfg = DigestConfig::default().with_max_depth(1);
        let v = Value::list([Value::from(1u8), Value::list([2u8])]);
        let (bytes, stats) = canonical_bytes_with(&v, &cfg);
        assert_eq!(bytes, 1u64.to_be_bytes().to_vec());
        assert_eq!(stats.truncated, 1);
        assert!(!stats.is_complete());
    }

    #[test]
    fn bytes_truncate_like_a_list_under_depth_limit() {
        for limit in [0, 1] {
            let cfg = DigestConfig::default().with_max_depth(limit);
            let as_bytes = canonical_bytes_with(&Value::bytes(vec![1u8, 2]), &cfg);
            let as_list = canonical_bytes_with(&Value::list([1u8, 2]), &cfg);
            assert_eq!(as_bytes, as_list);

            let nested_bytes = Value::list([Value::bytes(vec![3u8])]);
            let nested_list = Value::list([Value::list([3u8])]);
            assert_eq!(
                canonical_bytes_with(&nested_bytes, &cfg),
                canonical_bytes_with(&nested_list, &cfg)
            );
        }

        let strict = DigestConfig::default().strict(true).with_max_depth(0);
        let (_, stats) = canonical_bytes_with(&Value::bytes(vec![1u8, 2]), &strict);
        assert_eq!(stats.truncated, 2);
        assert_eq!(
            stats.check(&strict),
            Err(Error::DepthExceeded { limit: 0 })
        );
    }

    #[test]
    fn sorted_map_reports_unsupported_kinds_in_sorted_order() {
        let strict = DigestConfig::default().strict(true);
        let channel = ("a", Value::Unsupported(UnsupportedKind::Channel));
        let callable = ("b", Value::Unsupported(UnsupportedKind::Callable));
        let forward = Value::map([channel.clone(), callable.clone()]);
        let backward = Value::map([callable, channel]);
        for v in [forward, backward] {
            let (_, stats) = canonical_bytes_with(&v, &strict);
            assert_eq!(
                stats.check(&strict),
                Err(Error::Unsupported {
                    kind: UnsupportedKind::Channel,
                    count: 2
                })
            );
        }
    }

    #[test]
    fn strict_check_reports_skips() {
        let strict = DigestConfig::default().strict(true);
        let v = Value::list([Value::Unsupported(UnsupportedKind::Channel)]);
        let (_, stats) = canonical_bytes_with(&v, &strict);
        assert_eq!(
            stats.check(&strict),
            Err(Error::Unsupported {
                kind: UnsupportedKind::Channel,
                count: 1
            })
        );

        let strict_depth = strict.with_max_depth(0);
        let (_, stats) = canonical_bytes_with(&Value::list([1u8]), &strict_depth);
        assert_eq!(
            stats.check(&strict_depth),
            Err(Error::DepthExceeded { limit: 0 })
        );
    }

    #[test]
    fn lenient_check_passes_skips_through() {
        let v = Value::Unsupported(UnsupportedKind::RawPointer);
        let (bytes, stats) = canonical_bytes_with(&v, &DigestConfig::default());
        assert!(bytes.is_empty());
        assert!(stats.check(&DigestConfig::default()).is_ok());
    }
}
