//! Streaming hash sinks.
//!
//! A sink accumulates the canonical byte stream and produces a fixed-width
//! digest. The traversal only ever calls `update`; entry points own
//! construction and `finalize`.

use blake3::Hasher as Blake3Hasher;
use xxhash_rust::xxh3::Xxh3;
use xxhash_rust::xxh64::Xxh64;

/// The capability the traversal needs from a hash primitive.
///
/// `update` must accept any byte slice without failing. A sink is owned by
/// exactly one traversal at a time; `&mut` borrowing enforces that.
pub trait Sink {
    /// Number of bytes `finalize` returns.
    fn output_width(&self) -> usize;

    fn update(&mut self, bytes: &[u8]);

    /// Consume the sink and return exactly `output_width()` bytes.
    fn finalize(self) -> Vec<u8>
    where
        Self: Sized;
}

/// XXH64 with seed 0.
pub struct Xxh64Sink {
    inner: Xxh64,
}

impl Xxh64Sink {
    pub const WIDTH: usize = 8;

    pub fn new() -> Self {
        Self {
            inner: Xxh64::new(0),
        }
    }

    pub fn finish_u64(&self) -> u64 {
        self.inner.digest()
    }
}

impl Default for Xxh64Sink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for Xxh64Sink {
    fn output_width(&self) -> usize {
        Self::WIDTH
    }

    fn update(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }

    fn finalize(self) -> Vec<u8> {
        self.finish_u64().to_be_bytes().to_vec()
    }
}

/// XXH3 128-bit. Output is the high 64-bit half then the low half, both
/// big-endian.
pub struct Xxh128Sink {
    inner: Xxh3,
}

impl Xxh128Sink {
    pub const WIDTH: usize = 16;

    pub fn new() -> Self {
        Self { inner: Xxh3::new() }
    }

    pub fn finish_u128(&self) -> u128 {
        self.inner.digest128()
    }
}

impl Default for Xxh128Sink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for Xxh128Sink {
    fn output_width(&self) -> usize {
        Self::WIDTH
    }

    fn update(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }

    fn finalize(self) -> Vec<u8> {
        self.finish_u128().to_be_bytes().to_vec()
    }
}

#[derive(Clone, Default)]
pub struct Blake3Sink {
    inner: Blake3Hasher,
}

impl Blake3Sink {
    pub const WIDTH: usize = blake3::OUT_LEN;

    pub fn new() -> Self {
        Self {
            inner: Blake3Hasher::new(),
        }
    }
}

impl Sink for Blake3Sink {
    fn output_width(&self) -> usize {
        Self::WIDTH
    }

    fn update(&mut self, bytes: &[u8]) {
        self.inner.update(bytes);
    }

    fn finalize(self) -> Vec<u8> {
        self.inner.finalize().as_bytes().to_vec()
    }
}

/// Adapter for any RustCrypto `digest::Digest` (SHA-2, SHA-3, ...).
#[derive(Clone, Default)]
pub struct DigestSink<D> {
    inner: D,
}

impl<D: digest::Digest> DigestSink<D> {
    pub fn new() -> Self {
        Self { inner: D::new() }
    }

    pub fn from_digest(inner: D) -> Self {
        Self { inner }
    }
}

impl<D: digest::Digest> Sink for DigestSink<D> {
    fn output_width(&self) -> usize {
        <D as digest::Digest>::output_size()
    }

    fn update(&mut self, bytes: &[u8]) {
        digest::Digest::update(&mut self.inner, bytes);
    }

    fn finalize(self) -> Vec<u8> {
        digest::Digest::finalize(self.inner).to_vec()
    }
}

/// Records the raw canonical stream instead of hashing it.
/// Its output width is the number of bytes captured so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureSink {
    bytes: Vec<u8>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.bytes
    }
}

impl Sink for CaptureSink {
    fn output_width(&self) -> usize {
        self.bytes.len()
    }

    fn update(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    fn finalize(self) -> Vec<u8> {
        self.bytes
    }
}
