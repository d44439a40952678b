//! FNV-1a checksumming of file sections.
//!
//! The checksum guards against accidental corruption only; it is not
//! cryptographically secure. [`HashingWriter`] and [`HashingReader`] fold
//! every byte that passes through them into a running hash, so sections
//! are checksummed while they stream.

use std::io::{self, Read, Write};

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

/// Incremental 64-bit FNV-1a state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fnv1a(u64);

impl Fnv1a {
    /// A fresh state at the offset basis.
    pub fn new() -> Self {
        Self(FNV_OFFSET)
    }

    /// Fold `bytes` into the state.
    #[inline]
    pub fn update(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = (self.0 ^ b as u64).wrapping_mul(FNV_PRIME);
        }
    }

    /// The current hash value.
    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for Fnv1a {
    fn default() -> Self {
        Self::new()
    }
}

/// FNV-1a of `bytes` in one call.
pub fn checksum(bytes: &[u8]) -> u64 {
    let mut h = Fnv1a::new();
    h.update(bytes);
    h.finish()
}

/// Passes writes through to `inner` while hashing them.
pub struct HashingWriter<'a> {
    inner: &'a mut dyn Write,
    hash: Fnv1a,
}

impl<'a> HashingWriter<'a> {
    /// Wrap `inner` with a fresh hash state.
    pub fn new(inner: &'a mut dyn Write) -> Self {
        Self {
            inner,
            hash: Fnv1a::new(),
        }
    }

    /// Hash of every byte written so far.
    pub fn checksum(&self) -> u64 {
        self.hash.finish()
    }
}

impl Write for HashingWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hash.update(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Passes reads through from `inner` while hashing them.
pub struct HashingReader<'a> {
    inner: &'a mut dyn Read,
    hash: Fnv1a,
}

impl<'a> HashingReader<'a> {
    /// Wrap `inner` with a fresh hash state.
    pub fn new(inner: &'a mut dyn Read) -> Self {
        Self {
            inner,
            hash: Fnv1a::new(),
        }
    }

    /// Hash of every byte read so far.
    pub fn checksum(&self) -> u64 {
        self.hash.finish()
    }
}

impl Read for HashingReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hash.update(&buf[..n]);
        Ok(n)
    }
}
