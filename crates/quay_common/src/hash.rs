//! Content hashing for cache keys.
//!
//! [`ContentHash`] is the digest handed to the artifact cache. [`HashComposer`]
//! folds an ordered sequence of components into one digest, length-prefixing
//! every component so that distinct sequences cannot collide by concatenation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::{xxh3_128, Xxh3};

/// A 128-bit XXH3 digest used as a cache key.
///
/// The canonical text form is 32 lowercase hex characters; [`fmt::Display`]
/// writes it and [`FromStr`] reads it back.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Digest of `data`.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(xxh3_128(data).to_le_bytes())
    }

    /// The digest bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|byte| write!(f, "{byte:02x}"))
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, ..] = self.0;
        write!(f, "ContentHash({a:02x}{b:02x}{c:02x}{d:02x}..)")
    }
}

/// Error parsing a [`ContentHash`] from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseHashError(String);

impl fmt::Display for ParseHashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid content hash '{}': expected 32 lowercase hex digits", self.0)
    }
}

impl std::error::Error for ParseHashError {}

impl FromStr for ContentHash {
    type Err = ParseHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseHashError(s.to_string());
        if s.len() != 32 || !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(invalid());
        }
        let mut bytes = [0u8; 16];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[2 * i..2 * i + 2], 16).map_err(|_| invalid())?;
        }
        Ok(Self(bytes))
    }
}

/// Streaming, order-preserving composition of hash inputs.
///
/// Every `write_*` call appends one component encoded as its little-endian
/// `u64` byte length followed by the bytes. The first component is always the
/// domain tag passed to [`HashComposer::new`].
pub struct HashComposer {
    hasher: Xxh3,
}

impl HashComposer {
    /// Starts a composition under the given domain tag.
    pub fn new(domain: &str) -> Self {
        let mut composer = Self {
            hasher: Xxh3::new(),
        };
        composer.write_str(domain);
        composer
    }

    /// Appends one length-prefixed byte component.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.hasher.update(&(bytes.len() as u64).to_le_bytes());
        self.hasher.update(bytes);
        self
    }

    /// Appends one string component.
    pub fn write_str(&mut self, s: &str) -> &mut Self {
        self.write_bytes(s.as_bytes())
    }

    /// Appends a digest as one component.
    pub fn write_hash(&mut self, hash: &ContentHash) -> &mut Self {
        self.write_bytes(hash.as_bytes())
    }

    /// Appends an element count, used ahead of variable-length lists.
    pub fn write_count(&mut self, count: usize) -> &mut Self {
        self.write_bytes(&(count as u64).to_le_bytes())
    }

    /// Appends an optional string as a presence flag plus, if present, the value.
    pub fn write_opt_str(&mut self, value: Option<&str>) -> &mut Self {
        match value {
            Some(v) => self.write_bytes(&[1]).write_str(v),
            None => self.write_bytes(&[0]),
        }
    }

    /// Consumes the composer and returns the digest of everything written.
    pub fn finish(self) -> ContentHash {
        ContentHash(self.hasher.digest128().to_le_bytes())
    }
}
