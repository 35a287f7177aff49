//! Artifact fingerprints
//!
//! [`ContentHash`] is a blake3 digest of an artifact's kind tag and text.
//! Two artifacts are materially different exactly when their fingerprints
//! differ, which lets the streaming path skip re-renders cheaply.

use std::fmt::{self, Display, Formatter};

const LEN: usize = blake3::OUT_LEN;

/// Blake3 fingerprint of `(kind, content)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash([u8; LEN]);

impl ContentHash {
    /// Digest of a single byte string
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(blake3::hash(data).into())
    }

    /// Digest over several fields
    ///
    /// Each field is length-prefixed so `["ab", "c"]` and `["a", "bc"]` never
    /// collide.
    #[must_use]
    pub fn compute_parts(parts: &[&[u8]]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(&(part.len() as u64).to_le_bytes());
            hasher.update(part);
        }
        Self(hasher.finalize().into())
    }

    /// Abbreviated form for log lines
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }

    /// Lowercase hex of the whole digest
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Display for ContentHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_is_deterministic() {
        assert_eq!(ContentHash::compute(b"abc"), ContentHash::compute(b"abc"));
        assert_ne!(ContentHash::compute(b"abc"), ContentHash::compute(b"abd"));
    }

    #[test]
    fn parts_are_length_prefixed() {
        let a = ContentHash::compute_parts(&[b"ab", b"c"]);
        let b = ContentHash::compute_parts(&[b"a", b"bc"]);
        assert_ne!(a, b);
    }

    #[test]
    fn hex_forms() {
        let hash = ContentHash::compute(b"roundtrip");
        assert_eq!(hash.to_hex().len(), 64);
        assert_eq!(hash.to_string(), hash.to_hex());
        assert!(hash.to_hex().starts_with(&hash.short()));
        assert_eq!(hash.short().len(), 16);
    }
}
