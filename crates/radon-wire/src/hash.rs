//! The RAD hash and hex bytecode conventions.
//!
//! The RAD hash is the SHA-256 digest of a request's encoded wire bytes. It
//! is the request's consensus-facing identifier and must be reproducible
//! bit-for-bit across independent implementations.
//!
//! Hex convention, applied everywhere in this workspace: lowercase, never
//! `0x`-prefixed. Hashing always operates on the raw bytes, never on a hex
//! string.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// SHA-256 digest of a request's encoded wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RadHash([u8; 32]);

impl RadHash {
    /// Hash the encoded wire bytes.
    pub fn of(wire_bytes: &[u8]) -> Self {
        let digest = Sha256::digest(wire_bytes);
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        RadHash(out)
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering (64 characters, unprefixed).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for RadHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Lowercase, unprefixed hex of the encoded wire bytes.
pub fn bytecode_hex(wire_bytes: &[u8]) -> String {
    hex::encode(wire_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_deterministic() {
        let bytes = b"the same wire bytes";
        assert_eq!(RadHash::of(bytes), RadHash::of(bytes));
    }

    #[test]
    fn test_single_byte_change_changes_hash() {
        assert_ne!(RadHash::of(b"wire bytes"), RadHash::of(b"wire byteZ"));
    }

    /// Known SHA-256 vector; a failure here means the digest algorithm
    /// changed, which breaks consensus.
    #[test]
    fn test_sha256_regression_vector() {
        assert_eq!(
            RadHash::of(b"").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            RadHash::of(b"abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hex_is_lowercase_and_unprefixed() {
        let rendered = RadHash::of(b"x").to_string();
        assert_eq!(rendered.len(), 64);
        assert!(!rendered.starts_with("0x"));
        assert_eq!(rendered, rendered.to_lowercase());

        assert_eq!(bytecode_hex(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
    }
}
