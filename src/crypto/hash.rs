//! SHA-256 helpers shared by both key schemes and the history reconciler.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of raw bytes.
pub fn sha256_hex_bytes(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Hex-encoded SHA-256 of the UTF-8 encoding of `input`.
pub fn sha256_hex(input: &str) -> String {
    sha256_hex_bytes(input.as_bytes())
}

/// Hex SHA-256 truncated to the first `len` characters.
pub fn sha256_hex_prefix(input: &str, len: usize) -> String {
    let mut digest = sha256_hex(input);
    digest.truncate(len);
    digest
}
