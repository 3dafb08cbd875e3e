//! # SHA-256 Hashing
//!
//! The canonical hash used for block hashes and content addressing.
//! Unlike `hashing` (BLAKE3, kept for internal message-bus checksums),
//! every externally-visible hash in this system — block hashes, the VRF
//! draw, content IDs — is SHA-256, matching the wire format peers exchange.

use sha2::{Digest, Sha256};

/// Hash `data` and return the lowercase hex digest.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Hash `data` and return the raw 32-byte digest.
pub fn sha256_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Interpret a SHA-256 digest as a big-endian 256-bit unsigned integer,
/// the form used by the VRF threshold comparison (`int(sha256(x), 16)`
/// in the reference implementation).
pub fn sha256_as_u256(data: &[u8]) -> primitive_types::U256 {
    primitive_types::U256::from_big_endian(&sha256_bytes(data))
}
