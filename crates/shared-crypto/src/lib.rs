//! # Shared Crypto
//!
//! The two signing suites and the hash function the ledger core is built on.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `sha256` | SHA-256 | Block hashes, content IDs, VRF draw |
//! | `ecdsa` | secp256k1 | PoS/PoA transaction, stake, and block signing |
//! | `rsa_pss` | RSA-2048 + PSS-SHA256 | PoW transaction and block signing |
//!
//! A node picks one signing suite at construction time (see
//! `SignatureSuite` in `qc-10-signature-verification`) based on its
//! consensus regime; both suites live here so Genesis interop and tests
//! can exercise either independently of which regime is running.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod rsa_pss;
pub mod sha256;

// Re-exports
pub use ecdsa::{Secp256k1KeyPair, Secp256k1PublicKey, Secp256k1Signature};
pub use errors::CryptoError;
pub use rsa_pss::{RsaPssKeyPair, RsaPssPublicKey, RsaPssSignature};
pub use sha256::{sha256_as_u256, sha256_bytes, sha256_hex};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
