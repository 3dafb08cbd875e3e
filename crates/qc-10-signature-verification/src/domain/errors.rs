//! # Signature Errors

use thiserror::Error;

/// Errors that can occur during signature verification. Verification
/// fails closed on any decoding or shape error, never panics.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// The public key PEM could not be decoded for this suite.
    #[error("invalid public key encoding")]
    InvalidPublicKey,

    /// The signature bytes are the wrong length or shape for this suite.
    #[error("invalid signature format")]
    InvalidFormat,

    /// The signature does not verify against the message and public key.
    #[error("signature verification failed")]
    VerificationFailed,

    /// The entity being checked carries no signature at all (and is not
    /// the sentinel Genesis transaction, which is the only signature-free
    /// case this crate accepts).
    #[error("missing signature")]
    MissingSignature,
}
