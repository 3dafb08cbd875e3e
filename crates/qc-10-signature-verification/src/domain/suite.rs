//! The per-regime signature suite and the byte-level verify it wraps.

use super::errors::SignatureError;
use shared_crypto::{Secp256k1PublicKey, Secp256k1Signature, RsaPssPublicKey, RsaPssSignature};
use shared_types::regime::Regime;

/// Which signing suite a node's regime uses for its own transaction and
/// block signatures. PoS and PoA use secp256k1 ECDSA; PoW historically
/// uses RSA-2048 + PSS-SHA256.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureSuite {
    /// secp256k1 ECDSA, PEM-encoded keys.
    Secp256k1,
    /// RSA-2048 + PSS-SHA256, PEM-encoded keys.
    RsaPss,
}

impl SignatureSuite {
    /// The suite a node running `regime` signs and verifies with.
    #[must_use]
    pub fn for_regime(regime: Regime) -> Self {
        match regime {
            Regime::PoW => SignatureSuite::RsaPss,
            Regime::PoS | Regime::PoA => SignatureSuite::Secp256k1,
        }
    }

    /// Verify `signature` over `message` under `public_key_pem`,
    /// dispatching to this suite's algorithm. Fails closed: any PEM
    /// decode error, wrong-length signature, or cryptographic mismatch
    /// returns an error rather than panicking.
    pub fn verify(
        &self,
        public_key_pem: &str,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), SignatureError> {
        match self {
            SignatureSuite::Secp256k1 => {
                let key = Secp256k1PublicKey::import_pem(public_key_pem)
                    .map_err(|_| SignatureError::InvalidPublicKey)?;
                let bytes: [u8; 64] = signature
                    .try_into()
                    .map_err(|_| SignatureError::InvalidFormat)?;
                let sig = Secp256k1Signature::from_bytes(bytes);
                key.verify(message, &sig)
                    .map_err(|_| SignatureError::VerificationFailed)
            }
            SignatureSuite::RsaPss => {
                let key = RsaPssPublicKey::import_pem(public_key_pem)
                    .map_err(|_| SignatureError::InvalidPublicKey)?;
                let sig = RsaPssSignature::from_bytes(signature.to_vec());
                key.verify(message, &sig)
                    .map_err(|_| SignatureError::VerificationFailed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::Secp256k1KeyPair;

    #[test]
    fn secp256k1_suite_round_trips() {
        let keypair = Secp256k1KeyPair::generate();
        let pem = keypair.public_key().export_pem().unwrap();
        let sig = keypair.sign(b"hello").as_bytes().to_vec();
        SignatureSuite::Secp256k1.verify(&pem, b"hello", &sig).unwrap();
    }

    #[test]
    fn wrong_message_is_rejected() {
        let keypair = Secp256k1KeyPair::generate();
        let pem = keypair.public_key().export_pem().unwrap();
        let sig = keypair.sign(b"hello").as_bytes().to_vec();
        let err = SignatureSuite::Secp256k1.verify(&pem, b"goodbye", &sig).unwrap_err();
        assert_eq!(err, SignatureError::VerificationFailed);
    }

    #[test]
    fn malformed_signature_bytes_fail_closed() {
        let keypair = Secp256k1KeyPair::generate();
        let pem = keypair.public_key().export_pem().unwrap();
        let err = SignatureSuite::Secp256k1.verify(&pem, b"hello", &[1, 2, 3]).unwrap_err();
        assert_eq!(err, SignatureError::InvalidFormat);
    }

    #[test]
    fn malformed_pem_fails_closed() {
        let err = SignatureSuite::Secp256k1
            .verify("not a pem", b"hello", &[0u8; 64])
            .unwrap_err();
        assert_eq!(err, SignatureError::InvalidPublicKey);
    }

    #[test]
    fn for_regime_selects_the_nominal_suite() {
        assert_eq!(SignatureSuite::for_regime(Regime::PoW), SignatureSuite::RsaPss);
        assert_eq!(SignatureSuite::for_regime(Regime::PoS), SignatureSuite::Secp256k1);
        assert_eq!(SignatureSuite::for_regime(Regime::PoA), SignatureSuite::Secp256k1);
    }
}
