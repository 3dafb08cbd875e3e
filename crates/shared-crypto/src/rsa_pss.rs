//! # RSA-PSS Signatures (RSA-2048 + PSS-SHA256)
//!
//! The signing suite used historically by the proof-of-work regime. Kept
//! alongside the secp256k1 suite so a node can select either at construction
//! time without the rest of the system caring which one it got.
//!
//! ## Security Properties
//!
//! - PKCS#1 v2.2 PSS padding with MGF1(SHA-256), salt length = digest length
//! - 2048-bit modulus minimum
//! - Verification fails closed on any decoding or shape error

use crate::CryptoError;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::sha2::Sha256;
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use rsa::{pss::Signature, pss::SigningKey, pss::VerifyingKey, RsaPrivateKey, RsaPublicKey};

const KEY_BITS: usize = 2048;

/// RSA-2048 public key.
#[derive(Clone)]
pub struct RsaPssPublicKey(RsaPublicKey);

impl RsaPssPublicKey {
    /// Verify a PSS-SHA256 signature.
    pub fn verify(&self, message: &[u8], signature: &RsaPssSignature) -> Result<(), CryptoError> {
        let verifying_key: VerifyingKey<Sha256> = VerifyingKey::new(self.0.clone());
        let sig = Signature::try_from(signature.0.as_slice())
            .map_err(|_| CryptoError::InvalidSignatureFormat)?;
        verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }

    /// Export as a SubjectPublicKeyInfo PEM string.
    pub fn export_pem(&self) -> Result<String, CryptoError> {
        self.0
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::InvalidInput(e.to_string()))
    }

    /// Import from a PEM string. Accepts both SubjectPublicKeyInfo and
    /// PKCS#1 `RSA PUBLIC KEY` forms, matching what interop wallets emit.
    pub fn import_pem(pem: &str) -> Result<Self, CryptoError> {
        if let Ok(key) = RsaPublicKey::from_public_key_pem(pem) {
            return Ok(Self(key));
        }
        RsaPublicKey::from_pkcs1_pem(pem)
            .map(Self)
            .map_err(|_| CryptoError::InvalidPublicKey)
    }
}

/// RSA PSS-SHA256 signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RsaPssSignature(Vec<u8>);

impl RsaPssSignature {
    /// Raw signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Wrap raw signature bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// RSA-2048 keypair.
pub struct RsaPssKeyPair {
    private_key: RsaPrivateKey,
}

impl RsaPssKeyPair {
    /// Generate a fresh 2048-bit keypair. Expensive; call off the async
    /// runtime's I/O scheduler.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, KEY_BITS)
            .map_err(|e| CryptoError::KeyGenerationFailed(e.to_string()))?;
        Ok(Self { private_key })
    }

    /// Public key half of this keypair.
    pub fn public_key(&self) -> RsaPssPublicKey {
        RsaPssPublicKey(self.private_key.to_public_key())
    }

    /// Sign a message with PSS-SHA256 (randomized salt, per RSA-PSS spec).
    pub fn sign(&self, message: &[u8]) -> RsaPssSignature {
        let signing_key: SigningKey<Sha256> = SigningKey::new(self.private_key.clone());
        let mut rng = rand::thread_rng();
        let sig = signing_key.sign_with_rng(&mut rng, message);
        RsaPssSignature(sig.to_vec())
    }

    /// Export the private key as a PKCS#8 PEM string.
    pub fn export_pem(&self) -> Result<String, CryptoError> {
        self.private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map(|z| z.to_string())
            .map_err(|e| CryptoError::InvalidInput(e.to_string()))
    }

    /// Import a private key from a PEM string (PKCS#8 or PKCS#1).
    pub fn import_pem(pem: &str) -> Result<Self, CryptoError> {
        if let Ok(key) = RsaPrivateKey::from_pkcs8_pem(pem) {
            return Ok(Self { private_key: key });
        }
        let private_key =
            RsaPrivateKey::from_pkcs1_pem(pem).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { private_key })
    }
}
