//! The node's own signing identity: whichever suite its regime calls
//! for, loaded from the persistence port or generated fresh.

use qc_02_block_storage::KvStore;
use qc_10_signature_verification::SignatureSuite;
use shared_crypto::{RsaPssKeyPair, Secp256k1KeyPair};
use shared_types::regime::Regime;

/// This node's private signing key, in whichever suite its regime uses.
pub enum Wallet {
    Secp256k1(Secp256k1KeyPair),
    RsaPss(RsaPssKeyPair),
}

impl Wallet {
    /// A fresh keypair in the suite `regime` calls for.
    pub fn generate(regime: Regime) -> anyhow::Result<Self> {
        Ok(match SignatureSuite::for_regime(regime) {
            SignatureSuite::Secp256k1 => Wallet::Secp256k1(Secp256k1KeyPair::generate()),
            SignatureSuite::RsaPss => Wallet::RsaPss(RsaPssKeyPair::generate()?),
        })
    }

    /// This wallet's public key, PEM-encoded.
    pub fn public_key_pem(&self) -> anyhow::Result<String> {
        Ok(match self {
            Wallet::Secp256k1(kp) => kp.public_key().export_pem()?,
            Wallet::RsaPss(kp) => kp.public_key().export_pem()?,
        })
    }

    /// This node's identity, as advertised in `PeerRecord::node_id` and
    /// used for PoA roster membership and PoW slot-independent lookup.
    /// secp256k1 wallets hash the compressed public key directly; RSA
    /// wallets (PoW has no compressed-point form) hash the exported PEM.
    pub fn node_id_hex(&self) -> anyhow::Result<String> {
        Ok(match self {
            Wallet::Secp256k1(kp) => hex::encode(kp.public_key().to_node_id()),
            Wallet::RsaPss(kp) => shared_crypto::sha256_hex(kp.public_key().export_pem()?.as_bytes()),
        })
    }

    /// Sign `message` under this wallet's private key.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        match self {
            Wallet::Secp256k1(kp) => kp.sign(message).as_bytes().to_vec(),
            Wallet::RsaPss(kp) => kp.sign(message).as_bytes().to_vec(),
        }
    }

    /// The underlying secp256k1 keypair, for PoS/PoA block assembly
    /// that needs the concrete type rather than the dispatched
    /// `sign`/`verify` pair. Only ever called under those regimes,
    /// which always hold a `Secp256k1` wallet.
    pub fn secp256k1_keypair(&self) -> Option<&Secp256k1KeyPair> {
        match self {
            Wallet::Secp256k1(kp) => Some(kp),
            Wallet::RsaPss(_) => None,
        }
    }

    /// Export this wallet's private key as PEM, for persistence.
    pub fn export_private_pem(&self) -> anyhow::Result<String> {
        Ok(match self {
            Wallet::Secp256k1(kp) => kp.export_pem()?,
            Wallet::RsaPss(kp) => kp.export_pem()?,
        })
    }

    /// Restore a wallet from a private-key PEM, for the suite `regime`
    /// calls for.
    pub fn import_private_pem(regime: Regime, pem: &str) -> anyhow::Result<Self> {
        Ok(match SignatureSuite::for_regime(regime) {
            SignatureSuite::Secp256k1 => Wallet::Secp256k1(Secp256k1KeyPair::import_pem(pem)?),
            SignatureSuite::RsaPss => Wallet::RsaPss(RsaPssKeyPair::import_pem(pem)?),
        })
    }

    /// This node's only concrete identity secret, `keys`: load it from
    /// `store` if present, otherwise generate and persist a fresh one.
    pub fn load_or_generate(store: &dyn KvStore, regime: Regime) -> anyhow::Result<Self> {
        if let Some(bytes) = store.load("keys")? {
            let pem = String::from_utf8(bytes)?;
            return Self::import_private_pem(regime, &pem);
        }
        let wallet = Self::generate(regime)?;
        store.save("keys", wallet.export_private_pem()?.as_bytes())?;
        Ok(wallet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qc_02_block_storage::FileKvStore;

    #[test]
    fn generates_the_suite_matching_its_regime() {
        let pow = Wallet::generate(Regime::PoW).unwrap();
        assert!(matches!(pow, Wallet::RsaPss(_)));
        let pos = Wallet::generate(Regime::PoS).unwrap();
        assert!(matches!(pos, Wallet::Secp256k1(_)));
    }

    #[test]
    fn private_pem_round_trips() {
        let wallet = Wallet::generate(Regime::PoA).unwrap();
        let pem = wallet.export_private_pem().unwrap();
        let restored = Wallet::import_private_pem(Regime::PoA, &pem).unwrap();
        assert_eq!(wallet.public_key_pem().unwrap(), restored.public_key_pem().unwrap());
    }

    #[test]
    fn node_id_is_stable_across_calls() {
        let wallet = Wallet::generate(Regime::PoW).unwrap();
        assert_eq!(wallet.node_id_hex().unwrap(), wallet.node_id_hex().unwrap());
    }

    #[test]
    fn load_or_generate_persists_a_fresh_wallet_then_reloads_it() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::new(dir.path()).unwrap();
        let first = Wallet::load_or_generate(&store, Regime::PoS).unwrap();
        let second = Wallet::load_or_generate(&store, Regime::PoS).unwrap();
        assert_eq!(first.public_key_pem().unwrap(), second.public_key_pem().unwrap());
    }
}
