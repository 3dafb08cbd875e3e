//! Entity-level signature checks built on top of [`super::suite::SignatureSuite`].

use super::errors::SignatureError;
use super::suite::SignatureSuite;
use shared_types::entities::{Block, RegimeFields, Stake, Transaction};

/// Verify a transaction's signature against its declared `sender`. The
/// sentinel Genesis transaction (block 0 only) carries no signature and
/// always passes.
pub fn verify_transaction(tx: &Transaction, suite: SignatureSuite) -> Result<(), SignatureError> {
    if tx.is_genesis() {
        return Ok(());
    }
    let signature = tx.signature.as_deref().ok_or(SignatureError::MissingSignature)?;
    suite.verify(&tx.sender, &tx.signable_bytes(), signature)
}

/// Verify a stake submission's signature against its declared `staker`.
pub fn verify_stake(stake: &Stake, suite: SignatureSuite) -> Result<(), SignatureError> {
    let signature = stake.signature.as_deref().ok_or(SignatureError::MissingSignature)?;
    suite.verify(&stake.staker, &stake.signable_bytes(), signature)
}

/// Verify a block's own producer signature, where the regime has one.
///
/// PoW blocks carry no producer signature — their legitimacy is the
/// hash-prefix predicate, checked by the chain validator, not here — so
/// this always succeeds for PoW. PoS and PoA blocks are checked against
/// their declared producer key over [`Block::signable_bytes`].
pub fn verify_block(block: &Block, suite: SignatureSuite) -> Result<(), SignatureError> {
    match &block.regime {
        RegimeFields::PoW { .. } => Ok(()),
        RegimeFields::PoS { creator, signature, .. } => {
            let signature = signature.as_deref().ok_or(SignatureError::MissingSignature)?;
            suite.verify(creator, &block.signable_bytes(), signature)
        }
        RegimeFields::PoA {
            miner_public_key,
            signature,
            ..
        } => {
            let signature = signature.as_deref().ok_or(SignatureError::MissingSignature)?;
            let signature = hex::decode(signature).map_err(|_| SignatureError::InvalidFormat)?;
            suite.verify(miner_public_key, &block.signable_bytes(), &signature)
        }
    }
}

/// Verify a PoS block's VRF proof: the proof is itself a signature over
/// the epoch seed under the block's declared creator key.
pub fn verify_vrf_proof(block: &Block, suite: SignatureSuite) -> Result<(), SignatureError> {
    match &block.regime {
        RegimeFields::PoS {
            creator,
            seed,
            vrf_proof,
            ..
        } => suite.verify(creator, seed.as_bytes(), vrf_proof),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::Secp256k1KeyPair;
    use shared_types::entities::Payload;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn signed_tx(keypair: &Secp256k1KeyPair, receiver: &str, amount: f64) -> Transaction {
        let mut t = Transaction {
            id: Uuid::new_v4(),
            payload: Payload::Value(amount),
            sender: keypair.public_key().export_pem().unwrap(),
            receiver: receiver.to_string(),
            timestamp: 0.0,
            signature: None,
        };
        let sig = keypair.sign(&t.signable_bytes());
        t.signature = Some(sig.as_bytes().to_vec());
        t
    }

    #[test]
    fn genesis_transaction_needs_no_signature() {
        let t = shared_types::entities::Chain::genesis_transaction("PKpem", Uuid::new_v4(), 0.0);
        verify_transaction(&t, SignatureSuite::Secp256k1).unwrap();
    }

    #[test]
    fn correctly_signed_transaction_verifies() {
        let keypair = Secp256k1KeyPair::generate();
        let t = signed_tx(&keypair, "PKreceiver", 10.0);
        verify_transaction(&t, SignatureSuite::Secp256k1).unwrap();
    }

    #[test]
    fn tampered_amount_fails_verification() {
        let keypair = Secp256k1KeyPair::generate();
        let mut t = signed_tx(&keypair, "PKreceiver", 10.0);
        t.payload = Payload::Value(999.0);
        let err = verify_transaction(&t, SignatureSuite::Secp256k1).unwrap_err();
        assert_eq!(err, SignatureError::VerificationFailed);
    }

    #[test]
    fn unsigned_non_genesis_transaction_is_rejected() {
        let t = Transaction {
            id: Uuid::new_v4(),
            payload: Payload::Value(1.0),
            sender: "PKa".into(),
            receiver: "PKb".into(),
            timestamp: 0.0,
            signature: None,
        };
        let err = verify_transaction(&t, SignatureSuite::Secp256k1).unwrap_err();
        assert_eq!(err, SignatureError::MissingSignature);
    }

    #[test]
    fn pow_block_has_no_producer_signature_to_check() {
        let block = Block {
            id: Uuid::new_v4(),
            prev_hash: None,
            timestamp: 0.0,
            transactions: vec![],
            files: BTreeMap::new(),
            regime: RegimeFields::PoW { nonce: 0 },
        };
        verify_block(&block, SignatureSuite::RsaPss).unwrap();
    }

    #[test]
    fn pos_block_signature_verifies_under_creator_key() {
        let keypair = Secp256k1KeyPair::generate();
        let creator = keypair.public_key().export_pem().unwrap();
        let mut block = Block {
            id: Uuid::new_v4(),
            prev_hash: None,
            timestamp: 0.0,
            transactions: vec![],
            files: BTreeMap::new(),
            regime: RegimeFields::PoS {
                creator: creator.clone(),
                staked_amt: 10.0,
                stakers: vec![],
                seed: "seed".into(),
                vrf_proof: vec![],
                signature: None,
                is_valid: true,
                slash_creator: false,
            },
        };
        let sig = keypair.sign(&block.signable_bytes());
        if let RegimeFields::PoS { signature, .. } = &mut block.regime {
            *signature = Some(sig.as_bytes().to_vec());
        }
        verify_block(&block, SignatureSuite::Secp256k1).unwrap();
    }
}
