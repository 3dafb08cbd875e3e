//! Handling a remote chain received in reply to `chain_request`: validate
//! it, apply fork choice against the local chain, and report whether the
//! caller should adopt it.

use qc_08_consensus::{choose, is_valid_chain, ConsensusError, ForkChoice};
use shared_types::entities::Block;
use shared_types::regime::Regime;

/// What the caller should do with a chain received over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicationOutcome {
    /// Replace the local chain with the remote one.
    Adopt,
    /// Keep the local chain; the remote one did not validate or lose.
    Keep,
}

/// Validate `remote` and decide whether it should replace `local`.
/// A remote chain that fails `is_valid_chain` is never adopted, even if
/// it would otherwise win fork choice.
pub fn evaluate_remote_chain(local: &[Block], remote: &[Block], regime: Regime) -> ReplicationOutcome {
    if is_valid_chain(remote, regime).is_err() {
        return ReplicationOutcome::Keep;
    }
    match choose(local, remote, regime) {
        ForkChoice::AdoptRemote => ReplicationOutcome::Adopt,
        ForkChoice::KeepLocal => ReplicationOutcome::Keep,
    }
}

/// Re-check a chain the caller is about to adopt, surfacing the specific
/// validation failure rather than silently rejecting it (used for
/// diagnostics/logging on the rejection path).
pub fn validate_chain(remote: &[Block], regime: Regime) -> Result<(), ConsensusError> {
    is_valid_chain(remote, regime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::Secp256k1KeyPair;
    use shared_types::entities::RegimeFields;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    /// A signed PoA block — cheap to construct for chain-length tests,
    /// unlike PoW which requires an actual mined nonce.
    fn poa_block(keypair: &Secp256k1KeyPair, prev: Option<String>, miners_list: Vec<String>) -> Block {
        let pem = keypair.public_key().export_pem().unwrap();
        let mut block = Block {
            id: Uuid::new_v4(),
            prev_hash: prev,
            timestamp: 0.0,
            transactions: vec![],
            files: BTreeMap::new(),
            regime: RegimeFields::PoA {
                miner_node_id: "a".to_string(),
                miner_public_key: pem,
                miners_list,
                signature: None,
            },
        };
        let signature = hex::encode(keypair.sign(&block.signable_bytes()).as_bytes());
        if let RegimeFields::PoA { signature: slot, .. } = &mut block.regime {
            *slot = Some(signature);
        }
        block
    }

    fn chain(keypair: &Secp256k1KeyPair, n: usize) -> Vec<Block> {
        let roster = vec!["a".to_string()];
        let mut blocks = Vec::new();
        let mut prev = None;
        for _ in 0..n {
            let b = poa_block(keypair, prev.clone(), roster.clone());
            prev = Some(b.hash());
            blocks.push(b);
        }
        blocks
    }

    #[test]
    fn adopts_longer_valid_remote_chain() {
        let keypair = Secp256k1KeyPair::generate();
        let local = chain(&keypair, 1);
        let remote = chain(&keypair, 3);
        assert_eq!(evaluate_remote_chain(&local, &remote, Regime::PoA), ReplicationOutcome::Adopt);
    }

    #[test]
    fn keeps_local_when_remote_is_shorter() {
        let keypair = Secp256k1KeyPair::generate();
        let local = chain(&keypair, 3);
        let remote = chain(&keypair, 1);
        assert_eq!(evaluate_remote_chain(&local, &remote, Regime::PoA), ReplicationOutcome::Keep);
    }

    #[test]
    fn rejects_remote_chain_with_broken_linkage() {
        let keypair = Secp256k1KeyPair::generate();
        let local = chain(&keypair, 1);
        let mut remote = chain(&keypair, 3);
        remote[2].prev_hash = Some("bogus".to_string());
        assert_eq!(evaluate_remote_chain(&local, &remote, Regime::PoA), ReplicationOutcome::Keep);
        assert!(validate_chain(&remote, Regime::PoA).is_err());
    }

    #[test]
    fn adopts_any_valid_chain_when_local_is_empty() {
        let keypair = Secp256k1KeyPair::generate();
        let remote = chain(&keypair, 1);
        assert_eq!(evaluate_remote_chain(&[], &remote, Regime::PoA), ReplicationOutcome::Adopt);
    }
}
