//! PoS equivocation detection: two different blocks signed by the same
//! creator at the same chain position.

use qc_10_signature_verification::{verify_block, SignatureSuite};
use shared_types::entities::{Block, RegimeFields};

/// The outcome of comparing two blocks at the same divergence position
/// with the same declared creator.
#[derive(Debug, Clone, PartialEq)]
pub enum EquivocationVerdict {
    /// Neither block's creator matches the other's — an ordinary,
    /// non-malicious fork. Caller should fall back to normal fork
    /// choice rather than slashing.
    NotEquivocation,
    /// Both signatures verify: genuine equivocation. The creator
    /// forfeits their stake and both blocks' transactions/reward are
    /// voided — apply [`mark_slashed`] to both.
    BothSigned,
    /// Exactly one signature verifies; that block is canonical and the
    /// chain carrying the other is rejected outright (no slashing).
    OneCanonical {
        /// `true` if `local` was the one that verified.
        local_is_canonical: bool,
    },
    /// Neither signature verifies. Both blocks are simply invalid.
    NeitherSigned,
}

/// Compare `local` and `remote`, both claiming the same chain position,
/// for PoS equivocation.
#[must_use]
pub fn detect_equivocation(local: &Block, remote: &Block, suite: SignatureSuite) -> EquivocationVerdict {
    let (local_creator, remote_creator) = match (&local.regime, &remote.regime) {
        (RegimeFields::PoS { creator: l, .. }, RegimeFields::PoS { creator: r, .. }) => (l, r),
        _ => return EquivocationVerdict::NotEquivocation,
    };
    if local_creator != remote_creator {
        return EquivocationVerdict::NotEquivocation;
    }

    let local_ok = verify_block(local, suite).is_ok();
    let remote_ok = verify_block(remote, suite).is_ok();
    match (local_ok, remote_ok) {
        (true, true) => EquivocationVerdict::BothSigned,
        (true, false) => EquivocationVerdict::OneCanonical { local_is_canonical: true },
        (false, true) => EquivocationVerdict::OneCanonical { local_is_canonical: false },
        (false, false) => EquivocationVerdict::NeitherSigned,
    }
}

/// Apply the slashing marks to a block proven to be one half of an
/// equivocation: the creator's stake deposit is forfeit and the block's
/// transactions/reward are voided (enforced downstream by the balance
/// evaluator).
pub fn mark_slashed(block: &mut Block) {
    if let RegimeFields::PoS {
        is_valid,
        slash_creator,
        ..
    } = &mut block.regime
    {
        *is_valid = false;
        *slash_creator = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::Secp256k1KeyPair;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn pos_block(keypair: &Secp256k1KeyPair, timestamp: f64) -> Block {
        let creator = keypair.public_key().export_pem().unwrap();
        let mut block = Block {
            id: Uuid::new_v4(),
            prev_hash: None,
            timestamp,
            transactions: vec![],
            files: BTreeMap::new(),
            regime: RegimeFields::PoS {
                creator,
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
        block
    }

    #[test]
    fn different_creators_is_not_equivocation() {
        let a = Secp256k1KeyPair::generate();
        let b = Secp256k1KeyPair::generate();
        let verdict = detect_equivocation(&pos_block(&a, 0.0), &pos_block(&b, 0.0), SignatureSuite::Secp256k1);
        assert_eq!(verdict, EquivocationVerdict::NotEquivocation);
    }

    #[test]
    fn two_signed_blocks_from_same_creator_is_equivocation() {
        let keypair = Secp256k1KeyPair::generate();
        let a = pos_block(&keypair, 0.0);
        let b = pos_block(&keypair, 1.0);
        let verdict = detect_equivocation(&a, &b, SignatureSuite::Secp256k1);
        assert_eq!(verdict, EquivocationVerdict::BothSigned);
    }

    #[test]
    fn mark_slashed_sets_both_flags() {
        let keypair = Secp256k1KeyPair::generate();
        let mut block = pos_block(&keypair, 0.0);
        mark_slashed(&mut block);
        match block.regime {
            RegimeFields::PoS { is_valid, slash_creator, .. } => {
                assert!(!is_valid);
                assert!(slash_creator);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn tampered_remote_signature_leaves_local_canonical() {
        let keypair = Secp256k1KeyPair::generate();
        let local = pos_block(&keypair, 0.0);
        let mut remote = pos_block(&keypair, 1.0);
        if let RegimeFields::PoS { signature, .. } = &mut remote.regime {
            *signature = Some(vec![0u8; 64]);
        }
        let verdict = detect_equivocation(&local, &remote, SignatureSuite::Secp256k1);
        assert_eq!(verdict, EquivocationVerdict::OneCanonical { local_is_canonical: true });
    }
}
