//! Fork choice between the local chain and a remote candidate received
//! over `chain`/`chain_request`.

use super::validator::chain_weight;
use shared_types::entities::Block;
use shared_types::regime::Regime;

/// What to do with a validated remote chain relative to the local one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForkChoice {
    /// Replace the local chain with the remote one.
    AdoptRemote,
    /// Keep the local chain; the remote one is not heavier/longer.
    KeepLocal,
}

/// Decide whether to adopt `remote` over `local`, both already passed
/// through `is_valid_chain`. PoW/PoA compare length; PoS compares the
/// sum of stake weight across all blocks.
#[must_use]
pub fn choose(local: &[Block], remote: &[Block], regime: Regime) -> ForkChoice {
    if local.is_empty() {
        return ForkChoice::AdoptRemote;
    }
    let adopt = match regime {
        Regime::PoW | Regime::PoA => remote.len() > local.len(),
        Regime::PoS => chain_weight(remote) > chain_weight(local),
    };
    if adopt {
        ForkChoice::AdoptRemote
    } else {
        ForkChoice::KeepLocal
    }
}

/// The first index at which `local` and `remote` diverge, or `None` if
/// one is a prefix of the other.
#[must_use]
pub fn divergence_point(local: &[Block], remote: &[Block]) -> Option<usize> {
    local
        .iter()
        .zip(remote.iter())
        .position(|(l, r)| l.hash() != r.hash())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::entities::RegimeFields;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn pow_block(nonce: u64) -> Block {
        Block {
            id: Uuid::new_v4(),
            prev_hash: None,
            timestamp: 0.0,
            transactions: vec![],
            files: BTreeMap::new(),
            regime: RegimeFields::PoW { nonce },
        }
    }

    #[test]
    fn empty_local_always_adopts() {
        assert_eq!(choose(&[], &[pow_block(0)], Regime::PoW), ForkChoice::AdoptRemote);
    }

    #[test]
    fn pow_adopts_only_when_longer() {
        let local = vec![pow_block(0), pow_block(1)];
        let shorter = vec![pow_block(2)];
        let longer = vec![pow_block(3), pow_block(4), pow_block(5)];
        assert_eq!(choose(&local, &shorter, Regime::PoW), ForkChoice::KeepLocal);
        assert_eq!(choose(&local, &longer, Regime::PoW), ForkChoice::AdoptRemote);
    }

    #[test]
    fn divergence_point_finds_first_mismatch() {
        let a = vec![pow_block(0), pow_block(1)];
        let mut b = a.clone();
        b[1].regime = RegimeFields::PoW { nonce: 999 };
        assert_eq!(divergence_point(&a, &b), Some(1));
        assert_eq!(divergence_point(&a, &a), None);
    }
}
