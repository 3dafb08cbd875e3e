//! Finality cutoff and PoS epoch seed derivation.

use shared_types::entities::Block;
use shared_types::regime::Regime;

/// The number of blocks, out of a chain of `blocks.len()` blocks, that
/// are treated as finalized by [`qc_04_state_management::balance`]. The
/// remaining tail (`finality_cutoff(n)..n`) is non-final.
#[must_use]
pub fn finality_cutoff(blocks: &[Block], regime: Regime) -> usize {
    regime.finality_cutoff(blocks.len())
}

/// The PoS epoch seed: the hash of the last finalized block.
///
/// `epoch_seed(chain) = chain[finality_cutoff(len(chain)) - 1].hash`.
/// Returns `None` before any block is finalized (an empty or
/// very short chain).
#[must_use]
pub fn epoch_seed(blocks: &[Block]) -> Option<String> {
    let m = finality_cutoff(blocks, Regime::PoS);
    m.checked_sub(1).and_then(|i| blocks.get(i)).map(Block::hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::entities::RegimeFields;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn block(prev_hash: Option<String>) -> Block {
        Block {
            id: Uuid::new_v4(),
            prev_hash,
            timestamp: 0.0,
            transactions: vec![],
            files: BTreeMap::new(),
            regime: RegimeFields::PoW { nonce: 0 },
        }
    }

    #[test]
    fn epoch_seed_is_none_on_empty_chain() {
        assert_eq!(epoch_seed(&[]), None);
    }

    #[test]
    fn epoch_seed_matches_last_finalized_block_hash() {
        let mut blocks = Vec::new();
        for _ in 0..10 {
            let prev = blocks.last().map(|b: &Block| b.hash());
            blocks.push(block(prev));
        }
        // PoS cutoff at length 10: 10 - 10/5 = 8.
        let m = finality_cutoff(&blocks, Regime::PoS);
        assert_eq!(m, 8);
        assert_eq!(epoch_seed(&blocks), Some(blocks[7].hash()));
    }
}
