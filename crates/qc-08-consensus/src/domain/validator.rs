//! `is_valid_block`/`is_valid_chain`: the regime-aware block and chain
//! legitimacy predicates.

use super::errors::ConsensusError;
use primitive_types::U256;
use qc_04_state_management::{check_admission, Pending};
use qc_09_finality::epoch_seed;
use qc_10_signature_verification::{verify_block, verify_transaction, verify_vrf_proof, SignatureSuite};
use shared_types::entities::{Block, Chain, RegimeFields};
use shared_types::expected_producer;
use shared_types::regime::Regime;

/// Five ASCII zeroes: the fixed PoW difficulty target.
const POW_PREFIX: &str = "00000";

/// Check `block` against the chain prefix `ctx` it claims to extend.
///
/// `round` is the PoA round the block claims to have been produced in
/// (ignored outside PoA); callers validating a single freshly-arrived
/// block pass their own live round advancer, while batch replay passes
/// `0`, see [`is_valid_chain`].
///
/// Runs, in order: parent linkage, per-transaction duplicate/signature/
/// admission checks under a rolling in-block mempool, the regime's own
/// legitimacy predicate, and (PoS/PoA) the block's producer signature.
pub fn is_valid_block(block: &Block, ctx: &Chain, regime: Regime, round: u64) -> Result<(), ConsensusError> {
    let expected_prev = ctx.tip().map(Block::hash);
    if block.prev_hash != expected_prev {
        return Err(ConsensusError::WrongParent);
    }

    let suite = SignatureSuite::for_regime(regime);
    let mut in_block = Vec::with_capacity(block.transactions.len());
    for tx in &block.transactions {
        if ctx.contains_transaction(tx) {
            return Err(ConsensusError::DuplicateTransaction(tx.id));
        }
        verify_transaction(tx, suite).map_err(|_| ConsensusError::InvalidTransactionSignature(tx.id))?;

        let stakers = match &block.regime {
            RegimeFields::PoS { stakers, .. } => stakers.as_slice(),
            _ => &[],
        };
        let pending = Pending {
            transactions: &in_block,
            stakes: stakers,
        };
        check_admission(&ctx.blocks, tx, regime, pending)
            .map_err(|_| ConsensusError::InadmissibleTransaction(tx.id))?;
        in_block.push(tx.clone());
    }

    check_regime_predicate(block, ctx, regime, round)?;
    verify_block(block, suite).map_err(|_| ConsensusError::InvalidBlockSignature)
}

fn check_regime_predicate(block: &Block, ctx: &Chain, regime: Regime, round: u64) -> Result<(), ConsensusError> {
    match &block.regime {
        RegimeFields::PoW { .. } => {
            if block.hash().starts_with(POW_PREFIX) {
                Ok(())
            } else {
                Err(ConsensusError::RegimePredicateFailed)
            }
        }
        RegimeFields::PoA { miner_node_id, miners_list, .. } => {
            if !miners_list.iter().any(|id| id == miner_node_id) {
                return Err(ConsensusError::RegimePredicateFailed);
            }
            match expected_producer(miners_list, ctx.blocks.len(), round) {
                Some(expected) if expected == miner_node_id => Ok(()),
                _ => Err(ConsensusError::UnexpectedProducer),
            }
        }
        RegimeFields::PoS {
            creator,
            staked_amt,
            stakers,
            seed,
            vrf_proof,
            ..
        } => {
            if creator.is_empty() {
                return Err(ConsensusError::RegimePredicateFailed);
            }

            let suite = SignatureSuite::for_regime(regime);
            verify_vrf_proof(block, suite).map_err(|_| ConsensusError::RegimePredicateFailed)?;

            let expected_seed = epoch_seed(&ctx.blocks).unwrap_or_default();
            if seed != &expected_seed {
                return Err(ConsensusError::WrongEpochSeed);
            }

            let total_stake: f64 = stakers.iter().map(|s| s.amount).sum::<f64>() + staked_amt;
            if total_stake <= 0.0 {
                return Err(ConsensusError::RegimePredicateFailed);
            }
            if vrf_wins(*staked_amt, total_stake, vrf_proof) {
                Ok(())
            } else {
                Err(ConsensusError::RegimePredicateFailed)
            }
        }
    }
}

/// `y = int(sha256(vrf_proof)); threshold = staked_amt / total_stake *
/// 2^256`, computed by scaling `U256::MAX` by the stake fraction rather
/// than constructing `2^256` directly (which overflows `U256`). The
/// staker wins its VRF lottery iff `y < threshold`. Shared by the
/// validator and the PoS producer so both apply the identical rule.
#[must_use]
pub fn vrf_wins(staked_amt: f64, total_stake: f64, vrf_proof: &[u8]) -> bool {
    let y = U256::from_big_endian(&shared_crypto::sha256_bytes(vrf_proof));
    let fraction = (staked_amt / total_stake).clamp(0.0, 1.0);
    let scaled = (fraction * u64::MAX as f64) as u64;
    let threshold = U256::MAX / U256::from(u64::MAX) * U256::from(scaled);
    y < threshold
}

/// Validate every block of `blocks` under the prefix it extends,
/// including the whole-prefix duplicate-transaction check.
///
/// A replayed chain carries no record of the PoA round each block was
/// produced in, so every block is checked against round `0`: the
/// common case of an uninterrupted roster. A block produced after its
/// slot was skipped still needs its producer's live round to validate
/// and is checked that way on arrival, in [`is_valid_block`]'s own
/// caller, before it ever reaches this replay path.
pub fn is_valid_chain(blocks: &[Block], regime: Regime) -> Result<(), ConsensusError> {
    let mut prefix = Chain::empty();
    for block in blocks {
        is_valid_block(block, &prefix, regime, 0)?;
        prefix.blocks.push(block.clone());
    }
    Ok(())
}

/// Total PoS stake weight across an entire chain: the sum of every
/// block's `staked_amt` plus its epoch's stakers. Used by fork choice
/// to compare chain weight.
#[must_use]
pub fn chain_weight(blocks: &[Block]) -> f64 {
    blocks
        .iter()
        .map(|b| match &b.regime {
            RegimeFields::PoS { staked_amt, stakers, .. } => {
                staked_amt + stakers.iter().map(|s| s.amount).sum::<f64>()
            }
            _ => 0.0,
        })
        .sum()
}
