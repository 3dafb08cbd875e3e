//! Proof-of-Stake producer: the epoch's stake window, VRF lottery, and
//! winning-block assembly.

use qc_04_state_management::{check_stake_admission, Pending};
use qc_08_consensus::vrf_wins;
use shared_crypto::Secp256k1KeyPair;
use shared_types::entities::{Block, RegimeFields, Stake, Transaction};
use shared_types::regime::Regime;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use super::errors::ProductionError;

/// Nominal epoch length.
pub const EPOCH_SECS: f64 = 60.0;

/// Stake submissions close at `5/6` of the epoch, leaving a window for
/// the VRF lottery and block assembly before the next epoch starts.
#[must_use]
pub fn stake_window_open(now: f64, epoch_start: f64) -> bool {
    now - epoch_start < (5.0 / 6.0) * EPOCH_SECS
}

/// Whether the epoch has fully elapsed and a new one should begin.
#[must_use]
pub fn epoch_elapsed(now: f64, epoch_start: f64) -> bool {
    now - epoch_start >= EPOCH_SECS
}

/// Stakes submitted during the current epoch, at most one per staker.
#[derive(Debug, Default)]
pub struct EpochStakes {
    by_staker: HashMap<String, Stake>,
}

impl EpochStakes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `stake`, rejecting it outside the submission window, if
    /// this staker already submitted this epoch, or if it fails the
    /// balance admission rule.
    pub fn submit(
        &mut self,
        stake: Stake,
        now: f64,
        epoch_start: f64,
        blocks: &[Block],
        pending_transactions: &[Transaction],
    ) -> Result<(), ProductionError> {
        if !stake_window_open(now, epoch_start) {
            return Err(ProductionError::StakeWindowClosed);
        }
        if self.by_staker.contains_key(&stake.staker) {
            return Err(ProductionError::DuplicateStake(stake.id));
        }
        let existing: Vec<Stake> = self.by_staker.values().cloned().collect();
        let mut pending_stakes = existing;
        let pending = Pending { transactions: pending_transactions, stakes: &pending_stakes };
        check_stake_admission(blocks, &stake, Regime::PoS, pending).map_err(|_| ProductionError::NoStake)?;
        pending_stakes.clear();
        self.by_staker.insert(stake.staker.clone(), stake);
        Ok(())
    }

    #[must_use]
    pub fn stakes(&self) -> Vec<Stake> {
        self.by_staker.values().cloned().collect()
    }

    /// Total stake across this epoch's stakers plus `own_stake` (the
    /// local node's own deposit, tracked separately from `stakers`).
    #[must_use]
    pub fn total_with(&self, own_stake: f64) -> f64 {
        self.by_staker.values().map(|s| s.amount).sum::<f64>() + own_stake
    }
}

/// `proof = sign(epoch_seed)` under the staker's own key.
#[must_use]
pub fn compute_vrf_proof(keypair: &Secp256k1KeyPair, seed: &str) -> Vec<u8> {
    keypair.sign(seed.as_bytes()).as_bytes().to_vec()
}

/// Whether this staker's proof wins the epoch's VRF lottery.
#[must_use]
pub fn wins_lottery(staked_amt: f64, total_stake: f64, proof: &[u8]) -> bool {
    vrf_wins(staked_amt, total_stake, proof)
}

/// Assemble and sign the winning block.
#[must_use]
pub fn assemble_block(
    tip: Option<&Block>,
    mempool_txs: Vec<Transaction>,
    stakers: Vec<Stake>,
    creator_pem: &str,
    staked_amt: f64,
    seed: String,
    vrf_proof: Vec<u8>,
    timestamp: f64,
    keypair: &Secp256k1KeyPair,
) -> Block {
    let mut block = Block {
        id: Uuid::new_v4(),
        prev_hash: tip.map(Block::hash),
        timestamp,
        transactions: mempool_txs,
        files: BTreeMap::new(),
        regime: RegimeFields::PoS {
            creator: creator_pem.to_string(),
            staked_amt,
            stakers,
            seed,
            vrf_proof,
            signature: None,
            is_valid: true,
            slash_creator: false,
        },
    };
    let signature = keypair.sign(&block.signable_bytes());
    if let RegimeFields::PoS { signature: slot, .. } = &mut block.regime {
        *slot = Some(signature.as_bytes().to_vec());
    }
    block
}
