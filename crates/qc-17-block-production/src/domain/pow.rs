//! Proof-of-Work producer: candidate assembly and the cancelable,
//! parallel nonce search.

use qc_compute::{ComputeEngine, NonceCheck};
use shared_types::entities::{Block, RegimeFields, Transaction};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

use super::errors::ProductionError;

/// Five ASCII zeroes: the fixed PoW difficulty target.
pub const POW_PREFIX: &str = "00000";

/// Nonces searched per round-trip to the compute engine, between
/// cancellation checks.
const SEARCH_CHUNK: u64 = 200_000;

/// Assemble an unsolved candidate (nonce 0) extending `tip` with a
/// mempool snapshot.
#[must_use]
pub fn candidate_block(tip: Option<&Block>, mempool_txs: Vec<Transaction>, timestamp: f64) -> Block {
    Block {
        id: Uuid::new_v4(),
        prev_hash: tip.map(Block::hash),
        timestamp,
        transactions: mempool_txs,
        files: BTreeMap::new(),
        regime: RegimeFields::PoW { nonce: 0 },
    }
}

/// Search for a nonce that makes `candidate`'s hash begin with
/// [`POW_PREFIX`], restarting in [`SEARCH_CHUNK`]-sized ranges so
/// `cancel` is checked regularly. A new value on `cancel` (e.g. a
/// competing block accepted at the same height) aborts the search.
pub async fn mine(
    candidate: Block,
    engine: Arc<dyn ComputeEngine>,
    cancel: watch::Receiver<()>,
) -> Result<Block, ProductionError> {
    mine_with_prefix(candidate, POW_PREFIX, engine, cancel).await
}

async fn mine_with_prefix(
    mut candidate: Block,
    prefix: &str,
    engine: Arc<dyn ComputeEngine>,
    mut cancel: watch::Receiver<()>,
) -> Result<Block, ProductionError> {
    let mut nonce_start = 0u64;
    loop {
        let template = candidate.clone();
        let prefix = prefix.to_string();
        let check: NonceCheck = Arc::new(move |nonce: u64| {
            let mut b = template.clone();
            b.regime = RegimeFields::PoW { nonce };
            b.hash().starts_with(&prefix)
        });

        let search = engine.search_nonce(check, nonce_start, SEARCH_CHUNK);
        tokio::pin!(search);
        let found = tokio::select! {
            biased;
            _ = cancel.changed() => return Err(ProductionError::Canceled),
            result = &mut search => result.map_err(|_| ProductionError::Canceled)?,
        };

        if let Some(nonce) = found {
            candidate.regime = RegimeFields::PoW { nonce };
            return Ok(candidate);
        }
        nonce_start += SEARCH_CHUNK;
    }
}
