//! The periodic background work every node runs alongside its listener:
//! peer discovery, gossip sampling, chain-request broadcasting, and
//! whichever regime's block producer applies.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use uuid::Uuid;

use qc_05_block_propagation::gc_mempool;
use qc_09_finality::epoch_seed;
use qc_17_block_production::{
    candidate_block, compute_vrf_proof, current_roster, epoch_elapsed, mine, require_my_slot,
    wins_lottery, ProductionError, EPOCH_SECS,
};
use shared_types::entities::{Block, RegimeFields, Transaction};
use shared_types::regime::Regime;
use shared_types::wire::WireMessage;

use crate::state::NodeState;

const PEER_DISCOVERY_INTERVAL: Duration = Duration::from_secs(30);
const GOSSIP_SAMPLER_INTERVAL: Duration = Duration::from_secs(60);
const CHAIN_REQUEST_INTERVAL: Duration = Duration::from_secs(60);
const POA_ROUND_INTERVAL: Duration = Duration::from_secs(10);
const POA_SLOT_CHECK_INTERVAL: Duration = Duration::from_secs(30);

fn now() -> f64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs_f64()).unwrap_or(0.0)
}

/// Spawn every periodic task this node needs, plus its regime's
/// producer loop. Each task exits on its own once `state.shutdown`
/// flips.
pub fn spawn_all(state: Arc<NodeState>) -> Vec<tokio::task::JoinHandle<()>> {
    let mut handles = vec![
        tokio::spawn(peer_discovery_loop(Arc::clone(&state))),
        tokio::spawn(gossip_sampler_loop(Arc::clone(&state))),
        tokio::spawn(chain_request_loop(Arc::clone(&state))),
    ];
    match state.regime() {
        Regime::PoW => handles.push(tokio::spawn(pow_miner_loop(Arc::clone(&state)))),
        Regime::PoS => handles.push(tokio::spawn(pos_epoch_loop(Arc::clone(&state)))),
        Regime::PoA => {
            handles.push(tokio::spawn(poa_round_advancer_loop(Arc::clone(&state))));
            handles.push(tokio::spawn(poa_slot_check_loop(state)));
        }
    }
    handles
}

async fn until_shutdown(state: &NodeState, interval: Duration) -> bool {
    let mut shutdown = state.shutdown.subscribe();
    if *shutdown.borrow() {
        return false;
    }
    tokio::select! {
        _ = tokio::time::sleep(interval) => true,
        _ = shutdown.changed() => !*shutdown.borrow(),
    }
}

async fn peer_discovery_loop(state: Arc<NodeState>) {
    loop {
        if !until_shutdown(&state, PEER_DISCOVERY_INTERVAL).await {
            return;
        }
        let candidate = {
            let peers = state.peers.lock().await;
            if !peers.has_free_slot() {
                continue;
            }
            peers.discovery_candidate()
        };
        let Some(candidate) = candidate else { continue };
        let endpoint = format!("{}:{}", candidate.host, candidate.port);
        let dial_state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(err) = crate::transport::dial(dial_state, endpoint.clone()).await {
                tracing::debug!(%endpoint, error = %err, "peer discovery dial failed");
            }
        });
    }
}

async fn gossip_sampler_loop(state: Arc<NodeState>) {
    loop {
        if !until_shutdown(&state, GOSSIP_SAMPLER_INTERVAL).await {
            return;
        }
        let swap = state.peers.lock().await.sampler_swap();
        let Some((drop_endpoint, add_candidate)) = swap else { continue };
        state.connections.lock().await.remove(&drop_endpoint);
        state.peers.lock().await.mark_disconnected(&drop_endpoint);

        let endpoint = format!("{}:{}", add_candidate.host, add_candidate.port);
        let dial_state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(err) = crate::transport::dial(dial_state, endpoint.clone()).await {
                tracing::debug!(%endpoint, error = %err, "gossip sampler dial failed");
            }
        });
    }
}

async fn chain_request_loop(state: Arc<NodeState>) {
    loop {
        if !until_shutdown(&state, CHAIN_REQUEST_INTERVAL).await {
            return;
        }
        state.broadcast(&WireMessage::ChainRequest { id: Uuid::new_v4() }).await;
    }
}

/// Accept a freshly produced block the same way an inbound `NewBlock`
/// would be accepted: append it, garbage-collect the mempool, persist,
/// and broadcast it onward.
async fn accept_own_block(state: &NodeState, block: Block) {
    state.chain.lock().await.blocks.push(block.clone());
    gc_mempool(&mut *state.mempool.lock().await, std::slice::from_ref(&block));
    let _ = state.persist().await;
    state
        .broadcast(&WireMessage::NewBlock { id: Uuid::new_v4(), block, vrf_proof: None, sign: None })
        .await;
}

async fn pow_miner_loop(state: Arc<NodeState>) {
    let engine = match qc_compute::auto_detect() {
        Ok(engine) => engine,
        Err(err) => {
            tracing::error!(error = %err, "no compute engine available, PoW mining disabled");
            return;
        }
    };
    let mut shutdown = state.shutdown.subscribe();
    loop {
        if *shutdown.borrow() {
            return;
        }
        let tip = state.chain.lock().await.tip().cloned();
        let mempool_txs: Vec<Transaction> = state.mempool.lock().await.iter().cloned().collect();
        let candidate = candidate_block(tip.as_ref(), mempool_txs, now());
        let cancel = state.mining_cancel.subscribe();

        tokio::select! {
            _ = shutdown.changed() => return,
            result = mine(candidate, Arc::clone(&engine), cancel) => {
                match result {
                    Ok(block) => accept_own_block(&state, block).await,
                    Err(ProductionError::Canceled) => {}
                    Err(err) => tracing::debug!(error = %err, "PoW mining attempt failed"),
                }
            }
        }
    }
}

async fn pos_epoch_loop(state: Arc<NodeState>) {
    loop {
        if !until_shutdown(&state, Duration::from_secs_f64(EPOCH_SECS / 2.0)).await {
            return;
        }

        let now = now();
        let epoch_start = state.pos.lock().await.epoch_start;
        if !epoch_elapsed(now, epoch_start) {
            continue;
        }

        try_produce_pos_block(&state, now).await;

        let mut pos = state.pos.lock().await;
        pos.epoch_start = now;
        pos.epoch = qc_17_block_production::EpochStakes::new();
    }
}

async fn try_produce_pos_block(state: &NodeState, now: f64) {
    let Some(keypair) = state.wallet.secp256k1_keypair() else { return };
    let creator_pem = match state.wallet.public_key_pem() {
        Ok(pem) => pem,
        Err(_) => return,
    };

    let chain = state.chain.lock().await.blocks.clone();
    let seed = epoch_seed(&chain).unwrap_or_default();
    let proof = compute_vrf_proof(keypair, &seed);

    let pos = state.pos.lock().await;
    let stakers = pos.epoch.stakes();
    // `own_stake`'s own submission already lives in `stakers` once
    // `send_stake_announcement` has run this epoch, so the lottery
    // total is the plain sum, not `stakers` plus `own_stake` again.
    let total_stake = pos.epoch.total_with(0.0);
    let own_stake = pos.own_stake;
    drop(pos);

    if own_stake <= 0.0 || total_stake <= 0.0 {
        return;
    }
    if !wins_lottery(own_stake, total_stake, &proof) {
        return;
    }

    let mempool_snapshot: Vec<Transaction> = state.mempool.lock().await.iter().cloned().collect();

    let block = qc_17_block_production::assemble_block(
        chain.last(),
        mempool_snapshot,
        stakers,
        &creator_pem,
        own_stake,
        seed,
        proof,
        now,
        keypair,
    );
    accept_own_block(state, block).await;
}

async fn poa_round_advancer_loop(state: Arc<NodeState>) {
    loop {
        if !until_shutdown(&state, POA_ROUND_INTERVAL).await {
            return;
        }
        let mempool_nonempty = !state.mempool.lock().await.is_empty();
        state.poa.lock().await.advancer.tick(POA_ROUND_INTERVAL, mempool_nonempty);
    }
}

async fn poa_slot_check_loop(state: Arc<NodeState>) {
    loop {
        if !until_shutdown(&state, POA_SLOT_CHECK_INTERVAL).await {
            return;
        }
        try_produce_poa_block(&state).await;
    }
}

async fn try_produce_poa_block(state: &NodeState) {
    let Some(keypair) = state.wallet.secp256k1_keypair() else { return };
    let miner_pem = match state.wallet.public_key_pem() {
        Ok(pem) => pem,
        Err(_) => return,
    };

    let chain = state.chain.lock().await.blocks.clone();
    let fallback = match chain.last().map(|b| &b.regime) {
        Some(RegimeFields::PoA { miners_list, .. }) => miners_list.clone(),
        _ => state.config.initial_miners.clone(),
    };
    let poa = state.poa.lock().await;
    let roster = current_roster(&poa.queue, chain.len(), &fallback);
    let round = poa.advancer.round();
    drop(poa);

    if require_my_slot(&state.node_id, &roster, chain.len(), round).is_err() {
        return;
    }

    let mempool_txs: Vec<Transaction> = state.mempool.lock().await.iter().cloned().collect();
    let mut block = Block {
        id: Uuid::new_v4(),
        prev_hash: chain.last().map(Block::hash),
        timestamp: now(),
        transactions: mempool_txs,
        files: Default::default(),
        regime: RegimeFields::PoA {
            miner_node_id: state.node_id.clone(),
            miner_public_key: miner_pem,
            miners_list: roster,
            signature: None,
        },
    };
    let signature = hex::encode(keypair.sign(&block.signable_bytes()).as_bytes());
    if let RegimeFields::PoA { signature: slot, .. } = &mut block.regime {
        *slot = Some(signature);
    }

    state.poa.lock().await.advancer.reset();
    accept_own_block(state, block).await;
}
