//! Inbound wire-message handling: one function per message type, called
//! from each connection's read task after the gossip gate admits it.

use base64::Engine;
use uuid::Uuid;

use qc_04_state_management::{check_admission, Pending};
use qc_05_block_propagation::{evaluate_remote_chain, gc_mempool, ReplicationOutcome};
use qc_08_consensus::{detect_equivocation, is_valid_block, mark_slashed, EquivocationVerdict};
use qc_10_signature_verification::{verify_stake, verify_transaction, SignatureSuite};
use qc_17_block_production::{verify_roster_update, RosterUpdate};
use shared_types::entities::{Block, Payload, Transaction};
use shared_types::regime::Regime;
use shared_types::wire::WireMessage;

use crate::state::NodeState;

/// Handle one inbound message from `from`, already admitted past the
/// gossip dedup gate.
pub async fn handle(state: &NodeState, from: &str, message: WireMessage) {
    match message {
        WireMessage::Ping { .. } => {
            state.send_to(from, &WireMessage::Pong { id: Uuid::new_v4() }).await;
        }
        WireMessage::Pong { .. } => {
            if let Ok(record) = state.self_record() {
                state.send_to(from, &qc_01_peer_discovery::on_pong(record)).await;
            }
        }
        WireMessage::AddPeer { id, data } | WireMessage::NewPeer { id, data } | WireMessage::PeerInfo { id, data } => {
            let own_key = qc_01_peer_discovery::peer_key(&data);
            let mut peers = state.peers.lock().await;
            if peers.name_taken(&data.name, &own_key) {
                let new_name = peers.uniquify_name(&data.name);
                drop(peers);
                state
                    .send_to(from, &WireMessage::ChangeName { id: Uuid::new_v4(), new_peer_msg_id: id, new_name })
                    .await;
            } else {
                drop(peers);
            }
            state.peers.lock().await.learn(data);
            let known = state.peers.lock().await.known_peers();
            state.send_to(from, &qc_01_peer_discovery::on_peer_announced(known)).await;
        }
        WireMessage::KnownPeers { peers, .. } => {
            for record in peers {
                state.peers.lock().await.learn(record);
            }
            for reply in qc_01_peer_discovery::on_known_peers(state.regime()) {
                state.send_to(from, &reply).await;
            }
        }
        WireMessage::ChangeName { .. } => {
            tracing::debug!(%from, "peer-assigned name change acknowledged, no local identity to rename");
        }
        WireMessage::ChainRequest { .. } => {
            let chain = state.chain.lock().await.blocks.clone();
            state.send_to(from, &WireMessage::Chain { id: Uuid::new_v4(), chain }).await;
        }
        WireMessage::Chain { chain: remote, .. } => handle_remote_chain(state, remote).await,
        WireMessage::NewTx { transaction, sign, sender_pem } => {
            handle_new_tx(state, from, transaction, sign, sender_pem).await;
        }
        WireMessage::NewBlock { block, .. } => handle_new_block(state, from, block).await,
        WireMessage::StakeAnnouncement { stake, .. } => {
            if state.regime() != Regime::PoS {
                return;
            }
            let suite = SignatureSuite::for_regime(state.regime());
            if verify_stake(&stake, suite).is_err() {
                tracing::debug!(%from, "dropping stake announcement with a bad signature");
                return;
            }
            let chain = state.chain.lock().await.blocks.clone();
            let mempool_snapshot: Vec<Transaction> = state.mempool.lock().await.iter().cloned().collect();
            let mut pos = state.pos.lock().await;
            let epoch_start = pos.epoch_start;
            let now = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0);
            let admitted = pos.epoch.submit(stake.clone(), now, epoch_start, &chain, &mempool_snapshot).is_ok();
            drop(pos);
            if admitted {
                relay(state, from, WireMessage::StakeAnnouncement { id: Uuid::new_v4(), stake }).await;
            }
        }
        WireMessage::SlashAnnouncement { evidence1, evidence2, pos, .. } => {
            handle_slash_announcement(state, from, evidence1, evidence2, pos).await;
        }
        WireMessage::MinersListUpdate { miners_list, activation_block, signature, .. } => {
            handle_roster_update(state, from, miners_list, activation_block, signature).await;
        }
        WireMessage::NetworkDetailsRequest { .. } => {
            let admin = state.admin_pem.lock().await.clone().unwrap_or_default();
            let miners = qc_16_api_gateway::NodeControl::get_miners(state).await;
            state.send_to(from, &WireMessage::NetworkDetails { id: Uuid::new_v4(), admin, miners }).await;
        }
        WireMessage::NetworkDetails { admin, miners, .. } => {
            let mut admin_pem = state.admin_pem.lock().await;
            if admin_pem.is_none() {
                *admin_pem = Some(admin);
            }
            drop(admin_pem);
            let mut poa = state.poa.lock().await;
            if poa.queue.is_empty() {
                poa.queue.push(RosterUpdate { miners_list: miners, activation_height: 0 });
            }
        }
        WireMessage::File { cid, desc, .. } => {
            state.files.lock().await.insert(cid, desc);
        }
    }
}

/// Rebuild a [`Transaction`] from its canonical signable string plus
/// the detached signature/sender pair carried on the wire, verify it,
/// and admit it into the mempool.
async fn handle_new_tx(state: &NodeState, from: &str, transaction: String, sign: String, sender_pem: String) {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&transaction) else {
        tracing::debug!(%from, "dropping new_tx with unparsable canonical string");
        return;
    };
    let Some(tx) = reconstruct_transaction(&value, &sender_pem, &sign) else {
        tracing::debug!(%from, "dropping new_tx with a malformed envelope");
        return;
    };

    let suite = SignatureSuite::for_regime(state.regime());
    if verify_transaction(&tx, suite).is_err() {
        tracing::debug!(%from, id = %tx.id, "dropping transaction with a bad signature");
        return;
    }

    let chain = state.chain.lock().await.blocks.clone();
    let mempool_snapshot: Vec<Transaction> = state.mempool.lock().await.iter().cloned().collect();
    let pending = Pending { transactions: &mempool_snapshot, stakes: &[] };
    if check_admission(&chain, &tx, state.regime(), pending).is_err() {
        tracing::debug!(%from, id = %tx.id, "dropping inadmissible transaction");
        return;
    }

    let chain_handle = state.chain.lock().await;
    let inserted = state.mempool.lock().await.insert(tx.clone(), &chain_handle).is_ok();
    drop(chain_handle);
    if inserted {
        relay(state, from, WireMessage::NewTx { id: Uuid::new_v4(), transaction, sign, sender_pem }).await;
    }
}

fn reconstruct_transaction(value: &serde_json::Value, sender_pem: &str, sign: &str) -> Option<Transaction> {
    let id: Uuid = serde_json::from_value(value.get("id")?.clone()).ok()?;
    let payload: Payload = serde_json::from_value(value.get("payload")?.clone()).ok()?;
    let receiver = value.get("receiver")?.as_str()?.to_string();
    let timestamp = value.get("timestamp")?.as_f64()?;
    let signature = base64::engine::general_purpose::STANDARD.decode(sign).ok()?;
    Some(Transaction {
        id,
        payload,
        sender: sender_pem.to_string(),
        receiver,
        timestamp,
        signature: Some(signature),
    })
}

/// A directly produced block: either it extends the current tip (the
/// common case) or, under PoS, it is a sibling of the tip signed by the
/// same creator — possible equivocation.
async fn handle_new_block(state: &NodeState, from: &str, block: Block) {
    let mut chain = state.chain.lock().await;
    let regime = state.regime();

    if let Some(tip) = chain.tip() {
        if regime == Regime::PoS && tip.prev_hash == block.prev_hash && tip.id != block.id {
            let suite = SignatureSuite::for_regime(regime);
            match detect_equivocation(tip, &block, suite) {
                EquivocationVerdict::BothSigned => {
                    let mut slashed_tip = tip.clone();
                    mark_slashed(&mut slashed_tip);
                    let mut slashed_remote = block.clone();
                    mark_slashed(&mut slashed_remote);
                    let len = chain.blocks.len();
                    chain.blocks[len - 1] = slashed_tip.clone();
                    drop(chain);
                    relay(
                        state,
                        from,
                        WireMessage::SlashAnnouncement {
                            id: Uuid::new_v4(),
                            evidence1: slashed_tip,
                            evidence2: slashed_remote,
                            block1_sign: String::new(),
                            block2_sign: String::new(),
                            pos: (len - 1) as u64,
                        },
                    )
                    .await;
                    return;
                }
                EquivocationVerdict::OneCanonical { local_is_canonical: false } => {
                    let len = chain.blocks.len();
                    chain.blocks[len - 1] = block;
                    return;
                }
                _ => {}
            }
            return;
        }
    }

    let expects_tip_extension = block.prev_hash == chain.tip().map(Block::hash);
    if !expects_tip_extension {
        drop(chain);
        tracing::debug!(%from, "dropping a block that does not extend the known tip");
        return;
    }

    let snapshot = chain.clone();
    let round = state.poa.lock().await.advancer.round();
    if is_valid_block(&block, &snapshot, regime, round).is_err() {
        drop(chain);
        tracing::debug!(%from, "rejecting an invalid block");
        return;
    }

    if regime == Regime::PoW {
        let _ = state.mining_cancel.send(());
    }
    chain.blocks.push(block.clone());
    drop(chain);

    gc_mempool(&mut *state.mempool.lock().await, std::slice::from_ref(&block));
    if regime == Regime::PoA {
        state.poa.lock().await.advancer.reset();
    }
    let _ = state.persist().await;
    relay(state, from, WireMessage::NewBlock { id: Uuid::new_v4(), block, vrf_proof: None, sign: None }).await;
}

async fn handle_remote_chain(state: &NodeState, remote: Vec<Block>) {
    let regime = state.regime();
    let local = state.chain.lock().await.blocks.clone();
    if evaluate_remote_chain(&local, &remote, regime) != ReplicationOutcome::Adopt {
        return;
    }
    let mut chain = state.chain.lock().await;
    if chain.rewrite(remote.clone()) {
        drop(chain);
        gc_mempool(&mut *state.mempool.lock().await, &remote);
        if regime == Regime::PoW {
            let _ = state.mining_cancel.send(());
        }
        let _ = state.persist().await;
    }
}

async fn handle_slash_announcement(state: &NodeState, from: &str, evidence1: Block, evidence2: Block, pos: u64) {
    if state.regime() != Regime::PoS {
        return;
    }
    let suite = SignatureSuite::for_regime(Regime::PoS);
    if !matches!(detect_equivocation(&evidence1, &evidence2, suite), EquivocationVerdict::BothSigned) {
        tracing::debug!(%from, "dropping a slash announcement that does not prove equivocation");
        return;
    }
    let mut chain = state.chain.lock().await;
    let idx = pos as usize;
    if let Some(local_block) = chain.blocks.get_mut(idx) {
        if local_block.id == evidence1.id || local_block.id == evidence2.id {
            mark_slashed(local_block);
        }
    }
}

async fn handle_roster_update(state: &NodeState, from: &str, miners_list: Vec<String>, activation_block: u64, signature: String) {
    if state.regime() != Regime::PoA {
        return;
    }
    let Some(admin_pem) = state.admin_pem.lock().await.clone() else {
        tracing::debug!(%from, "dropping a roster update before learning the admin key");
        return;
    };
    if verify_roster_update(&miners_list, activation_block, &signature, &admin_pem).is_err() {
        tracing::debug!(%from, "dropping a roster update with a bad admin signature");
        return;
    }
    state.poa.lock().await.queue.push(RosterUpdate {
        miners_list: miners_list.clone(),
        activation_height: activation_block as usize,
    });
    relay(
        state,
        from,
        WireMessage::MinersListUpdate { id: Uuid::new_v4(), miners_list, activation_block, signature },
    )
    .await;
}

/// Relay an admitted message to every peer except the one it arrived
/// from.
async fn relay(state: &NodeState, from: &str, message: WireMessage) {
    let text = match serde_json::to_string(&message) {
        Ok(text) => text,
        Err(_) => return,
    };
    let connections = state.connections.lock().await;
    for (endpoint, sink) in connections.iter() {
        if endpoint != from {
            let _ = sink.send(tokio_tungstenite::tungstenite::Message::Text(text.clone()));
        }
    }
}

/// `true` if `message` has not been handled before and should proceed
/// to [`handle`]; `false` if it is a re-delivery to drop silently.
pub async fn admit(state: &NodeState, message: &WireMessage) -> bool {
    state.gossip.lock().await.admit(message)
}
