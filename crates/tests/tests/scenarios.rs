//! Multi-node scenario tests: each drives one or two in-process
//! `NodeState`s through `dispatch::handle`/the `NodeControl` port the
//! same way a real peer connection would, rather than poking at any
//! single crate's internals.
//!
//! Every chain fixture here seeds its own Genesis block directly into
//! `chain.blocks`, matching the convention the rest of this workspace's
//! tests already use — Genesis's sentinel transaction is never replayed
//! through `is_valid_block`/`is_valid_chain`.

use std::collections::BTreeMap;

use uuid::Uuid;

use node_runtime::dispatch;
use node_runtime::state::test_support;
use qc_16_api_gateway::{GatewayError, NodeControl, TxRequest};
use qc_17_block_production::assemble_block;
use shared_crypto::Secp256k1KeyPair;
use shared_types::entities::{Block, Chain, Payload, RegimeFields, Transaction, GENESIS_AMOUNT};
use shared_types::regime::Regime;
use shared_types::wire::WireMessage;

fn new_block_message(block: Block) -> WireMessage {
    WireMessage::NewBlock { id: Uuid::new_v4(), block, vrf_proof: None, sign: None }
}

/// Brute-force a PoW block extending `prev` (or Genesis if `None`) that
/// meets the fixed difficulty target.
fn mine_pow_block(prev: Option<&Block>, transactions: Vec<Transaction>) -> Block {
    let mut nonce = 0u64;
    loop {
        let block = Block {
            id: Uuid::new_v4(),
            prev_hash: prev.map(Block::hash),
            timestamp: 0.0,
            transactions: transactions.clone(),
            files: BTreeMap::new(),
            regime: RegimeFields::PoW { nonce },
        };
        if block.hash().starts_with("00000") {
            return block;
        }
        nonce += 1;
    }
}

async fn seed_pow_genesis(state: &node_runtime::state::NodeState, receiver_pem: &str) {
    let genesis_tx = Chain::genesis_transaction(receiver_pem, Uuid::new_v4(), 0.0);
    let genesis = mine_pow_block(None, vec![genesis_tx]);
    state.chain.lock().await.blocks.push(genesis);
}

fn signed_value_tx(keypair: &Secp256k1KeyPair, receiver: &str, amount: f64) -> Transaction {
    let mut tx = Transaction {
        id: Uuid::new_v4(),
        payload: Payload::Value(amount),
        sender: keypair.public_key().export_pem().unwrap(),
        receiver: receiver.to_string(),
        timestamp: 0.0,
        signature: None,
    };
    tx.signature = Some(keypair.sign(&tx.signable_bytes()).as_bytes().to_vec());
    tx
}

fn poa_block(keypair: &Secp256k1KeyPair, prev: Option<String>, miner_node_id: &str, miners_list: Vec<String>, transactions: Vec<Transaction>) -> Block {
    let pem = keypair.public_key().export_pem().unwrap();
    let mut block = Block {
        id: Uuid::new_v4(),
        prev_hash: prev,
        timestamp: 0.0,
        transactions,
        files: BTreeMap::new(),
        regime: RegimeFields::PoA {
            miner_node_id: miner_node_id.to_string(),
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

fn pos_genesis(creator_pem: &str) -> Block {
    Block {
        id: Uuid::new_v4(),
        prev_hash: None,
        timestamp: 0.0,
        transactions: vec![],
        files: BTreeMap::new(),
        regime: RegimeFields::PoS {
            creator: creator_pem.to_string(),
            staked_amt: 10.0,
            stakers: vec![],
            seed: "seed".to_string(),
            vrf_proof: vec![],
            signature: None,
            is_valid: true,
            slash_creator: false,
        },
    }
}

#[tokio::test]
async fn genesis_balance_is_spendable_immediately_and_after_the_chain_grows() {
    let state = test_support::build(Regime::PoW);
    let pem = state.wallet.public_key_pem().unwrap();
    seed_pow_genesis(&state, &pem).await;

    assert_eq!(state.get_balance(&pem).await, GENESIS_AMOUNT);

    // Pad the chain well past every finality cutoff step in the table;
    // Genesis sits at index 0, always inside the finalized prefix.
    let mut tip = state.get_chain().await.last().cloned().unwrap();
    for _ in 0..8 {
        let next = mine_pow_block(Some(&tip), vec![]);
        state.chain.lock().await.blocks.push(next.clone());
        tip = next;
    }
    assert_eq!(state.get_balance(&pem).await, GENESIS_AMOUNT);
}

#[tokio::test]
async fn a_second_spend_is_rejected_while_the_first_is_still_pending() {
    let state = test_support::build(Regime::PoW);
    let pem = state.wallet.public_key_pem().unwrap();
    seed_pow_genesis(&state, &pem).await;

    state
        .create_and_broadcast_tx(TxRequest::Value { receiver: "bob-pem".to_string(), amount: GENESIS_AMOUNT })
        .await
        .unwrap();

    let err = state
        .create_and_broadcast_tx(TxRequest::Value { receiver: "carol-pem".to_string(), amount: GENESIS_AMOUNT })
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::InsufficientBalance));
    assert_eq!(state.get_mempool().await.len(), 1);
}

#[tokio::test]
async fn a_mined_block_extends_the_chain_and_clears_its_transaction_from_the_mempool() {
    let state = test_support::build(Regime::PoW);
    let pem = state.wallet.public_key_pem().unwrap();
    seed_pow_genesis(&state, &pem).await;

    let tx_id = state
        .create_and_broadcast_tx(TxRequest::Value { receiver: "bob-pem".to_string(), amount: 10.0 })
        .await
        .unwrap();
    let mempool_tx = state.get_mempool().await.into_iter().find(|t| t.id == tx_id).unwrap();

    let tip = state.get_chain().await.last().cloned().unwrap();
    let mined = mine_pow_block(Some(&tip), vec![mempool_tx]);
    dispatch::handle(&state, "peer-a", new_block_message(mined)).await;

    assert_eq!(state.get_chain().await.len(), 2);
    assert!(state.get_mempool().await.is_empty());
}

#[tokio::test]
async fn poa_blocks_are_accepted_only_from_the_roster_slot_whose_turn_it_is() {
    let state = test_support::build(Regime::PoA);
    let a = Secp256k1KeyPair::generate();
    let b = Secp256k1KeyPair::generate();
    let roster = vec!["a".to_string(), "b".to_string()];

    let genesis = poa_block(&a, None, "a", roster.clone(), vec![]);
    let genesis_hash = genesis.hash();
    state.chain.lock().await.blocks.push(genesis);

    // chain_len is 1, round 0 -> slot (1 + 0) % 2 belongs to "b", not "a".
    let off_turn = poa_block(&a, Some(genesis_hash.clone()), "a", roster.clone(), vec![]);
    dispatch::handle(&state, "peer-a", new_block_message(off_turn)).await;
    assert_eq!(state.get_chain().await.len(), 1, "an off-turn block must not extend the chain");

    let on_turn = poa_block(&b, Some(genesis_hash), "b", roster, vec![]);
    dispatch::handle(&state, "peer-b", new_block_message(on_turn)).await;
    assert_eq!(state.get_chain().await.len(), 2);
}

#[tokio::test]
async fn two_pos_blocks_from_the_same_creator_at_the_same_height_are_slashed() {
    let state = test_support::build(Regime::PoS);
    let keypair = Secp256k1KeyPair::generate();
    let creator_pem = keypair.public_key().export_pem().unwrap();

    let genesis = pos_genesis(&creator_pem);
    let first = assemble_block(Some(&genesis), vec![], vec![], &creator_pem, 10.0, "seed".to_string(), vec![], 1.0, &keypair);
    state.chain.lock().await.blocks.push(genesis);
    state.chain.lock().await.blocks.push(first);

    // Same parent, same creator, different id: a sibling of the
    // current tip rather than an extension of it.
    let sibling = assemble_block(Some(&state.get_chain().await[0].clone()), vec![], vec![], &creator_pem, 10.0, "seed".to_string(), vec![], 2.0, &keypair);
    dispatch::handle(&state, "peer-a", new_block_message(sibling)).await;

    let chain = state.get_chain().await;
    assert_eq!(chain.len(), 2, "the equivocating sibling replaces the tip in place, it is never appended");
    match &chain[1].regime {
        RegimeFields::PoS { is_valid, slash_creator, .. } => {
            assert!(!is_valid);
            assert!(slash_creator);
        }
        other => panic!("expected a PoS block, got {other:?}"),
    }
}

#[tokio::test]
async fn a_longer_valid_remote_chain_with_a_real_transaction_replaces_the_shorter_local_one() {
    let state = test_support::build(Regime::PoA);
    let miner = Secp256k1KeyPair::generate();
    let miner_pem = miner.public_key().export_pem().unwrap();
    let roster = vec!["miner".to_string()];

    let local_genesis = poa_block(&miner, None, "miner", roster.clone(), vec![]);
    state.chain.lock().await.blocks.push(local_genesis.clone());

    // The remote chain earns the miner three block rewards (18 total)
    // before spending 10 of it in the final block, so the embedded
    // transaction is admissible purely off miner-reward balance.
    let mut remote = vec![local_genesis.clone()];
    for _ in 0..2 {
        let prev_hash = remote.last().unwrap().hash();
        remote.push(poa_block(&miner, Some(prev_hash), "miner", roster.clone(), vec![]));
    }
    let spend = signed_value_tx(&miner, "someone-else-pem", 10.0);
    let prev_hash = remote.last().unwrap().hash();
    remote.push(poa_block(&miner, Some(prev_hash), "miner", roster.clone(), vec![spend]));

    dispatch::handle(&state, "peer-a", WireMessage::Chain { id: Uuid::new_v4(), chain: remote.clone() }).await;

    let chain = state.get_chain().await;
    assert_eq!(chain.len(), remote.len());
    assert_eq!(state.get_balance(&miner_pem).await, 4.0 * 6.0 - 10.0);
}
