//! Implements qc-16's [`NodeControl`] port against a live [`NodeState`],
//! the only thing the status API is allowed to touch.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use base64::Engine;
use uuid::Uuid;

use qc_04_state_management::{balance, check_admission};
use qc_04_state_management::Pending as BalancePending;
use qc_16_api_gateway::{GatewayError, NodeControl, TxRequest};
use qc_17_block_production::{current_roster, roster_update_signable_bytes, RosterUpdate};
use shared_types::entities::{
    Block, Payload, Stake, Transaction, DEPLOY_RECEIVER, INVOKE_RECEIVER,
};
use shared_types::regime::Regime;
use shared_types::wire::{PeerRecord, WireMessage};

use crate::state::NodeState;

fn now() -> f64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs_f64()).unwrap_or(0.0)
}

fn current_miners_list(tip: Option<&Block>, fallback: &[String]) -> Vec<String> {
    match tip.map(|b| &b.regime) {
        Some(shared_types::entities::RegimeFields::PoA { miners_list, .. }) => miners_list.clone(),
        _ => fallback.to_vec(),
    }
}

/// The code a prior `deploy` transaction recorded under `contract_id`
/// (its own transaction id), searched across the whole chain.
fn find_contract_code(chain: &[Block], contract_id: &str) -> Option<String> {
    chain.iter().flat_map(|b| &b.transactions).find_map(|tx| match &tx.payload {
        Payload::Deploy { code, .. } if tx.id.to_string() == contract_id => Some(code.clone()),
        _ => None,
    })
}

#[async_trait]
impl NodeControl for NodeState {
    fn node_id(&self) -> String {
        self.node_id.clone()
    }

    fn regime(&self) -> Regime {
        self.config.regime
    }

    async fn create_and_broadcast_tx(&self, request: TxRequest) -> Result<Uuid, GatewayError> {
        let (payload, receiver) = match request {
            TxRequest::Value { receiver, amount } => (Payload::Value(amount), receiver),
            TxRequest::Deploy { code, amount } => (Payload::Deploy { code, amount }, DEPLOY_RECEIVER.to_string()),
            TxRequest::Invoke { contract_id, function, args, state, amount } => {
                let chain = self.chain.lock().await;
                let code = find_contract_code(&chain.blocks, &contract_id)
                    .ok_or_else(|| GatewayError::BadTransaction(format!("unknown contract '{contract_id}'")))?;
                drop(chain);
                let outcome = self
                    .executor
                    .run(&code, &function, &args, &state)
                    .map_err(|err| GatewayError::BadTransaction(err.to_string()))?;
                (
                    Payload::Invoke { contract_id, function, args, state: outcome.state, amount },
                    INVOKE_RECEIVER.to_string(),
                )
            }
        };

        let sender = self.wallet.public_key_pem().map_err(|_| GatewayError::InsufficientBalance)?;
        let mut tx = Transaction {
            id: Uuid::new_v4(),
            payload,
            sender,
            receiver,
            timestamp: now(),
            signature: None,
        };
        tx.signature = Some(self.wallet.sign(&tx.signable_bytes()));

        let chain = self.chain.lock().await;
        let mempool_snapshot: Vec<Transaction> = self.mempool.lock().await.iter().cloned().collect();
        let pending = BalancePending { transactions: &mempool_snapshot, stakes: &[] };
        check_admission(&chain.blocks, &tx, self.config.regime, pending).map_err(|err| match err {
            qc_04_state_management::StateError::NonPositiveAmount(_) => GatewayError::NonPositiveAmount,
            _ => GatewayError::InsufficientBalance,
        })?;
        let chain_snapshot = chain.clone();
        drop(chain);

        self.mempool
            .lock()
            .await
            .insert(tx.clone(), &chain_snapshot)
            .map_err(|_| GatewayError::InsufficientBalance)?;

        let text = tx.signable_json().to_string();
        let sign = base64::engine::general_purpose::STANDARD.encode(tx.signature.as_deref().unwrap_or_default());
        self.broadcast(&WireMessage::NewTx {
            id: Uuid::new_v4(),
            transaction: text,
            sign,
            sender_pem: tx.sender.clone(),
        })
        .await;

        Ok(tx.id)
    }

    async fn stop(&self) {
        let _ = self.shutdown.send(true);
    }

    async fn get_chain(&self) -> Vec<Block> {
        self.chain.lock().await.blocks.clone()
    }

    async fn get_balance(&self, public_key_pem: &str) -> f64 {
        let chain = self.chain.lock().await;
        let mempool_snapshot: Vec<Transaction> = self.mempool.lock().await.iter().cloned().collect();
        let stakes: Vec<Stake> = if self.config.regime == Regime::PoS {
            self.pos.lock().await.epoch.stakes()
        } else {
            Vec::new()
        };
        let pending = BalancePending { transactions: &mempool_snapshot, stakes: &stakes };
        balance(&chain.blocks, public_key_pem, self.config.regime, pending)
    }

    async fn get_mempool(&self) -> Vec<Transaction> {
        self.mempool.lock().await.iter().cloned().collect()
    }

    async fn get_peers(&self) -> Vec<PeerRecord> {
        self.peers.lock().await.known_peers()
    }

    async fn get_miners(&self) -> Vec<String> {
        if self.config.regime != Regime::PoA {
            return Vec::new();
        }
        let chain = self.chain.lock().await;
        let fallback = current_miners_list(chain.tip(), &self.config.initial_miners);
        let poa = self.poa.lock().await;
        current_roster(&poa.queue, chain.blocks.len(), &fallback)
    }

    async fn add_miner(&self, node_id: String, _public_key: String) -> Result<(), GatewayError> {
        if self.config.regime != Regime::PoA {
            return Err(GatewayError::NotPoa);
        }
        let mut roster = self.get_miners().await;
        if !roster.contains(&node_id) {
            roster.push(node_id);
        }
        self.apply_and_broadcast_roster(roster).await
    }

    async fn remove_miner(&self, node_id: String) -> Result<(), GatewayError> {
        if self.config.regime != Regime::PoA {
            return Err(GatewayError::NotPoa);
        }
        let roster: Vec<String> = self.get_miners().await.into_iter().filter(|m| m != &node_id).collect();
        self.apply_and_broadcast_roster(roster).await
    }

    async fn send_stake_announcement(&self, amount: f64) -> Result<(), GatewayError> {
        if self.config.regime != Regime::PoS {
            return Err(GatewayError::NotPos);
        }
        if amount <= 0.0 {
            return Err(GatewayError::NonPositiveAmount);
        }
        let staker = self.wallet.public_key_pem().map_err(|_| GatewayError::InsufficientBalance)?;
        let mut stake = Stake { id: Uuid::new_v4(), staker, amount, timestamp: now(), signature: None };
        stake.signature = Some(self.wallet.sign(&stake.signable_bytes()));

        let chain = self.chain.lock().await;
        let mempool_snapshot: Vec<Transaction> = self.mempool.lock().await.iter().cloned().collect();
        let mut pos = self.pos.lock().await;
        let epoch_start = pos.epoch_start;
        pos.epoch
            .submit(stake.clone(), now(), epoch_start, &chain.blocks, &mempool_snapshot)
            .map_err(|_| GatewayError::InsufficientBalance)?;
        pos.own_stake = amount;
        drop(pos);
        drop(chain);

        self.broadcast(&WireMessage::StakeAnnouncement { id: Uuid::new_v4(), stake }).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support;
    use serde_json::json;
    use shared_types::entities::Chain;

    #[tokio::test]
    async fn a_value_transfer_is_admitted_and_broadcast() {
        let state = test_support::build(Regime::PoW);
        let sender = state.wallet.public_key_pem().unwrap();
        let genesis_tx = Chain::genesis_transaction(&sender, Uuid::new_v4(), 0.0);
        state.chain.lock().await.blocks.push(Block {
            id: Uuid::new_v4(),
            prev_hash: None,
            timestamp: 0.0,
            transactions: vec![genesis_tx],
            files: Default::default(),
            regime: shared_types::entities::RegimeFields::PoW { nonce: 0 },
        });

        let id = state
            .create_and_broadcast_tx(TxRequest::Value { receiver: "someone-else".to_string(), amount: 5.0 })
            .await
            .unwrap();

        let mempool = state.mempool.lock().await;
        assert!(mempool.iter().any(|tx| tx.id == id));
    }

    #[tokio::test]
    async fn a_non_positive_amount_is_rejected() {
        let state = test_support::build(Regime::PoW);
        let err = state
            .create_and_broadcast_tx(TxRequest::Value { receiver: "someone-else".to_string(), amount: 0.0 })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NonPositiveAmount));
    }

    #[tokio::test]
    async fn invoking_an_unknown_contract_is_a_bad_transaction() {
        let state = test_support::build(Regime::PoW);
        let err = state
            .create_and_broadcast_tx(TxRequest::Invoke {
                contract_id: Uuid::new_v4().to_string(),
                function: "deposit".to_string(),
                args: json!([10.0]),
                state: json!({"balance": 0.0}),
                amount: 0.0,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::BadTransaction(_)));
    }

    #[tokio::test]
    async fn invoking_a_deployed_contract_runs_it_and_embeds_the_resulting_state() {
        let state = test_support::build(Regime::PoW);
        let sender = state.wallet.public_key_pem().unwrap();
        let genesis_tx = Chain::genesis_transaction(&sender, Uuid::new_v4(), 0.0);
        let code = "fn deposit(amount, state) { state.balance = state.balance + amount; return state; }";
        let deploy_tx = Transaction {
            id: Uuid::new_v4(),
            payload: Payload::Deploy { code: code.to_string(), amount: 0.0 },
            sender: sender.clone(),
            receiver: DEPLOY_RECEIVER.to_string(),
            timestamp: 0.0,
            signature: None,
        };
        let contract_id = deploy_tx.id.to_string();
        state.chain.lock().await.blocks.push(Block {
            id: Uuid::new_v4(),
            prev_hash: None,
            timestamp: 0.0,
            transactions: vec![genesis_tx, deploy_tx],
            files: Default::default(),
            regime: shared_types::entities::RegimeFields::PoW { nonce: 0 },
        });

        let id = state
            .create_and_broadcast_tx(TxRequest::Invoke {
                contract_id,
                function: "deposit".to_string(),
                args: json!([10.0]),
                state: json!({"balance": 5.0}),
                amount: 0.0,
            })
            .await
            .unwrap();

        let mempool = state.mempool.lock().await;
        let tx = mempool.iter().find(|tx| tx.id == id).unwrap();
        match &tx.payload {
            Payload::Invoke { state, .. } => assert_eq!(*state, json!({"balance": 15.0})),
            other => panic!("expected an invoke payload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stake_announcements_are_rejected_outside_pos() {
        let state = test_support::build(Regime::PoW);
        let err = state.send_stake_announcement(10.0).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotPos));
    }

    #[tokio::test]
    async fn a_stake_announcement_records_its_own_stake() {
        let state = test_support::build(Regime::PoS);
        let staker = state.wallet.public_key_pem().unwrap();
        let genesis_tx = Chain::genesis_transaction(&staker, Uuid::new_v4(), 0.0);
        state.chain.lock().await.blocks.push(Block {
            id: Uuid::new_v4(),
            prev_hash: None,
            timestamp: 0.0,
            transactions: vec![genesis_tx],
            files: Default::default(),
            regime: shared_types::entities::RegimeFields::PoS {
                creator: staker.clone(),
                staked_amt: 0.0,
                stakers: vec![],
                seed: String::new(),
                vrf_proof: vec![],
                signature: None,
                is_valid: true,
                slash_creator: false,
            },
        });
        state.pos.lock().await.epoch_start = now();

        state.send_stake_announcement(25.0).await.unwrap();
        assert_eq!(state.pos.lock().await.own_stake, 25.0);
    }
}

impl NodeState {
    async fn apply_and_broadcast_roster(&self, miners_list: Vec<String>) -> Result<(), GatewayError> {
        let activation_block = self.chain.lock().await.blocks.len() as u64 + 1;
        let signature_bytes = self.wallet.sign(&roster_update_signable_bytes(&miners_list, activation_block));
        let signature = hex::encode(signature_bytes);

        self.poa.lock().await.queue.push(RosterUpdate {
            miners_list: miners_list.clone(),
            activation_height: activation_block as usize,
        });

        self.broadcast(&WireMessage::MinersListUpdate {
            id: Uuid::new_v4(),
            miners_list,
            activation_block,
            signature,
        })
        .await;
        Ok(())
    }
}
