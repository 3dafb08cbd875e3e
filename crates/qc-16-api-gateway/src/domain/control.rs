//! The port node-runtime implements so the status API can call into the
//! running node without owning any of its state itself.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use shared_types::entities::{Block, Transaction};
use shared_types::regime::Regime;
use shared_types::wire::PeerRecord;
use uuid::Uuid;

use super::errors::GatewayError;

/// The body of `POST /tx`: a value transfer, contract deployment, or
/// contract invocation, mirroring [`shared_types::entities::Payload`]'s
/// three shapes.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TxRequest {
    Value { receiver: String, amount: f64 },
    Deploy { code: String, amount: f64 },
    Invoke {
        contract_id: String,
        function: String,
        args: Value,
        state: Value,
        amount: f64,
    },
}

/// Operations the status API exposes over HTTP. Implemented by
/// node-runtime against its live, lock-guarded node state.
#[async_trait]
pub trait NodeControl: Send + Sync {
    fn node_id(&self) -> String;
    fn regime(&self) -> Regime;
    async fn create_and_broadcast_tx(&self, request: TxRequest) -> Result<Uuid, GatewayError>;
    async fn stop(&self);
    async fn get_chain(&self) -> Vec<Block>;
    async fn get_balance(&self, public_key_pem: &str) -> f64;
    async fn get_mempool(&self) -> Vec<Transaction>;
    async fn get_peers(&self) -> Vec<PeerRecord>;
    async fn get_miners(&self) -> Vec<String>;
    async fn add_miner(&self, node_id: String, public_key: String) -> Result<(), GatewayError>;
    async fn remove_miner(&self, node_id: String) -> Result<(), GatewayError>;
    async fn send_stake_announcement(&self, amount: f64) -> Result<(), GatewayError>;
}
