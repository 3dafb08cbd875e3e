//! `NodeState`: the single in-process owner of every piece of mutable
//! state a running node holds. Message handlers and producer tasks
//! borrow from here rather than each keeping a private copy.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};
use tokio_tungstenite::tungstenite::Message as WsMessage;

use qc_01_peer_discovery::PeerDirectory;
use qc_02_block_storage::KvStore;
use qc_06_mempool::MempoolHandle;
use qc_11_smart_contracts::ContractExecutor;
use qc_17_block_production::{EpochStakes, RosterUpdate, RoundAdvancer};
use shared_types::entities::Chain;
use shared_types::regime::Regime;

use crate::config::NodeConfig;
use crate::wallet::Wallet;

/// Outbound half of one peer connection: either a live WebSocket sink
/// or a channel feeding one, depending on who dialed whom. Transport
/// code only ever needs to push frames onto it.
pub type OutboundSink = mpsc::UnboundedSender<WsMessage>;

/// PoA-specific mutable state: the roster queue and the idle-round
/// advancer that decides when a skipped slot moves on.
#[derive(Debug, Default)]
pub struct PoaState {
    pub queue: Vec<RosterUpdate>,
    pub advancer: RoundAdvancer,
}

/// PoS-specific mutable state: the current epoch's stake submissions
/// and when it started.
pub struct PosState {
    pub epoch: EpochStakes,
    pub epoch_start: f64,
    pub own_stake: f64,
}

impl Default for PosState {
    fn default() -> Self {
        Self {
            epoch: EpochStakes::new(),
            epoch_start: 0.0,
            own_stake: 0.0,
        }
    }
}

/// Everything a running node owns. Cloned as an `Arc` into every task
/// and connection handler.
pub struct NodeState {
    pub config: NodeConfig,
    pub node_id: String,
    pub wallet: Wallet,
    pub store: Arc<dyn KvStore>,
    pub executor: Arc<dyn ContractExecutor>,

    pub chain: Mutex<Chain>,
    pub mempool: MempoolHandle,
    pub peers: Mutex<PeerDirectory>,
    /// CID -> description, mutated independently from both file-upload
    /// callbacks and block admission.
    pub files: Mutex<BTreeMap<String, String>>,

    pub poa: Mutex<PoaState>,
    pub pos: Mutex<PosState>,
    /// PoA only: the network's founding identity, learned from
    /// `network_details` and used to authenticate roster updates.
    pub admin_pem: Mutex<Option<String>>,

    /// endpoint -> outbound sender, for broadcasting and targeted
    /// replies without each handler owning the socket itself.
    pub connections: Mutex<HashMap<String, OutboundSink>>,
    /// Admits each inbound message id at most once, so gossip relay
    /// stays idempotent across however many peers forward it.
    pub gossip: Mutex<qc_05_block_propagation::GossipGate>,

    /// Flipped to cancel any in-flight PoW search, e.g. on a
    /// competing block landing at the same height.
    pub mining_cancel: watch::Sender<()>,
    /// Flipped once, on shutdown, to stop every periodic task.
    pub shutdown: watch::Sender<bool>,
}

impl NodeState {
    #[must_use]
    pub fn regime(&self) -> Regime {
        self.config.regime
    }

    /// Snapshot the chain, peers, and keys through the persistence
    /// port. Called on graceful shutdown and, cheaply, whenever the
    /// chain or peer directory changes shape.
    pub async fn persist(&self) -> anyhow::Result<()> {
        let chain = self.chain.lock().await;
        let bytes = serde_json::to_vec(&chain.blocks)?;
        self.store.save("chain", &bytes)?;
        drop(chain);

        let peers = self.peers.lock().await.known_peers();
        let bytes = serde_json::to_vec(&peers)?;
        self.store.save("peers", &bytes)?;

        self.store.save("node_id", self.node_id.as_bytes())?;
        Ok(())
    }

    /// This node's own `PeerRecord`, as advertised to the rest of the
    /// network.
    pub fn self_record(&self) -> anyhow::Result<shared_types::wire::PeerRecord> {
        Ok(shared_types::wire::PeerRecord {
            host: self.config.host.clone(),
            port: self.config.port,
            name: self.config.node_name.clone(),
            public_key: self.wallet.public_key_pem()?,
            node_id: Some(self.node_id.clone()),
        })
    }

    /// Broadcast `message` to every currently connected peer.
    pub async fn broadcast(&self, message: &shared_types::wire::WireMessage) {
        let text = match serde_json::to_string(message) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode outbound message");
                return;
            }
        };
        let connections = self.connections.lock().await;
        for (endpoint, sink) in connections.iter() {
            if sink.send(WsMessage::Text(text.clone())).is_err() {
                tracing::debug!(%endpoint, "dropped broadcast to a closed connection");
            }
        }
    }

    /// Send `message` to a single peer by endpoint, if still connected.
    pub async fn send_to(&self, endpoint: &str, message: &shared_types::wire::WireMessage) {
        let text = match serde_json::to_string(message) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "failed to encode outbound message");
                return;
            }
        };
        let connections = self.connections.lock().await;
        if let Some(sink) = connections.get(endpoint) {
            let _ = sink.send(WsMessage::Text(text));
        }
    }
}

/// A `NodeState` builder for `dispatch`/`control` unit tests, so each
/// only has to state the regime it cares about. Also built under the
/// `testing` feature so the workspace's multi-node scenario suite can
/// reuse it without duplicating this wiring.
#[cfg(any(test, feature = "testing"))]
pub mod test_support {
    use super::*;
    use qc_02_block_storage::FileKvStore;

    pub fn build(regime: Regime) -> NodeState {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn KvStore> = Arc::new(FileKvStore::new(dir.path()).unwrap());
        std::mem::forget(dir);

        let wallet = Wallet::generate(regime).unwrap();
        let node_id = wallet.node_id_hex().unwrap();
        let mut config = NodeConfig::default();
        config.regime = regime;

        let (mining_cancel, _) = watch::channel(());
        let (shutdown, _) = watch::channel(false);

        NodeState {
            config,
            node_id,
            wallet,
            store,
            executor: Arc::new(qc_11_smart_contracts::MeteredInterpreter),
            chain: Mutex::new(Chain { blocks: Vec::new() }),
            mempool: MempoolHandle::new(),
            peers: Mutex::new(PeerDirectory::new(8)),
            files: Mutex::new(BTreeMap::new()),
            poa: Mutex::new(PoaState::default()),
            pos: Mutex::new(PosState::default()),
            admin_pem: Mutex::new(None),
            connections: Mutex::new(HashMap::new()),
            gossip: Mutex::new(qc_05_block_propagation::GossipGate::new()),
            mining_cancel,
            shutdown,
        }
    }
}
