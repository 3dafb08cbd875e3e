//! Node executable: load configuration, load or build the chain and
//! peer directory, bind the peer listener and status API, spawn the
//! periodic tasks, and run until `Ctrl+C`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::net::TcpListener;
use tokio::sync::{watch, Mutex};

use node_runtime::config::NodeConfig;
use node_runtime::persistence;
use node_runtime::state::{NodeState, PoaState, PosState};
use node_runtime::wallet::Wallet;
use node_runtime::{tasks, transport};
use qc_01_peer_discovery::PeerDirectory;
use qc_02_block_storage::{FileKvStore, KvStore};
use qc_05_block_propagation::GossipGate;
use qc_06_mempool::MempoolHandle;
use qc_11_smart_contracts::MeteredInterpreter;
use qc_16_api_gateway::NodeControl;
use qc_17_block_production::{genesis_poa, genesis_pos, genesis_pow};
use quantum_telemetry::{init_telemetry, TelemetryConfig};
use shared_types::entities::Chain;
use shared_types::regime::Regime;

fn now() -> f64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs_f64()).unwrap_or(0.0)
}

/// Build the first block of a fresh network under `config`'s regime,
/// using this node's own wallet as the founding identity.
fn build_genesis(config: &NodeConfig, wallet: &Wallet, node_id: &str) -> anyhow::Result<(shared_types::entities::Block, Option<String>)> {
    let timestamp = now();
    let public_key_pem = wallet.public_key_pem()?;
    match config.regime {
        Regime::PoW => Ok((genesis_pow(&public_key_pem, timestamp), None)),
        Regime::PoA => {
            let keypair = wallet.secp256k1_keypair().expect("PoA wallet is always secp256k1");
            let miners = if config.initial_miners.is_empty() {
                vec![node_id.to_string()]
            } else {
                config.initial_miners.clone()
            };
            Ok((genesis_poa(keypair, miners, timestamp), Some(public_key_pem)))
        }
        Regime::PoS => {
            let keypair = wallet.secp256k1_keypair().expect("PoS wallet is always secp256k1");
            Ok((genesis_pos(keypair, config.genesis_stake, timestamp), None))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env())?;

    let config_path = std::env::args().nth(1).map(std::path::PathBuf::from);
    let config = NodeConfig::load(config_path.as_deref())?;
    tracing::info!(regime = ?config.regime, node = %config.node_name, "starting node");

    std::fs::create_dir_all(&config.data_dir)?;
    let store: Arc<dyn KvStore> = Arc::new(FileKvStore::new(config.data_dir.clone())?);

    let wallet = Wallet::load_or_generate(store.as_ref(), config.regime)?;
    let node_id = match persistence::load_node_id(store.as_ref())? {
        Some(id) => id,
        None => {
            let id = wallet.node_id_hex()?;
            store.save("node_id", id.as_bytes())?;
            id
        }
    };

    let (blocks, admin_pem) = match persistence::load_chain(store.as_ref())? {
        Some(blocks) => (blocks, None),
        None if config.bootstrap_peers.is_empty() => {
            let (block, admin_pem) = build_genesis(&config, &wallet, &node_id)?;
            tracing::info!(regime = ?config.regime, "bootstrapping a fresh network with a genesis block");
            (vec![block], admin_pem)
        }
        None => {
            tracing::info!("no chain snapshot found, waiting to sync from bootstrap peers");
            (Vec::new(), None)
        }
    };

    let mut peer_directory = PeerDirectory::new(config.max_connections);
    for record in persistence::load_peers(store.as_ref())? {
        peer_directory.learn(record);
    }

    let (mining_cancel, _) = watch::channel(());
    let (shutdown, _) = watch::channel(false);

    let state = Arc::new(NodeState {
        config: config.clone(),
        node_id,
        wallet,
        store,
        executor: Arc::new(MeteredInterpreter),
        chain: Mutex::new(Chain { blocks }),
        mempool: MempoolHandle::new(),
        peers: Mutex::new(peer_directory),
        files: Mutex::new(BTreeMap::new()),
        poa: Mutex::new(PoaState::default()),
        pos: Mutex::new(PosState::default()),
        admin_pem: Mutex::new(admin_pem),
        connections: Mutex::new(Default::default()),
        gossip: Mutex::new(GossipGate::new()),
        mining_cancel,
        shutdown,
    });
    state.persist().await?;

    let listener_state = Arc::clone(&state);
    let listener_handle = tokio::spawn(async move {
        if let Err(err) = transport::listen(listener_state).await {
            tracing::error!(error = %err, "peer listener exited");
        }
    });

    for endpoint in config.bootstrap_peers.clone() {
        let dial_state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(err) = transport::dial(dial_state, endpoint.clone()).await {
                tracing::debug!(%endpoint, error = %err, "bootstrap dial failed");
            }
        });
    }

    let mut task_handles = tasks::spawn_all(Arc::clone(&state));

    let rpc_listener = TcpListener::bind(("0.0.0.0", config.rpc_port)).await?;
    let router = qc_16_api_gateway::build_router(Arc::clone(&state) as Arc<dyn NodeControl>);
    let rpc_state = Arc::clone(&state);
    let rpc_handle = tokio::spawn(async move {
        let mut shutdown_rx = rpc_state.shutdown.subscribe();
        let shutdown_signal = async move {
            let _ = shutdown_rx.changed().await;
        };
        if let Err(err) = axum::serve(rpc_listener, router).with_graceful_shutdown(shutdown_signal).await {
            tracing::error!(error = %err, "status API server exited");
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received, stopping");
    let _ = state.shutdown.send(true);

    listener_handle.abort();
    for handle in task_handles.drain(..) {
        handle.abort();
    }
    let _ = rpc_handle.await;

    state.persist().await?;
    tracing::info!("node stopped");
    Ok(())
}
