//! WebSocket transport: the inbound listener, the outbound dialer, and
//! the per-connection read/write plumbing they share. Each connection
//! owns one read task; writes go through an `mpsc` channel registered
//! in [`NodeState::connections`] so any task can reach any peer.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{accept_async, connect_async, WebSocketStream};

use shared_types::wire::WireMessage;

use crate::dispatch;
use crate::state::NodeState;

/// Bind the node's listener and accept inbound connections until the
/// shutdown signal fires.
pub async fn listen(state: Arc<NodeState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(state.config.listen_addr()).await?;
    tracing::info!(addr = %state.config.listen_addr(), "peer listener bound");

    let mut shutdown = state.shutdown.subscribe();
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
            accepted = listener.accept() => {
                let (stream, addr) = accepted?;
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    if let Err(err) = accept_connection(state, stream, addr.to_string()).await {
                        tracing::debug!(%addr, error = %err, "inbound connection ended");
                    }
                });
            }
        }
    }
    Ok(())
}

async fn accept_connection(state: Arc<NodeState>, stream: TcpStream, endpoint: String) -> anyhow::Result<()> {
    let ws = accept_async(stream).await?;
    run_connection(state, ws, endpoint, Vec::new()).await
}

/// Dial `endpoint` (`host:port`), run the outbound handshake, and drive
/// its connection until it closes.
pub async fn dial(state: Arc<NodeState>, endpoint: String) -> anyhow::Result<()> {
    let url = format!("ws://{endpoint}");
    let (ws, _) = connect_async(&url).await?;

    let have_chain = !state.chain.lock().await.blocks.is_empty();
    let self_record = state.self_record()?;
    let handshake = qc_01_peer_discovery::on_connect(have_chain, self_record);

    run_connection(state, ws, endpoint, handshake).await
}

/// Register `ws`'s write half under `endpoint`, mark the peer
/// connected, send any outbound handshake frames, and read frames from
/// it until it closes or the shutdown signal fires, dispatching each
/// through the gossip gate.
async fn run_connection(
    state: Arc<NodeState>,
    ws: WebSocketStream<TcpStream>,
    endpoint: String,
    handshake: Vec<WireMessage>,
) -> anyhow::Result<()> {
    let (mut write, mut read) = ws.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
    for message in &handshake {
        if let Ok(text) = serde_json::to_string(message) {
            let _ = tx.send(WsMessage::Text(text));
        }
    }
    state.connections.lock().await.insert(endpoint.clone(), tx);
    let _ = state.peers.lock().await.mark_connected(&endpoint);

    let writer_endpoint = endpoint.clone();
    let writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if write.send(frame).await.is_err() {
                tracing::debug!(endpoint = %writer_endpoint, "outbound write failed, closing connection");
                break;
            }
        }
    });

    let mut shutdown = state.shutdown.subscribe();
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    break;
                }
            }
            frame = read.next() => {
                match frame {
                    Some(Ok(WsMessage::Text(text))) => handle_frame(&state, &endpoint, &text).await,
                    Some(Ok(WsMessage::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        tracing::debug!(%endpoint, error = %err, "peer connection error");
                        break;
                    }
                }
            }
        }
    }

    state.connections.lock().await.remove(&endpoint);
    state.peers.lock().await.mark_disconnected(&endpoint);
    writer.abort();
    Ok(())
}

async fn handle_frame(state: &Arc<NodeState>, endpoint: &str, text: &str) {
    let message: WireMessage = match serde_json::from_str(text) {
        Ok(message) => message,
        Err(err) => {
            tracing::debug!(%endpoint, error = %err, "dropping an unparsable frame");
            return;
        }
    };
    if !dispatch::admit(state, &message).await {
        return;
    }
    dispatch::handle(state, endpoint, message).await;
}
