//! The status/control HTTP surface: node identity, balance, chain,
//! mempool, peers, and the current miner set, plus transaction/stake/
//! miner-roster commands. A thin `axum` skin over [`NodeControl`].

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domain::{GatewayError, NodeControl, TxRequest};

type AppState = Arc<dyn NodeControl>;

/// Build the router. The caller owns binding it to a listener.
pub fn build_router(node: Arc<dyn NodeControl>) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/chain", get(chain))
        .route("/balance", post(balance))
        .route("/mempool", get(mempool))
        .route("/peers", get(peers))
        .route("/miners", get(miners).post(add_miner))
        .route("/miners/:node_id", delete(remove_miner))
        .route("/tx", post(create_tx))
        .route("/stake", post(stake))
        .route("/stop", post(stop))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(node)
}

async fn status(State(node): State<AppState>) -> Json<Value> {
    Json(json!({
        "node_id": node.node_id(),
        "regime": node.regime(),
    }))
}

async fn chain(State(node): State<AppState>) -> Json<Value> {
    Json(json!({ "blocks": node.get_chain().await }))
}

#[derive(Debug, Deserialize)]
struct BalanceRequest {
    public_key_pem: String,
}

async fn balance(State(node): State<AppState>, Json(req): Json<BalanceRequest>) -> Json<Value> {
    Json(json!({ "balance": node.get_balance(&req.public_key_pem).await }))
}

async fn mempool(State(node): State<AppState>) -> Json<Value> {
    Json(json!({ "transactions": node.get_mempool().await }))
}

async fn peers(State(node): State<AppState>) -> Json<Value> {
    Json(json!({ "peers": node.get_peers().await }))
}

async fn miners(State(node): State<AppState>) -> Json<Value> {
    Json(json!({ "miners": node.get_miners().await }))
}

#[derive(Debug, Serialize)]
struct CreatedTx {
    id: uuid::Uuid,
}

async fn create_tx(State(node): State<AppState>, Json(req): Json<TxRequest>) -> Result<Json<CreatedTx>, GatewayError> {
    let id = node.create_and_broadcast_tx(req).await?;
    Ok(Json(CreatedTx { id }))
}

#[derive(Debug, Deserialize)]
struct StakeRequest {
    amount: f64,
}

async fn stake(State(node): State<AppState>, Json(req): Json<StakeRequest>) -> Result<StatusCode, GatewayError> {
    node.send_stake_announcement(req.amount).await?;
    Ok(StatusCode::ACCEPTED)
}

#[derive(Debug, Deserialize)]
struct AddMinerRequest {
    node_id: String,
    public_key: String,
}

async fn add_miner(State(node): State<AppState>, Json(req): Json<AddMinerRequest>) -> Result<StatusCode, GatewayError> {
    node.add_miner(req.node_id, req.public_key).await?;
    Ok(StatusCode::CREATED)
}

async fn remove_miner(State(node): State<AppState>, Path(node_id): Path<String>) -> Result<StatusCode, GatewayError> {
    node.remove_miner(node_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn stop(State(node): State<AppState>) -> StatusCode {
    node.stop().await;
    StatusCode::ACCEPTED
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use shared_types::entities::{Block, Chain, Transaction};
    use shared_types::regime::Regime;
    use tower::ServiceExt;

    struct StubNode;

    #[async_trait::async_trait]
    impl NodeControl for StubNode {
        fn node_id(&self) -> String {
            "stub-node".into()
        }
        fn regime(&self) -> Regime {
            Regime::PoW
        }
        async fn create_and_broadcast_tx(&self, _request: TxRequest) -> Result<uuid::Uuid, GatewayError> {
            Ok(uuid::Uuid::nil())
        }
        async fn stop(&self) {}
        async fn get_chain(&self) -> Vec<Block> {
            Chain::empty().blocks
        }
        async fn get_balance(&self, _public_key_pem: &str) -> f64 {
            42.0
        }
        async fn get_mempool(&self) -> Vec<Transaction> {
            Vec::new()
        }
        async fn get_peers(&self) -> Vec<shared_types::wire::PeerRecord> {
            Vec::new()
        }
        async fn get_miners(&self) -> Vec<String> {
            vec!["genesis".into()]
        }
        async fn add_miner(&self, _node_id: String, _public_key: String) -> Result<(), GatewayError> {
            Ok(())
        }
        async fn remove_miner(&self, node_id: String) -> Result<(), GatewayError> {
            if node_id == "unknown" {
                Err(GatewayError::UnknownMiner(node_id))
            } else {
                Ok(())
            }
        }
        async fn send_stake_announcement(&self, amount: f64) -> Result<(), GatewayError> {
            if amount <= 0.0 {
                Err(GatewayError::NonPositiveAmount)
            } else {
                Ok(())
            }
        }
    }

    fn router() -> Router {
        build_router(Arc::new(StubNode))
    }

    #[tokio::test]
    async fn status_reports_node_id_and_regime() {
        let response = router()
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn stake_with_non_positive_amount_is_rejected() {
        let body = Body::from(serde_json::to_vec(&json!({ "amount": 0.0 })).unwrap());
        let response = router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/stake")
                    .header("content-type", "application/json")
                    .body(body)
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn removing_an_unknown_miner_returns_not_found() {
        let response = router()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/miners/unknown")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
