//! Shared, lock-guarded handle to a [`TransactionPool`].
//!
//! A single `tokio::sync::Mutex` protects the pool across the `await`
//! points that cross it — gossip ingestion, block production, and block
//! admission all take this lock rather than each holding a private copy.

use crate::domain::pool::TransactionPool;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Cloneable handle to a shared, mutex-guarded mempool.
#[derive(Clone, Default)]
pub struct MempoolHandle(Arc<Mutex<TransactionPool>>);

impl MempoolHandle {
    /// Wrap a freshly created, empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(TransactionPool::new())))
    }

    /// Lock the pool for the duration of the returned guard.
    pub async fn lock(&self) -> MutexGuard<'_, TransactionPool> {
        self.0.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::entities::{Chain, Payload, Transaction};
    use uuid::Uuid;

    #[tokio::test]
    async fn handle_allows_concurrent_admission() {
        let handle = MempoolHandle::new();
        let chain = Chain::empty();
        let tx = Transaction {
            id: Uuid::new_v4(),
            payload: Payload::Value(5.0),
            sender: "PKa".into(),
            receiver: "PKb".into(),
            timestamp: 1.0,
            signature: Some(vec![0]),
        };

        handle.lock().await.insert(tx, &chain).unwrap();
        assert_eq!(handle.lock().await.len(), 1);
    }
}
