//! The mempool: an insertion-ordered, id-deduplicated queue of candidate
//! transactions.

use super::errors::MempoolError;
use shared_types::entities::{Chain, Transaction};
use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

/// An ordered list of transactions with a secondary index by `id`.
///
/// `order` holds ids in arrival order so `iter`/`pending` preserve FIFO
/// order for block producers; `by_id` is the duplicate-check and lookup
/// index.
#[derive(Debug, Default)]
pub struct TransactionPool {
    by_id: HashMap<Uuid, Transaction>,
    order: VecDeque<Uuid>,
}

impl TransactionPool {
    /// An empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Admit `tx`, rejecting it if its id is already pending or already
    /// present anywhere in `chain`.
    ///
    /// Does not check the transaction's signature or its sender's balance
    /// — those are the signature-verification and state-evaluator
    /// subsystems' jobs, run before a transaction reaches the pool.
    pub fn insert(&mut self, tx: Transaction, chain: &Chain) -> Result<(), MempoolError> {
        if tx.amount() <= 0.0 {
            return Err(MempoolError::NonPositiveAmount(tx.id));
        }
        if self.by_id.contains_key(&tx.id) {
            return Err(MempoolError::DuplicateTransaction(tx.id));
        }
        if chain.contains_transaction(&tx) {
            return Err(MempoolError::AlreadyInChain(tx.id));
        }
        self.order.push_back(tx.id);
        self.by_id.insert(tx.id, tx);
        Ok(())
    }

    /// True if a transaction with this id is currently pending.
    #[must_use]
    pub fn contains(&self, id: &Uuid) -> bool {
        self.by_id.contains_key(id)
    }

    /// Pending transactions in insertion (FIFO) order.
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    /// Remove every transaction that appears in `block`'s transaction
    /// list, e.g. once a block carrying them has been accepted.
    pub fn remove_all_in(&mut self, block_transactions: &[Transaction]) {
        for tx in block_transactions {
            if self.by_id.remove(&tx.id).is_some() {
                self.order.retain(|id| *id != tx.id);
            }
        }
    }

    /// Remove a single transaction by id.
    pub fn remove(&mut self, id: &Uuid) -> Result<Transaction, MempoolError> {
        let tx = self
            .by_id
            .remove(id)
            .ok_or(MempoolError::NotFound(*id))?;
        self.order.retain(|o| o != id);
        Ok(tx)
    }

    /// Number of pending transactions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the pool currently holds no transactions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::entities::Payload;

    fn tx(id: Uuid, sender: &str, amount: f64) -> Transaction {
        Transaction {
            id,
            payload: Payload::Value(amount),
            sender: sender.to_string(),
            receiver: "PKreceiver".to_string(),
            timestamp: 1000.0,
            signature: Some(vec![1, 2, 3]),
        }
    }

    #[test]
    fn insert_accepts_new_transaction() {
        let mut pool = TransactionPool::new();
        let chain = Chain::empty();
        let t = tx(Uuid::new_v4(), "PKa", 10.0);
        assert!(pool.insert(t.clone(), &chain).is_ok());
        assert!(pool.contains(&t.id));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn insert_rejects_duplicate_id() {
        let mut pool = TransactionPool::new();
        let chain = Chain::empty();
        let id = Uuid::new_v4();
        let t1 = tx(id, "PKa", 10.0);
        let t2 = tx(id, "PKb", 20.0);
        pool.insert(t1, &chain).unwrap();
        let err = pool.insert(t2, &chain).unwrap_err();
        assert_eq!(err, MempoolError::DuplicateTransaction(id));
    }

    #[test]
    fn insert_rejects_non_positive_amount() {
        let mut pool = TransactionPool::new();
        let chain = Chain::empty();
        let t = tx(Uuid::new_v4(), "PKa", 0.0);
        let err = pool.insert(t.clone(), &chain).unwrap_err();
        assert_eq!(err, MempoolError::NonPositiveAmount(t.id));
    }

    #[test]
    fn iter_preserves_insertion_order() {
        let mut pool = TransactionPool::new();
        let chain = Chain::empty();
        let ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            pool.insert(tx(*id, "PKa", 1.0), &chain).unwrap();
        }
        let seen: Vec<Uuid> = pool.iter().map(|t| t.id).collect();
        assert_eq!(seen, ids);
    }

    #[test]
    fn remove_all_in_drops_included_transactions() {
        let mut pool = TransactionPool::new();
        let chain = Chain::empty();
        let t1 = tx(Uuid::new_v4(), "PKa", 1.0);
        let t2 = tx(Uuid::new_v4(), "PKb", 2.0);
        pool.insert(t1.clone(), &chain).unwrap();
        pool.insert(t2.clone(), &chain).unwrap();

        pool.remove_all_in(&[t1.clone()]);

        assert!(!pool.contains(&t1.id));
        assert!(pool.contains(&t2.id));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn remove_unknown_id_errors() {
        let mut pool = TransactionPool::new();
        let id = Uuid::new_v4();
        assert_eq!(pool.remove(&id).unwrap_err(), MempoolError::NotFound(id));
    }
}
