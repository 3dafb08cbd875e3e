//! Mempool garbage collection on chain adoption: any pending transaction
//! that is now included in the adopted chain must be dropped so it is
//! not proposed again.

use qc_06_mempool::TransactionPool;
use shared_types::entities::Block;

/// Remove from `pool` every transaction carried by `adopted_chain`.
pub fn gc_mempool(pool: &mut TransactionPool, adopted_chain: &[Block]) {
    for block in adopted_chain {
        pool.remove_all_in(&block.transactions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::entities::{Chain, Payload, RegimeFields, Transaction};
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn tx(id: Uuid) -> Transaction {
        Transaction {
            id,
            payload: Payload::Value(10.0),
            sender: "PKa".into(),
            receiver: "PKb".into(),
            timestamp: 0.0,
            signature: Some(vec![1, 2, 3]),
        }
    }

    #[test]
    fn gc_drops_transactions_now_present_in_the_adopted_chain() {
        let chain = Chain::empty();
        let mut pool = TransactionPool::new();
        let included = tx(Uuid::new_v4());
        let still_pending = tx(Uuid::new_v4());
        pool.insert(included.clone(), &chain).unwrap();
        pool.insert(still_pending.clone(), &chain).unwrap();

        let block = Block {
            id: Uuid::new_v4(),
            prev_hash: None,
            timestamp: 0.0,
            transactions: vec![included.clone()],
            files: BTreeMap::new(),
            regime: RegimeFields::PoW { nonce: 0 },
        };
        gc_mempool(&mut pool, std::slice::from_ref(&block));

        assert!(!pool.contains(&included.id));
        assert!(pool.contains(&still_pending.id));
    }
}
