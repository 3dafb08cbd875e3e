//! Bridges the opaque `KvStore` port to the four logical records a node
//! persists across restarts: `node_id`, `keys` (handled by
//! [`crate::wallet::Wallet::load_or_generate`]), `chain`, and `peers`.

use qc_02_block_storage::KvStore;
use shared_types::entities::Block;
use shared_types::wire::PeerRecord;

/// The chain snapshot, if one was ever persisted.
pub fn load_chain(store: &dyn KvStore) -> anyhow::Result<Option<Vec<Block>>> {
    match store.load("chain")? {
        Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// The peer directory snapshot, if one was ever persisted.
pub fn load_peers(store: &dyn KvStore) -> anyhow::Result<Vec<PeerRecord>> {
    match store.load("peers")? {
        Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
        None => Ok(Vec::new()),
    }
}

/// The previously persisted node id, if this is not the node's first run.
pub fn load_node_id(store: &dyn KvStore) -> anyhow::Result<Option<String>> {
    match store.load("node_id")? {
        Some(bytes) => Ok(Some(String::from_utf8(bytes)?)),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qc_02_block_storage::FileKvStore;
    use shared_types::entities::{Chain, RegimeFields};
    use std::collections::BTreeMap;
    use uuid::Uuid;

    #[test]
    fn chain_round_trips_through_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::new(dir.path()).unwrap();
        assert!(load_chain(&store).unwrap().is_none());

        let block = Block {
            id: Uuid::new_v4(),
            prev_hash: None,
            timestamp: 0.0,
            transactions: vec![],
            files: BTreeMap::new(),
            regime: RegimeFields::PoW { nonce: 0 },
        };
        let bytes = serde_json::to_vec(&vec![block]).unwrap();
        store.save("chain", &bytes).unwrap();

        let reloaded = load_chain(&store).unwrap().unwrap();
        assert_eq!(reloaded.len(), 1);
        let _ = Chain { blocks: reloaded };
    }

    #[test]
    fn peers_default_to_empty_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::new(dir.path()).unwrap();
        assert!(load_peers(&store).unwrap().is_empty());
    }
}
