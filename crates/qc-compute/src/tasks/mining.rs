//! Mining task abstraction.

use crate::{ComputeEngine, ComputeError, NonceCheck};
use std::sync::Arc;

/// One nonce-search pass: a range to search and the predicate a nonce
/// must satisfy.
pub struct MiningTask {
    pub check: NonceCheck,
    pub nonce_start: u64,
    pub nonce_count: u64,
}

impl MiningTask {
    /// Execute the search on the given engine.
    pub async fn execute(self, engine: &Arc<dyn ComputeEngine>) -> Result<Option<u64>, ComputeError> {
        engine.search_nonce(self.check, self.nonce_start, self.nonce_count).await
    }
}
