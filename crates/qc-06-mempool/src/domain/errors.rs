//! Mempool error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors a mempool admission can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MempoolError {
    /// A transaction with this id is already in the pool.
    #[error("transaction {0} already in the mempool")]
    DuplicateTransaction(Uuid),

    /// A transaction with this id is already included in the chain.
    #[error("transaction {0} already present in the chain")]
    AlreadyInChain(Uuid),

    /// The transaction's declared amount is not strictly positive.
    #[error("transaction {0} has a non-positive amount")]
    NonPositiveAmount(Uuid),

    /// No transaction with this id is in the pool.
    #[error("transaction {0} not found in the mempool")]
    NotFound(Uuid),
}
