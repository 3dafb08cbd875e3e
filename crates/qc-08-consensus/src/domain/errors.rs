//! Consensus error types.

use thiserror::Error;
use uuid::Uuid;

/// Why a candidate block failed `is_valid_block`/`is_valid_chain`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConsensusError {
    /// `block.prev_hash` does not match the tip it claims to extend.
    #[error("block's prev_hash does not match the chain tip")]
    WrongParent,

    /// A transaction in the block already appears earlier in the chain.
    #[error("transaction {0} already appears in the chain")]
    DuplicateTransaction(Uuid),

    /// A transaction's signature does not verify under its sender.
    #[error("transaction {0} has an invalid signature")]
    InvalidTransactionSignature(Uuid),

    /// A transaction violates the balance admission rule in-block.
    #[error("transaction {0} fails the balance admission rule")]
    InadmissibleTransaction(Uuid),

    /// The block fails its regime's legitimacy predicate (hash prefix,
    /// VRF threshold, or roster membership).
    #[error("block fails its regime's legitimacy predicate")]
    RegimePredicateFailed,

    /// The block's own producer signature does not verify.
    #[error("block's producer signature is invalid")]
    InvalidBlockSignature,

    /// A PoS block's seed does not match `epoch_seed` of the prefix it
    /// extends.
    #[error("PoS block seed does not match the expected epoch seed")]
    WrongEpochSeed,

    /// A PoA block's `miner_node_id` is on the roster but did not hold
    /// the roster slot for the round it claims.
    #[error("block was not produced by the expected roster slot")]
    UnexpectedProducer,
}
