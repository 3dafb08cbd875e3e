//! # Error Types
//!
//! Shared error vocabulary used across subsystems.

use thiserror::Error;

/// Errors that can occur in the persistence collaborator.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// Record not found for the given kind.
    #[error("no record found for kind: {0}")]
    NotFound(String),

    /// Underlying I/O or (de)serialization failure.
    #[error("storage error: {0}")]
    Backend(String),
}

/// Rejection reasons a message/block/transaction can fail with on the
/// wire, matching the error-kind table.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RejectReason {
    /// A signature did not verify.
    #[error("bad signature")]
    BadSignature,
    /// Transaction id already seen in the chain or mempool.
    #[error("duplicate transaction")]
    DuplicateTransaction,
    /// Message id already processed (gossip dedup).
    #[error("duplicate message")]
    DuplicateMessage,
    /// Sender's balance does not cover the declared amount.
    #[error("insufficient balance")]
    InsufficientBalance,
    /// Declared amount is not strictly positive.
    #[error("non-positive amount")]
    NonPositiveAmount,
    /// Block hash does not match its declared `prev_hash`/content.
    #[error("hash mismatch")]
    HashMismatch,
    /// PoW block's hash does not meet the difficulty target.
    #[error("invalid proof of work")]
    InvalidProofOfWork,
    /// PoS VRF proof or threshold check failed.
    #[error("invalid vrf")]
    InvalidVrf,
    /// PoA block was not produced by the expected roster slot.
    #[error("unexpected producer")]
    UnexpectedProducer,
    /// Remote chain is not strictly heavier/longer than the local one.
    #[error("stale chain")]
    StaleChain,
    /// PoS equivocation detected; triggers the slashing protocol.
    #[error("malicious fork")]
    MaliciousFork,
    /// Peer connection failed or was reset.
    #[error("peer unreachable")]
    PeerUnreachable,
    /// Contract execution ran out of its gas budget.
    #[error("out of gas")]
    OutOfGas,
}

/// Node operational states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Normal operation.
    Running,
    /// Synchronizing with the network.
    Syncing,
    /// Halted due to repeated sync failures (awaiting intervention).
    HaltedAwaitingIntervention,
}
