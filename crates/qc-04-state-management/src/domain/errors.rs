//! State evaluator error types.

use thiserror::Error;

/// Errors the balance evaluator and admission check can fail with.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    /// A transaction's amount is not strictly positive.
    #[error("transaction {0} has a non-positive amount")]
    NonPositiveAmount(uuid::Uuid),

    /// `amount(T) > balance(T.sender, ...)` at admission time.
    #[error("insufficient balance for {public_key}: required {required}, available {available}")]
    InsufficientBalance {
        /// The sender's public key (PEM).
        public_key: String,
        /// The amount the transaction declares.
        required: f64,
        /// The sender's computed balance at this point in the chain.
        available: f64,
    },

    /// A stake submission's amount is not strictly positive.
    #[error("stake {0} has a non-positive amount")]
    NonPositiveStake(uuid::Uuid),
}
