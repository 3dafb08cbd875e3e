//! Block production error types.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProductionError {
    #[error("nonce search was canceled before a solution was found")]
    Canceled,
    #[error("this node does not hold the expected slot and may not mine")]
    NotMySlot,
    #[error("no roster is active for this chain length")]
    NoActiveRoster,
    #[error("stake submission window is closed for the current epoch")]
    StakeWindowClosed,
    #[error("stake {0} was already submitted this epoch")]
    DuplicateStake(uuid::Uuid),
    #[error("this staker did not win the epoch's VRF lottery")]
    LotteryNotWon,
    #[error("total stake for the epoch is zero")]
    NoStake,
}
