//! Proof-of-Authority producer: rotating roster, slot computation, and
//! round advancement.

use qc_10_signature_verification::{SignatureSuite, SignatureError};
use shared_types::regime::Regime;
use std::time::Duration;

use super::errors::ProductionError;

pub use shared_types::expected_producer;

/// An admin-signed roster change, active from `activation_height`
/// onward.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterUpdate {
    pub miners_list: Vec<String>,
    pub activation_height: usize,
}

/// The roster in effect at `chain_len`: the highest-`activation_height`
/// queued update that has activated, or `fallback` (the previous
/// block's embedded `miners_list`) if none has.
#[must_use]
pub fn current_roster(queue: &[RosterUpdate], chain_len: usize, fallback: &[String]) -> Vec<String> {
    queue
        .iter()
        .filter(|u| u.activation_height <= chain_len)
        .max_by_key(|u| u.activation_height)
        .map(|u| u.miners_list.clone())
        .unwrap_or_else(|| fallback.to_vec())
}

/// Whether `node_id` holds the current slot.
#[must_use]
pub fn is_my_slot(node_id: &str, miners_list: &[String], chain_len: usize, round: u64) -> bool {
    expected_producer(miners_list, chain_len, round) == Some(node_id)
}

/// Check [`is_my_slot`] and translate a `false` result into
/// [`ProductionError::NotMySlot`] / an empty roster into
/// [`ProductionError::NoActiveRoster`].
pub fn require_my_slot(
    node_id: &str,
    miners_list: &[String],
    chain_len: usize,
    round: u64,
) -> Result<(), ProductionError> {
    if miners_list.is_empty() {
        return Err(ProductionError::NoActiveRoster);
    }
    if is_my_slot(node_id, miners_list, chain_len, round) {
        Ok(())
    } else {
        Err(ProductionError::NotMySlot)
    }
}

/// Time between a `0`-round and the first step, and between each
/// subsequent step, while the mempool holds at least one transaction.
const ROUND_STEP: Duration = Duration::from_secs(90);

/// Tracks how many 90s steps have elapsed since the current block,
/// advancing only while the mempool is non-empty (letting an offline
/// leader's slot be skipped without requiring mempool activity from
/// nobody).
#[derive(Debug, Default)]
pub struct RoundAdvancer {
    round: u64,
    elapsed: Duration,
}

impl RoundAdvancer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Reset to round 0, e.g. once a block is accepted at this height.
    pub fn reset(&mut self) {
        self.round = 0;
        self.elapsed = Duration::ZERO;
    }

    /// Advance the clock by `dt`; steps the round forward for every
    /// full `ROUND_STEP` accumulated, but only while `mempool_nonempty`.
    pub fn tick(&mut self, dt: Duration, mempool_nonempty: bool) -> u64 {
        if mempool_nonempty {
            self.elapsed += dt;
            while self.elapsed >= ROUND_STEP {
                self.elapsed -= ROUND_STEP;
                self.round += 1;
            }
        }
        self.round
    }
}

/// The canonical bytes an admin signs over a roster update.
#[must_use]
pub fn roster_update_signable_bytes(miners_list: &[String], activation_block: u64) -> Vec<u8> {
    serde_json::json!({ "miners_list": miners_list, "activation_block": activation_block }).to_string().into_bytes()
}

/// Verify an admin-signed roster update against `admin_pem`.
pub fn verify_roster_update(
    miners_list: &[String],
    activation_block: u64,
    signature_hex: &str,
    admin_pem: &str,
) -> Result<(), SignatureError> {
    let signature = hex::decode(signature_hex).map_err(|_| SignatureError::InvalidFormat)?;
    let suite = SignatureSuite::for_regime(Regime::PoA);
    suite.verify(admin_pem, &roster_update_signable_bytes(miners_list, activation_block), &signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue() -> Vec<RosterUpdate> {
        vec![
            RosterUpdate { miners_list: vec!["a".into(), "b".into()], activation_height: 0 },
            RosterUpdate { miners_list: vec!["a".into(), "b".into(), "c".into()], activation_height: 10 },
        ]
    }

    #[test]
    fn current_roster_picks_highest_activated_update() {
        let q = queue();
        assert_eq!(current_roster(&q, 5, &[]), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(current_roster(&q, 10, &[]), vec!["a".to_string(), "b".to_string(), "c".to_string()]);
    }

    #[test]
    fn current_roster_falls_back_when_nothing_has_activated() {
        let q = vec![RosterUpdate { miners_list: vec!["x".into()], activation_height: 100 }];
        let fallback = vec!["prev".to_string()];
        assert_eq!(current_roster(&q, 5, &fallback), fallback);
    }

    #[test]
    fn expected_producer_rotates_with_chain_length_and_round() {
        let list = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(expected_producer(&list, 0, 0), Some("a"));
        assert_eq!(expected_producer(&list, 1, 0), Some("b"));
        assert_eq!(expected_producer(&list, 0, 1), Some("b"));
        assert_eq!(expected_producer(&list, 4, 0), Some("b"));
    }

    #[test]
    fn require_my_slot_rejects_wrong_node() {
        let list = vec!["a".to_string(), "b".to_string()];
        assert_eq!(require_my_slot("b", &list, 0, 0), Err(ProductionError::NotMySlot));
        assert!(require_my_slot("a", &list, 0, 0).is_ok());
    }

    #[test]
    fn require_my_slot_rejects_empty_roster() {
        assert_eq!(require_my_slot("a", &[], 0, 0), Err(ProductionError::NoActiveRoster));
    }

    #[test]
    fn round_advancer_steps_only_while_mempool_nonempty() {
        let mut advancer = RoundAdvancer::new();
        assert_eq!(advancer.tick(Duration::from_secs(90), false), 0);
        assert_eq!(advancer.tick(Duration::from_secs(90), true), 1);
        assert_eq!(advancer.tick(Duration::from_secs(200), true), 3);
    }

    #[test]
    fn round_advancer_resets_to_zero() {
        let mut advancer = RoundAdvancer::new();
        advancer.tick(Duration::from_secs(90), true);
        advancer.reset();
        assert_eq!(advancer.round(), 0);
    }
}
