//! The balance evaluator: interprets a chain prefix (plus an optional
//! pending set) into a public key's spendable balance.

use super::errors::StateError;
use shared_types::entities::{Block, RegimeFields, Stake, Transaction, MINER_REWARD};
use shared_types::regime::Regime;

/// Transactions and, for PoS, stakes not yet included in any block —
/// the in-flight mempool plus the current epoch's stake submissions.
#[derive(Debug, Default, Clone, Copy)]
pub struct Pending<'a> {
    /// Mempool transactions not yet included in a block.
    pub transactions: &'a [Transaction],
    /// Current-epoch stake submissions (PoS only; empty otherwise).
    pub stakes: &'a [Stake],
}

impl<'a> Pending<'a> {
    /// No pending transactions or stakes.
    #[must_use]
    pub fn none() -> Self {
        Self {
            transactions: &[],
            stakes: &[],
        }
    }
}

/// `balance(public_key)` over `blocks[0..blocks.len())`, per the
/// six-step evaluator: finalized prefix (with PoS slashing/invalidity
/// skips and miner rewards), a sender-only non-finalized tail, and
/// sender-only pending debits.
#[must_use]
pub fn balance(blocks: &[Block], public_key: &str, regime: Regime, pending: Pending<'_>) -> f64 {
    let n = blocks.len();
    let m = regime.finality_cutoff(n);
    let mut total = 0.0;

    for block in &blocks[..m] {
        if let RegimeFields::PoS {
            slash_creator,
            creator,
            staked_amt,
            is_valid,
            ..
        } = &block.regime
        {
            if *slash_creator && creator == public_key {
                total -= staked_amt;
            }
            if !*is_valid {
                continue;
            }
        }

        for tx in &block.transactions {
            apply_transaction(&mut total, tx, public_key);
        }
        if block.regime.producer_public_key() == public_key {
            total += MINER_REWARD;
        }
    }

    for block in &blocks[m..n] {
        for tx in &block.transactions {
            if tx.sender == public_key {
                total -= tx.amount();
            }
        }
    }

    for tx in pending.transactions {
        if tx.sender == public_key {
            total -= tx.amount();
        }
    }
    for stake in pending.stakes {
        if stake.staker == public_key {
            total -= stake.amount;
        }
    }

    total
}

fn apply_transaction(total: &mut f64, tx: &Transaction, public_key: &str) {
    if tx.sender == public_key {
        *total -= tx.amount();
    } else if tx.receiver == public_key {
        *total += tx.amount();
    }
}

/// Admission rule for a new transaction `tx` about to be appended to a
/// block being assembled: its amount must be strictly positive and not
/// exceed the sender's balance against the chain prefix plus whatever
/// of the in-progress block (and, for PoS, its stakes) has been
/// assembled so far.
pub fn check_admission(
    blocks: &[Block],
    tx: &Transaction,
    regime: Regime,
    pending: Pending<'_>,
) -> Result<(), StateError> {
    let amount = tx.amount();
    if amount <= 0.0 {
        return Err(StateError::NonPositiveAmount(tx.id));
    }
    let available = balance(blocks, &tx.sender, regime, pending);
    if amount > available {
        return Err(StateError::InsufficientBalance {
            public_key: tx.sender.clone(),
            required: amount,
            available,
        });
    }
    Ok(())
}

/// Admission rule for a new stake submission: strictly positive amount,
/// not exceeding the staker's balance against the chain prefix plus the
/// epoch's stakes and mempool transactions assembled so far.
pub fn check_stake_admission(
    blocks: &[Block],
    stake: &Stake,
    regime: Regime,
    pending: Pending<'_>,
) -> Result<(), StateError> {
    if stake.amount <= 0.0 {
        return Err(StateError::NonPositiveStake(stake.id));
    }
    let available = balance(blocks, &stake.staker, regime, pending);
    if stake.amount > available {
        return Err(StateError::InsufficientBalance {
            public_key: stake.staker.clone(),
            required: stake.amount,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::entities::Payload;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn tx(sender: &str, receiver: &str, amount: f64) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            payload: Payload::Value(amount),
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            timestamp: 0.0,
            signature: Some(vec![1]),
        }
    }

    fn pow_block(prev_hash: Option<String>, transactions: Vec<Transaction>, nonce: u64) -> Block {
        Block {
            id: Uuid::new_v4(),
            prev_hash,
            timestamp: 0.0,
            transactions,
            files: BTreeMap::new(),
            regime: RegimeFields::PoW { nonce },
        }
    }

    #[test]
    fn finalized_credit_and_debit_are_applied() {
        let blocks = vec![
            pow_block(None, vec![tx("Genesis", "PKa", 50.0)], 0),
            pow_block(Some("h0".into()), vec![], 1),
            pow_block(Some("h1".into()), vec![], 2),
            pow_block(Some("h2".into()), vec![], 3),
            pow_block(Some("h3".into()), vec![], 4),
            pow_block(Some("h4".into()), vec![], 5),
        ];
        // 6 blocks -> cutoff m = 4, so block 0's genesis credit is finalized.
        let bal = balance(&blocks, "PKa", Regime::PoW, Pending::none());
        assert_eq!(bal, 50.0);
    }

    #[test]
    fn non_finalized_tail_only_debits_sender_side() {
        let blocks = vec![
            pow_block(None, vec![tx("Genesis", "PKa", 50.0)], 0),
            pow_block(Some("h0".into()), vec![], 1),
            pow_block(Some("h1".into()), vec![tx("PKa", "PKb", 10.0)], 2),
            pow_block(Some("h2".into()), vec![], 3),
        ];
        // length 4 -> cutoff m = 4 (below 5), everything still finalizes,
        // so block 2's spend both debits PKa and credits PKb here.
        let bal_a = balance(&blocks, "PKa", Regime::PoW, Pending::none());
        let bal_b = balance(&blocks, "PKb", Regime::PoW, Pending::none());
        assert_eq!(bal_a, 40.0);
        assert_eq!(bal_b, 10.0);

        // Adding a 5th block pushes length to 5 -> cutoff m = 3, so the
        // spend at index 2 now falls in the non-finalized tail: it still
        // debits the sender, but no longer credits the receiver.
        let mut blocks = blocks;
        blocks.push(pow_block(Some("h3".into()), vec![], 4));
        let bal_a = balance(&blocks, "PKa", Regime::PoW, Pending::none());
        let bal_b = balance(&blocks, "PKb", Regime::PoW, Pending::none());
        assert_eq!(bal_a, 40.0);
        assert_eq!(bal_b, 0.0);
    }

    #[test]
    fn pending_transaction_debits_sender_only() {
        let blocks = vec![pow_block(None, vec![tx("Genesis", "PKa", 50.0)], 0)];
        let pending_tx = tx("PKa", "PKb", 5.0);
        let pending = Pending {
            transactions: std::slice::from_ref(&pending_tx),
            stakes: &[],
        };
        let bal = balance(&blocks, "PKa", Regime::PoW, pending);
        assert_eq!(bal, 45.0);
    }

    #[test]
    fn slashed_pos_block_neither_credits_nor_rewards() {
        let mut blocks = Vec::new();
        for i in 0..6 {
            let prev = if i == 0 {
                None
            } else {
                Some(format!("h{}", i - 1))
            };
            let txs = if i == 0 {
                vec![tx("Genesis", "PKminer", 50.0)]
            } else {
                vec![]
            };
            let creator = if i == 0 { "PKminer" } else { "PKother" };
            blocks.push(Block {
                id: Uuid::new_v4(),
                prev_hash: prev,
                timestamp: 0.0,
                transactions: txs,
                files: BTreeMap::new(),
                regime: RegimeFields::PoS {
                    creator: creator.into(),
                    staked_amt: 20.0,
                    stakers: vec![],
                    seed: "s".into(),
                    vrf_proof: vec![],
                    signature: None,
                    is_valid: i != 0,
                    slash_creator: i == 0,
                },
            });
        }
        let bal = balance(&blocks, "PKminer", Regime::PoS, Pending::none());
        // block 0 is slashed: its stake deposit is forfeit and its
        // transactions/reward are not honored.
        assert_eq!(bal, -20.0);
    }

    #[test]
    fn check_admission_rejects_non_positive_amount() {
        let blocks = vec![pow_block(None, vec![tx("Genesis", "PKa", 50.0)], 0)];
        let t = tx("PKa", "PKb", 0.0);
        let err = check_admission(&blocks, &t, Regime::PoW, Pending::none()).unwrap_err();
        assert!(matches!(err, StateError::NonPositiveAmount(_)));
    }

    #[test]
    fn check_admission_rejects_overspend() {
        let blocks = vec![pow_block(None, vec![tx("Genesis", "PKa", 50.0)], 0)];
        let t = tx("PKa", "PKb", 1000.0);
        let err = check_admission(&blocks, &t, Regime::PoW, Pending::none()).unwrap_err();
        assert!(matches!(err, StateError::InsufficientBalance { .. }));
    }
}
