//! The consensus regime a node runs under.
//!
//! A single node runs exactly one regime for its whole lifetime; this is
//! distinct from [`crate::entities::RegimeFields`], which is the
//! per-block envelope a regime's blocks carry.

use serde::{Deserialize, Serialize};

/// Which consensus regime a node is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    /// Hash-prefix proof-of-work mining.
    PoW,
    /// VRF-elected, stake-weighted leader election.
    PoS,
    /// Signed, admin-managed rotating miner roster.
    PoA,
}

impl Regime {
    /// The finality cutoff step function for this regime: the largest
    /// chain length `k` that may be treated as finalized out of a chain
    /// of length `n`.
    ///
    /// PoW and PoA share the same fixed-confirmation step table. PoS
    /// uses a fraction-based window that widens with chain length and
    /// then caps at a flat 50-block lag.
    #[must_use]
    pub fn finality_cutoff(self, n: usize) -> usize {
        match self {
            Regime::PoW | Regime::PoA => {
                if n >= 50 {
                    n - 10
                } else if n >= 25 {
                    n - 5
                } else if n >= 10 {
                    n - 3
                } else if n >= 5 {
                    n - 2
                } else {
                    n
                }
            }
            Regime::PoS => {
                if n < 250 {
                    n - n / 5
                } else {
                    n - 50
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pow_cutoff_steps_match_table() {
        assert_eq!(Regime::PoW.finality_cutoff(4), 4);
        assert_eq!(Regime::PoW.finality_cutoff(5), 3);
        assert_eq!(Regime::PoW.finality_cutoff(9), 7);
        assert_eq!(Regime::PoW.finality_cutoff(10), 7);
        assert_eq!(Regime::PoW.finality_cutoff(24), 21);
        assert_eq!(Regime::PoW.finality_cutoff(25), 20);
        assert_eq!(Regime::PoW.finality_cutoff(49), 44);
        assert_eq!(Regime::PoW.finality_cutoff(50), 40);
        assert_eq!(Regime::PoW.finality_cutoff(1000), 990);
    }

    #[test]
    fn poa_matches_pow() {
        for n in [0, 5, 10, 25, 50, 500] {
            assert_eq!(Regime::PoA.finality_cutoff(n), Regime::PoW.finality_cutoff(n));
        }
    }

    #[test]
    fn pos_cutoff_uses_fifth_fraction_below_250() {
        assert_eq!(Regime::PoS.finality_cutoff(10), 8);
        assert_eq!(Regime::PoS.finality_cutoff(100), 80);
        assert_eq!(Regime::PoS.finality_cutoff(249), 200);
    }

    #[test]
    fn pos_cutoff_caps_at_fixed_fifty_lag_past_250() {
        assert_eq!(Regime::PoS.finality_cutoff(250), 200);
        assert_eq!(Regime::PoS.finality_cutoff(1000), 950);
    }
}
