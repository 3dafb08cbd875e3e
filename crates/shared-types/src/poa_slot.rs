//! Proof-of-Authority producer rotation: the slot arithmetic shared by
//! block production (which checks whether it is its own turn) and
//! consensus validation (which checks whether a remote block's claimed
//! producer actually held the turn it claims).

/// The node expected to produce the next block at `chain_len` for the
/// given `round`, or `None` if the roster is empty.
#[must_use]
pub fn expected_producer(miners_list: &[String], chain_len: usize, round: u64) -> Option<&str> {
    if miners_list.is_empty() {
        return None;
    }
    let idx = (chain_len as u64 + round) as usize % miners_list.len();
    miners_list.get(idx).map(String::as_str)
}
