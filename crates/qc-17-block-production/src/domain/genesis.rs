//! Genesis block assembly for each regime, used by the node runtime
//! when bootstrapping the first node of a network.

use shared_crypto::Secp256k1KeyPair;
use shared_types::entities::{Block, Chain, RegimeFields};
use uuid::Uuid;

/// Build the PoW genesis block: a single allocation transaction to
/// `public_key_pem`, mined to satisfy [`super::pow::POW_PREFIX`].
///
/// Mining genesis inline (rather than through [`super::pow::mine`]) is
/// fine: genesis is produced once, offline, before the node's async
/// runtime starts.
#[must_use]
pub fn genesis_pow(public_key_pem: &str, timestamp: f64) -> Block {
    let tx_id = Uuid::new_v4();
    let genesis_tx = Chain::genesis_transaction(public_key_pem, tx_id, timestamp);
    let mut nonce = 0u64;
    loop {
        let block = Block {
            id: Uuid::new_v4(),
            prev_hash: None,
            timestamp,
            transactions: vec![genesis_tx.clone()],
            files: Default::default(),
            regime: RegimeFields::PoW { nonce },
        };
        if block.hash().starts_with(super::pow::POW_PREFIX) {
            return block;
        }
        nonce += 1;
    }
}

/// Build the PoA genesis block, signed by the admin (the network's
/// founding identity) with the initial roster.
#[must_use]
pub fn genesis_poa(admin_keypair: &Secp256k1KeyPair, miners_list: Vec<String>, timestamp: f64) -> Block {
    let admin_pem = admin_keypair.public_key().export_pem().expect("valid admin key");
    let tx_id = Uuid::new_v4();
    let genesis_tx = Chain::genesis_transaction(&admin_pem, tx_id, timestamp);
    let mut block = Block {
        id: Uuid::new_v4(),
        prev_hash: None,
        timestamp,
        transactions: vec![genesis_tx],
        files: Default::default(),
        regime: RegimeFields::PoA {
            miner_node_id: "genesis".to_string(),
            miner_public_key: admin_pem,
            miners_list,
            signature: None,
        },
    };
    let signature = hex::encode(admin_keypair.sign(&block.signable_bytes()).as_bytes());
    if let RegimeFields::PoA { signature: slot, .. } = &mut block.regime {
        *slot = Some(signature);
    }
    block
}

/// Build the PoS genesis block: no stakers yet, signed by the founding
/// staker with an empty seed (there is no prior block to derive one
/// from).
#[must_use]
pub fn genesis_pos(creator_keypair: &Secp256k1KeyPair, staked_amt: f64, timestamp: f64) -> Block {
    let creator_pem = creator_keypair.public_key().export_pem().expect("valid creator key");
    let tx_id = Uuid::new_v4();
    let genesis_tx = Chain::genesis_transaction(&creator_pem, tx_id, timestamp);
    super::pos::assemble_block(
        None,
        vec![genesis_tx],
        vec![],
        &creator_pem,
        staked_amt,
        String::new(),
        vec![],
        timestamp,
        creator_keypair,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_pow_satisfies_its_own_difficulty_target() {
        let keypair = Secp256k1KeyPair::generate();
        let pem = keypair.public_key().export_pem().unwrap();
        let block = genesis_pow(&pem, 0.0);
        assert!(block.hash().starts_with(super::super::pow::POW_PREFIX));
        assert!(block.prev_hash.is_none());
    }

    #[test]
    fn genesis_poa_embeds_the_initial_roster() {
        let admin = Secp256k1KeyPair::generate();
        let roster = vec!["node-a".to_string(), "node-b".to_string()];
        let block = genesis_poa(&admin, roster.clone(), 0.0);
        match block.regime {
            RegimeFields::PoA { miners_list, signature, .. } => {
                assert_eq!(miners_list, roster);
                assert!(signature.is_some());
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn genesis_pos_has_no_prior_seed() {
        let creator = Secp256k1KeyPair::generate();
        let block = genesis_pos(&creator, 10.0, 0.0);
        match block.regime {
            RegimeFields::PoS { seed, signature, .. } => {
                assert!(seed.is_empty());
                assert!(signature.is_some());
            }
            _ => unreachable!(),
        }
    }
}
