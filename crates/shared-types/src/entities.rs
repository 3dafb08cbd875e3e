//! # Core Ledger Entities
//!
//! `Transaction`, `Stake`, `Block`, and the regime-specific fields a block
//! carries. These are the single source of truth for the shapes every
//! subsystem — mempool, validator, producers, gossip — operates on.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

/// The sentinel sender for the single transaction in block 0.
pub const GENESIS_SENDER: &str = "Genesis";
/// The sentinel receiver marking a contract-deployment transaction.
pub const DEPLOY_RECEIVER: &str = "deploy";
/// The sentinel receiver marking a contract-invocation transaction.
pub const INVOKE_RECEIVER: &str = "invoke";
/// The flat reward credited to a block's producer.
pub const MINER_REWARD: f64 = 6.0;
/// The amount credited to the sole Genesis transaction's receiver.
pub const GENESIS_AMOUNT: f64 = 50.0;

/// A transaction's value payload. The wire form keeps the reference
/// implementation's heterogeneous-list shape: a bare number for a value
/// transfer, `[code, amount]` for a deploy, `[contract_id, function,
/// args, state, amount]` for an invoke.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A plain value transfer of the given amount.
    Value(f64),
    /// Deploy `code` to the ledger, declaring `amount` as the value moved
    /// alongside the deployment.
    Deploy {
        /// Contract source/bytecode, opaque to this crate.
        code: String,
        /// Declared amount moved alongside deployment.
        amount: f64,
    },
    /// Invoke `function` on `contract_id` with `args` against `state`.
    Invoke {
        /// Target contract identifier.
        contract_id: String,
        /// Function name to invoke.
        function: String,
        /// Arguments, opaque to this crate.
        args: Value,
        /// Resulting state snapshot, opaque to this crate.
        state: Value,
        /// Declared amount moved alongside invocation.
        amount: f64,
    },
}

impl Payload {
    /// The numeric amount this payload moves: the value itself for a
    /// transfer, or the trailing `amount` field for deploy/invoke.
    pub fn amount(&self) -> f64 {
        match self {
            Payload::Value(v) => *v,
            Payload::Deploy { amount, .. } => *amount,
            Payload::Invoke { amount, .. } => *amount,
        }
    }
}

impl Serialize for Payload {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Payload::Value(v) => v.serialize(serializer),
            Payload::Deploy { code, amount } => (code, amount).serialize(serializer),
            Payload::Invoke {
                contract_id,
                function,
                args,
                state,
                amount,
            } => (contract_id, function, args, state, amount).serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;
        let value = Value::deserialize(deserializer)?;
        match value {
            Value::Number(n) => n
                .as_f64()
                .map(Payload::Value)
                .ok_or_else(|| D::Error::custom("payload number is not representable as f64")),
            Value::Array(ref arr) if arr.len() == 2 => {
                let code = arr[0]
                    .as_str()
                    .ok_or_else(|| D::Error::custom("deploy payload code must be a string"))?
                    .to_string();
                let amount = arr[1]
                    .as_f64()
                    .ok_or_else(|| D::Error::custom("deploy payload amount must be a number"))?;
                Ok(Payload::Deploy { code, amount })
            }
            Value::Array(ref arr) if arr.len() == 5 => {
                let contract_id = arr[0]
                    .as_str()
                    .ok_or_else(|| D::Error::custom("invoke contract_id must be a string"))?
                    .to_string();
                let function = arr[1]
                    .as_str()
                    .ok_or_else(|| D::Error::custom("invoke function must be a string"))?
                    .to_string();
                let amount = arr[4]
                    .as_f64()
                    .ok_or_else(|| D::Error::custom("invoke amount must be a number"))?;
                Ok(Payload::Invoke {
                    contract_id,
                    function,
                    args: arr[2].clone(),
                    state: arr[3].clone(),
                    amount,
                })
            }
            other => Err(D::Error::custom(format!(
                "unrecognized transaction payload shape: {other}"
            ))),
        }
    }
}

/// A signed value transfer, contract deployment, or contract invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique opaque identifier.
    pub id: Uuid,
    /// What this transaction moves.
    pub payload: Payload,
    /// Sender public key in PEM, or `"Genesis"` (block 0 only).
    pub sender: String,
    /// Receiver public key in PEM, or `"deploy"`/`"invoke"`.
    pub receiver: String,
    /// Wall-clock seconds at creation.
    pub timestamp: f64,
    /// Signature over the canonical signable encoding. Absent only for
    /// the Genesis transaction.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub signature: Option<Vec<u8>>,
}

impl Transaction {
    /// True if this is the sentinel Genesis transaction (only valid in
    /// block 0, unsigned).
    pub fn is_genesis(&self) -> bool {
        self.sender == GENESIS_SENDER
    }

    /// The numeric amount moved by this transaction.
    pub fn amount(&self) -> f64 {
        self.payload.amount()
    }

    /// The canonical signable JSON value: `{id, payload, sender,
    /// receiver, timestamp}` in that key order, excluding the signature.
    pub fn signable_json(&self) -> Value {
        let mut m = Map::new();
        m.insert("id".into(), json!(self.id));
        m.insert("payload".into(), json!(self.payload));
        m.insert("sender".into(), json!(self.sender));
        m.insert("receiver".into(), json!(self.receiver));
        m.insert("timestamp".into(), json!(self.timestamp));
        Value::Object(m)
    }

    /// The canonical signable text encoding, the exact bytes that are
    /// signed and that signatures are verified against.
    pub fn signable_bytes(&self) -> Vec<u8> {
        self.signable_json().to_string().into_bytes()
    }

    /// The digestable JSON value used when this transaction is embedded
    /// in a block for hashing/wire purposes: the signable form plus a
    /// base64 `sign` field, omitted for the Genesis transaction.
    pub fn digestable_json(&self) -> Value {
        let mut m = match self.signable_json() {
            Value::Object(m) => m,
            _ => unreachable!("signable_json always returns an object"),
        };
        if !self.is_genesis() {
            if let Some(sig) = &self.signature {
                use base64::Engine;
                m.insert(
                    "sign".into(),
                    json!(base64::engine::general_purpose::STANDARD.encode(sig)),
                );
            }
        }
        Value::Object(m)
    }
}

impl PartialEq for Transaction {
    /// Equality matches the reference implementation: `id`, `sender`,
    /// `receiver`, and `timestamp` only — payload and signature are not
    /// compared.
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.sender == other.sender
            && self.receiver == other.receiver
            && self.timestamp == other.timestamp
    }
}
impl Eq for Transaction {}

impl std::hash::Hash for Transaction {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A signed PoS stake submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stake {
    /// Unique opaque identifier.
    pub id: Uuid,
    /// Staker public key in PEM.
    pub staker: String,
    /// Staked amount; must be strictly positive.
    pub amount: f64,
    /// Wall-clock seconds at creation.
    pub timestamp: f64,
    /// Signature over the canonical signable encoding.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub signature: Option<Vec<u8>>,
}

impl Stake {
    /// The canonical signable JSON value: `{id, staker, amt, ts}`.
    pub fn signable_json(&self) -> Value {
        let mut m = Map::new();
        m.insert("id".into(), json!(self.id));
        m.insert("staker".into(), json!(self.staker));
        m.insert("amt".into(), json!(self.amount));
        m.insert("ts".into(), json!(self.timestamp));
        Value::Object(m)
    }

    /// The canonical signable text encoding.
    pub fn signable_bytes(&self) -> Vec<u8> {
        self.signable_json().to_string().into_bytes()
    }
}

/// The fields that distinguish a block under each consensus regime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "regime")]
pub enum RegimeFields {
    /// Proof-of-Work: a nonce searched until the block hash meets target.
    #[serde(rename = "pow")]
    PoW {
        /// The winning nonce.
        nonce: u64,
    },
    /// Proof-of-Stake: VRF-elected producer plus the epoch's stake set.
    #[serde(rename = "pos")]
    PoS {
        /// Producer public key in PEM.
        creator: String,
        /// Stake amount the producer had at production time.
        staked_amt: f64,
        /// Stakes admitted during this epoch.
        stakers: Vec<Stake>,
        /// The `epoch_seed` used as the VRF input.
        seed: String,
        /// VRF proof: a signature over `seed`.
        vrf_proof: Vec<u8>,
        /// Signature over the full PoS signable encoding.
        #[serde(skip_serializing_if = "Option::is_none", default)]
        signature: Option<Vec<u8>>,
        /// Whether this block's transactions/reward are honored; set to
        /// false only by proven equivocation (slashing).
        #[serde(default = "default_true")]
        is_valid: bool,
        /// Whether `creator`'s stake deposit is forfeit; set only by
        /// proven equivocation.
        #[serde(default)]
        slash_creator: bool,
    },
    /// Proof-of-Authority: signed by the current roster's expected slot.
    #[serde(rename = "poa")]
    PoA {
        /// The producing node's identifier.
        miner_node_id: String,
        /// The producing node's public key in PEM.
        miner_public_key: String,
        /// The roster in effect for this slot.
        miners_list: Vec<String>,
        /// Hex-encoded signature over the PoA signable encoding.
        #[serde(skip_serializing_if = "Option::is_none", default)]
        signature: Option<String>,
    },
}

fn default_true() -> bool {
    true
}

impl RegimeFields {
    /// The producing identity's public key for this block, used by the
    /// state evaluator's miner-reward and slashing checks.
    pub fn producer_public_key(&self) -> &str {
        match self {
            RegimeFields::PoW { .. } => "",
            RegimeFields::PoS { creator, .. } => creator,
            RegimeFields::PoA { miner_public_key, .. } => miner_public_key,
        }
    }
}

/// An append-only unit of the chain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Block {
    /// Unique opaque identifier.
    pub id: Uuid,
    /// Hash of the previous block; `None` only for block 0.
    pub prev_hash: Option<String>,
    /// Wall-clock seconds at creation.
    pub timestamp: f64,
    /// Ordered transactions included in this block.
    pub transactions: Vec<Transaction>,
    /// Content-ID to description map for externally propagated blobs,
    /// opaque to consensus.
    #[serde(default)]
    pub files: BTreeMap<String, String>,
    /// The regime-specific fields.
    pub regime: RegimeFields,
}

impl Block {
    /// The SHA-256 hash of this block's canonical encoding: `{id,
    /// prev_hash, transactions, timestamp, files}` plus `nonce` for PoW
    /// blocks. PoS/PoA regime fields are never covered by `hash` — they
    /// live in the separately-encoded signable form (see
    /// `signable_bytes`), letting the hash be computed before the
    /// producer's signature (and, for PoS, the epoch's stake set) exist.
    pub fn hash(&self) -> String {
        shared_crypto::sha256_hex(&self.hash_input_bytes())
    }

    fn hash_input_bytes(&self) -> Vec<u8> {
        let mut m = Map::new();
        m.insert("id".into(), json!(self.id));
        m.insert("prev_hash".into(), json!(self.prev_hash));
        m.insert(
            "transactions".into(),
            Value::Array(self.transactions.iter().map(Transaction::digestable_json).collect()),
        );
        m.insert("timestamp".into(), json!(self.timestamp));
        m.insert("files".into(), json!(self.files));
        if let RegimeFields::PoW { nonce } = &self.regime {
            m.insert("nonce".into(), json!(nonce));
        }
        Value::Object(m).to_string().into_bytes()
    }

    /// The full signable encoding used for the block's own producer
    /// signature (PoS, PoA): the hash-covered fields plus the regime
    /// envelope the reference implementation calls `to_dict_with_stakers`.
    pub fn signable_bytes(&self) -> Vec<u8> {
        let mut m = Map::new();
        m.insert("id".into(), json!(self.id));
        m.insert("prev_hash".into(), json!(self.prev_hash));
        m.insert(
            "transactions".into(),
            Value::Array(self.transactions.iter().map(Transaction::digestable_json).collect()),
        );
        m.insert("timestamp".into(), json!(self.timestamp));
        m.insert("files".into(), json!(self.files));
        match &self.regime {
            RegimeFields::PoW { nonce } => {
                m.insert("nonce".into(), json!(nonce));
            }
            RegimeFields::PoS {
                creator,
                staked_amt,
                stakers,
                seed,
                vrf_proof,
                ..
            } => {
                m.insert("creator".into(), json!(creator));
                m.insert("staked_amt".into(), json!(staked_amt));
                m.insert(
                    "stakers".into(),
                    Value::Array(stakers.iter().map(Stake::signable_json).collect()),
                );
                m.insert("seed".into(), json!(seed));
                use base64::Engine;
                m.insert(
                    "vrf_proof".into(),
                    json!(base64::engine::general_purpose::STANDARD.encode(vrf_proof)),
                );
            }
            RegimeFields::PoA {
                miner_node_id,
                miner_public_key,
                miners_list,
                ..
            } => {
                m.insert("miner_node_id".into(), json!(miner_node_id));
                m.insert("miner_public_key".into(), json!(miner_public_key));
                m.insert("miners_list".into(), json!(miners_list));
            }
        }
        Value::Object(m).to_string().into_bytes()
    }

    /// True if `transaction` (by id/sender/receiver/timestamp equality)
    /// already appears in this block.
    pub fn contains_transaction(&self, transaction: &Transaction) -> bool {
        self.transactions.iter().any(|t| t == transaction)
    }

    /// True if `cid` already appears in this block's files map.
    pub fn contains_cid(&self, cid: &str) -> bool {
        self.files.contains_key(cid)
    }
}

/// An ordered sequence of blocks. Most chain-level algorithms (finality,
/// balance, validation, fork choice) live in their own crates and operate
/// on `&[Block]`; this type is the thin owned container the node holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Chain {
    /// Blocks in height order; `blocks[0]` is Genesis once non-empty.
    pub blocks: Vec<Block>,
}

impl Chain {
    /// An empty chain (no Genesis yet).
    pub fn empty() -> Self {
        Self { blocks: Vec::new() }
    }

    /// The last block, if any.
    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True if the chain has no blocks yet.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Builds the Genesis block: a single `Genesis -> public_key_pem,
    /// amount=50` transaction, matching the reference implementation's
    /// `Chain.__init__` first-node path.
    pub fn genesis_transaction(public_key_pem: &str, id: Uuid, timestamp: f64) -> Transaction {
        Transaction {
            id,
            payload: Payload::Value(GENESIS_AMOUNT),
            sender: GENESIS_SENDER.to_string(),
            receiver: public_key_pem.to_string(),
            timestamp,
            signature: None,
        }
    }

    /// Overwrite the chain with `blocks`, but only if it is strictly
    /// longer than the current chain (the reference `Chain.rewrite`
    /// never shrinks the local chain).
    pub fn rewrite(&mut self, blocks: Vec<Block>) -> bool {
        if self.blocks.len() >= blocks.len() {
            return false;
        }
        self.blocks = blocks;
        true
    }

    /// True if `transaction` appears in any block, searched tip-first
    /// (matching the reference implementation's traversal order).
    pub fn contains_transaction(&self, transaction: &Transaction) -> bool {
        self.blocks.iter().rev().any(|b| b.contains_transaction(transaction))
    }

    /// True if `cid` appears in any block's files map, searched tip-first.
    pub fn contains_cid(&self, cid: &str) -> bool {
        self.blocks.iter().rev().any(|b| b.contains_cid(cid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(sender: &str, receiver: &str, amount: f64) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            payload: Payload::Value(amount),
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            timestamp: 1000.0,
            signature: Some(vec![1, 2, 3]),
        }
    }

    #[test]
    fn signable_json_excludes_signature_and_orders_keys() {
        let t = tx("PKa", "PKb", 10.0);
        let s = t.signable_json();
        let obj = s.as_object().unwrap();
        let keys: Vec<_> = obj.keys().cloned().collect();
        assert_eq!(keys, vec!["id", "payload", "sender", "receiver", "timestamp"]);
    }

    #[test]
    fn digestable_json_includes_signature_for_non_genesis() {
        let t = tx("PKa", "PKb", 10.0);
        let d = t.digestable_json();
        assert!(d.as_object().unwrap().contains_key("sign"));
    }

    #[test]
    fn genesis_transaction_never_carries_sign() {
        let t = Chain::genesis_transaction("PKpem", Uuid::new_v4(), 0.0);
        let d = t.digestable_json();
        assert!(!d.as_object().unwrap().contains_key("sign"));
    }

    #[test]
    fn equality_ignores_payload_and_signature() {
        let mut a = tx("PKa", "PKb", 10.0);
        let mut b = a.clone();
        b.payload = Payload::Value(999.0);
        b.signature = None;
        assert_eq!(a, b);
        a.timestamp += 1.0;
        assert_ne!(a, b);
    }

    #[test]
    fn payload_roundtrips_through_json() {
        let p = Payload::Invoke {
            contract_id: "c1".into(),
            function: "transfer".into(),
            args: json!([1, 2]),
            state: json!({"x": 1}),
            amount: 5.0,
        };
        let s = serde_json::to_string(&p).unwrap();
        let back: Payload = serde_json::from_str(&s).unwrap();
        assert_eq!(p, back);
    }

    #[test]
    fn pow_block_hash_changes_with_nonce() {
        let b1 = Block {
            id: Uuid::new_v4(),
            prev_hash: None,
            timestamp: 0.0,
            transactions: vec![],
            files: BTreeMap::new(),
            regime: RegimeFields::PoW { nonce: 0 },
        };
        let mut b2 = b1.clone();
        b2.regime = RegimeFields::PoW { nonce: 1 };
        assert_ne!(b1.hash(), b2.hash());
    }

    #[test]
    fn pos_block_hash_excludes_stakers_and_seed() {
        let base = Block {
            id: Uuid::new_v4(),
            prev_hash: None,
            timestamp: 0.0,
            transactions: vec![],
            files: BTreeMap::new(),
            regime: RegimeFields::PoS {
                creator: "PKa".into(),
                staked_amt: 10.0,
                stakers: vec![],
                seed: "seedA".into(),
                vrf_proof: vec![1],
                signature: None,
                is_valid: true,
                slash_creator: false,
            },
        };
        let mut changed_seed = base.clone();
        changed_seed.regime = RegimeFields::PoS {
            creator: "PKa".into(),
            staked_amt: 10.0,
            stakers: vec![],
            seed: "seedB".into(),
            vrf_proof: vec![1],
            signature: None,
            is_valid: true,
            slash_creator: false,
        };
        assert_eq!(base.hash(), changed_seed.hash());
    }

    #[test]
    fn chain_rewrite_never_shrinks() {
        let mut c = Chain { blocks: vec![] };
        let b = Block {
            id: Uuid::new_v4(),
            prev_hash: None,
            timestamp: 0.0,
            transactions: vec![],
            files: BTreeMap::new(),
            regime: RegimeFields::PoW { nonce: 0 },
        };
        assert!(c.rewrite(vec![b.clone(), b.clone()]));
        assert!(!c.rewrite(vec![b.clone()]));
        assert_eq!(c.len(), 2);
    }
}
