use crate::quality::ProductQuality;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// SHA-256 hash as lowercase hex string.
pub type BlockHash = String;

/// Hash of the genesis block.
///
/// Hard-coded rather than computed from the genesis fields: the chain has to
/// start from a value every node agrees on regardless of when it booted.
pub const GENESIS_HASH: &str = "dc53079703d684e6f7c4c08a32d9cf878b9d7ee0fd7bac3e73e97ffb21d15f34";

/// A sensor reading submitted for a product.
///
/// Fields missing from the JSON payload default to zero / empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct Event {
    pub temperature: i64,
    pub humidity: i64,
    pub product_id: String,
    pub farm_id: String,
}

/// One immutable provenance record, linked to its predecessor by `prev_hash`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Block {
    pub index: u64,
    pub timestamp: DateTime<Utc>,
    pub temperature: i64,
    pub humidity: i64,
    pub product_id: String,
    pub hash: BlockHash,
    pub prev_hash: BlockHash,
    pub farm_id: String,
    /// `None` only on the genesis block.
    pub product_quality: Option<ProductQuality>,
}

impl Block {
    /// The canonical first block of every ledger.
    pub fn genesis(timestamp: DateTime<Utc>) -> Self {
        Self {
            index: 0,
            timestamp,
            temperature: 0,
            humidity: 0,
            product_id: String::new(),
            hash: GENESIS_HASH.into(),
            prev_hash: String::new(),
            farm_id: String::new(),
            product_quality: None,
        }
    }

    /// Build a block for `event`, stamped with the current time.
    pub fn new(index: u64, prev_hash: BlockHash, event: &Event, quality: ProductQuality) -> Self {
        Self::with_timestamp(index, prev_hash, event, quality, Utc::now())
    }

    /// Build a block with an explicit timestamp (for testing / determinism).
    pub fn with_timestamp(
        index: u64,
        prev_hash: BlockHash,
        event: &Event,
        quality: ProductQuality,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp,
            temperature: event.temperature,
            humidity: event.humidity,
            product_id: event.product_id.clone(),
            hash: String::new(),
            prev_hash,
            farm_id: event.farm_id.clone(),
            product_quality: Some(quality),
        };
        block.hash = hash_block(&block);
        block
    }

    /// Whether this block has the shape of the canonical genesis block.
    /// The timestamp is not part of the check.
    pub fn is_genesis(&self) -> bool {
        self.index == 0
            && self.hash == GENESIS_HASH
            && self.prev_hash.is_empty()
            && self.temperature == 0
            && self.humidity == 0
            && self.product_id.is_empty()
            && self.farm_id.is_empty()
            && self.product_quality.is_none()
    }

    /// Verify the block's integrity.
    pub fn verify(&self) -> bool {
        if self.index == 0 {
            return self.is_genesis();
        }
        hash_block(self) == self.hash
    }
}

/// Fingerprint every field of `block` except its own `hash`.
///
/// One `name:value` record per line. Strings carry a byte-length prefix so
/// that no two field tuples produce the same encoding.
pub fn hash_block(block: &Block) -> BlockHash {
    let quality = block.product_quality.map(|q| q.as_str()).unwrap_or("");
    let payload = format!(
        "index:{}\ntime:{}\ntemperature:{}\nhumidity:{}\nproduct:{}\nprev:{}\nfarm:{}\nquality:{}",
        block.index,
        block.timestamp.to_rfc3339(),
        block.temperature,
        block.humidity,
        length_prefixed(&block.product_id),
        length_prefixed(&block.prev_hash),
        length_prefixed(&block.farm_id),
        length_prefixed(quality),
    );
    compute_hash(payload.as_bytes())
}

fn length_prefixed(s: &str) -> String {
    format!("{}:{}", s.len(), s)
}

/// Compute the SHA-256 hex digest of some data.
pub fn compute_hash(data: &[u8]) -> BlockHash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
