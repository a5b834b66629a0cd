use crate::block::{Block, Event};
use crate::chain::{chain_is_valid, is_valid_link, validate_chain};
use crate::quality::{is_append_eligible, ProductQuality};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, warn};

/// The authoritative, in-memory chain of blocks.
///
/// All mutations go through a single write guard, so concurrent proposals
/// never read the same tail. Readers clone under a read guard and therefore
/// see either the chain before an append or the chain after it.
pub struct Ledger {
    state: RwLock<ChainState>,
}

struct ChainState {
    blocks: Vec<Block>,
    /// Index assigned to the next accepted block.
    next_index: u64,
}

/// Outcome of [`Ledger::propose`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    /// The fully formed candidate, hash included, whether or not it was linked in.
    pub block: Block,
    pub appended: bool,
}

impl ChainState {
    fn tail(&self) -> &Block {
        // A ledger is never built without genesis and never shrinks.
        &self.blocks[self.blocks.len() - 1]
    }

    /// Longest chain wins. Equal, shorter or invalid candidates are ignored.
    ///
    /// A candidate that carries the current tail at the current tail position
    /// is treated as an extension: only its new suffix is checked, and the
    /// existing prefix is kept as is.
    fn adopt(&mut self, mut candidate: Vec<Block>) -> bool {
        let shared = self.blocks.len();
        if candidate.len() <= shared {
            return false;
        }
        if candidate[shared - 1].hash == self.tail().hash {
            let suffix = candidate.split_off(shared);
            return self.extend(suffix);
        }
        if !chain_is_valid(&candidate) {
            warn!(
                len = candidate.len(),
                errors = ?validate_chain(&candidate),
                "refusing to adopt invalid chain"
            );
            return false;
        }
        self.next_index = candidate.last().map_or(1, |b| b.index + 1);
        self.blocks = candidate;
        true
    }

    /// Append `suffix` if every block links to, and hashes consistently
    /// after, its predecessor. All or nothing.
    fn extend(&mut self, suffix: Vec<Block>) -> bool {
        let Some(last) = suffix.last() else {
            return false;
        };
        let mut prev = self.tail();
        for block in &suffix {
            if !is_valid_link(prev, block) || !block.verify() {
                warn!(
                    index = block.index,
                    tail = prev.index,
                    "refusing to adopt chain with broken extension"
                );
                return false;
            }
            prev = block;
        }
        self.next_index = last.index + 1;
        self.blocks.extend(suffix);
        true
    }
}

impl Ledger {
    /// Create a ledger holding only a genesis block stamped with the current time.
    pub fn new() -> Self {
        Self::with_genesis_time(Utc::now())
    }

    /// Create a ledger whose genesis block carries `timestamp`.
    pub fn with_genesis_time(timestamp: DateTime<Utc>) -> Self {
        Self {
            state: RwLock::new(ChainState {
                blocks: vec![Block::genesis(timestamp)],
                next_index: 1,
            }),
        }
    }

    /// Build a block for `event` on top of the current tail and append it if
    /// the readings are eligible.
    pub fn propose(&self, event: &Event) -> Proposal {
        let quality = ProductQuality::classify(event.temperature, event.humidity);
        let eligible = is_append_eligible(event.temperature, event.humidity, &event.farm_id);

        if !eligible {
            let state = self.state.read();
            let block = Block::new(state.next_index, state.tail().hash.clone(), event, quality);
            debug!(index = block.index, "block not eligible for append");
            return Proposal {
                block,
                appended: false,
            };
        }

        let mut state = self.state.write();
        let block = Block::new(state.next_index, state.tail().hash.clone(), event, quality);
        // The candidate chain is the current one plus this block; only the
        // new block needs checking.
        let appended = state.extend(vec![block.clone()]);
        Proposal { block, appended }
    }

    /// Replace the current chain with `candidate` if it is valid and strictly longer.
    pub fn adopt(&self, candidate: Vec<Block>) -> bool {
        self.state.write().adopt(candidate)
    }

    /// A copy of the whole chain, in index order.
    pub fn snapshot(&self) -> Vec<Block> {
        self.state.read().blocks.clone()
    }

    /// Run `f` against the chain under a read guard, without copying it.
    pub fn with_blocks<R>(&self, f: impl FnOnce(&[Block]) -> R) -> R {
        f(&self.state.read().blocks)
    }

    /// Never zero: a ledger holds at least its genesis block.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.state.read().blocks.len()
    }

    pub fn tail(&self) -> Block {
        self.state.read().tail().clone()
    }

    pub fn next_index(&self) -> u64 {
        self.state.read().next_index
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
