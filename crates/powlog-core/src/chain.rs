use crate::block::{Block, Candidate};
use crate::constants::{GENESIS_DATA, GENESIS_PREVIOUS_HASH, HASH_HEX_SIZE};
use crate::error::ChainError;
use crate::pow;
use crate::store::ChainStore;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultKind {
    /// Stored hash differs from the digest of the block's fields.
    HashMismatch,
    /// `previous_hash` differs from the predecessor's hash.
    BrokenLink,
}

/// First block that failed verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainFault {
    pub index: usize,
    pub kind: FaultKind,
}

/// Append-only sequence of mined blocks backed by a `ChainStore`.
///
/// Appends take `&mut self`; callers sharing a chain across threads must hold
/// one lock across the whole append so two blocks never share a predecessor.
pub struct Chain<S: ChainStore + ?Sized> {
    store: Arc<S>,
    blocks: Vec<Block>,
    difficulty: usize,
}

impl<S: ChainStore + ?Sized> Chain<S> {
    /// Load the persisted sequence, or start a genesis-only chain when the
    /// store is empty. A store that cannot be read is an error, never a
    /// reason to start over.
    pub fn open(store: Arc<S>, difficulty: usize) -> Result<Self, ChainError> {
        check_difficulty(difficulty)?;
        let blocks = match store.load().map_err(ChainError::Load)? {
            Some(blocks) => {
                check_genesis(&blocks)?;
                info!("loaded chain with {} blocks", blocks.len());
                blocks
            }
            None => {
                info!("no persisted chain found, starting from genesis");
                vec![genesis_block()]
            }
        };
        Ok(Self {
            store,
            blocks,
            difficulty,
        })
    }

    /// Wrap an existing sequence without verifying it.
    pub fn from_blocks(
        store: Arc<S>,
        blocks: Vec<Block>,
        difficulty: usize,
    ) -> Result<Self, ChainError> {
        check_difficulty(difficulty)?;
        check_genesis(&blocks)?;
        Ok(Self {
            store,
            blocks,
            difficulty,
        })
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Never true: a chain always holds its genesis block.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    pub fn tip(&self) -> &Block {
        // check_genesis guarantees at least one block
        &self.blocks[self.blocks.len() - 1]
    }

    /// Mine a block on top of the tip and persist the extended chain. If the
    /// store refuses the write the new block is dropped again, so the chain
    /// only advances once the store accepted it.
    pub fn append(&mut self, data: impl Into<String>, fee: f64) -> Result<&Block, ChainError> {
        if !fee.is_finite() {
            return Err(ChainError::InvalidFee(fee));
        }
        let candidate = Candidate::new(data, self.tip().hash(), fee);
        let block = pow::mine(candidate, self.difficulty);

        self.blocks.push(block);
        if let Err(e) = self.store.save(&self.blocks) {
            self.blocks.pop();
            return Err(ChainError::Persist(e));
        }

        let tip = self.tip();
        info!(
            "appended block {} with hash {}",
            self.blocks.len() - 1,
            tip.hash()
        );
        Ok(tip)
    }

    /// Write the full sequence to the store.
    pub fn save(&self) -> Result<(), ChainError> {
        self.store.save(&self.blocks).map_err(ChainError::Persist)?;
        debug!("saved {} blocks", self.blocks.len());
        Ok(())
    }

    /// Hash consistency and link continuity for every block after genesis.
    /// Proof-of-work is not re-checked here.
    pub fn verify(&self) -> bool {
        match self.find_fault() {
            Some(fault) => {
                warn!("chain invalid at block {}: {:?}", fault.index, fault.kind);
                false
            }
            None => true,
        }
    }

    /// Lowest-indexed failing block, if any.
    pub fn find_fault(&self) -> Option<ChainFault> {
        (1..self.blocks.len())
            .into_par_iter()
            .find_map_first(|index| self.fault_at(index))
    }

    fn fault_at(&self, index: usize) -> Option<ChainFault> {
        let current = &self.blocks[index];
        let previous = &self.blocks[index - 1];
        let kind = if !current.is_consistent() {
            FaultKind::HashMismatch
        } else if current.previous_hash() != previous.hash() {
            FaultKind::BrokenLink
        } else {
            return None;
        };
        Some(ChainFault { index, kind })
    }
}

/// The fixed first block. Never mined.
pub fn genesis_block() -> Block {
    Candidate::new(GENESIS_DATA, GENESIS_PREVIOUS_HASH, 0.0).seal()
}

fn check_difficulty(difficulty: usize) -> Result<(), ChainError> {
    if difficulty == 0 || difficulty > HASH_HEX_SIZE {
        return Err(ChainError::InvalidDifficulty {
            got: difficulty,
            max: HASH_HEX_SIZE,
        });
    }
    Ok(())
}

fn check_genesis(blocks: &[Block]) -> Result<(), ChainError> {
    match blocks.first() {
        None => Err(ChainError::Corrupt("sequence has no blocks".into())),
        Some(first) if first.previous_hash() != GENESIS_PREVIOUS_HASH => Err(ChainError::Corrupt(
            format!("first block links to {:?}", first.previous_hash()),
        )),
        Some(_) => Ok(()),
    }
}
