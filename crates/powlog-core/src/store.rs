use crate::block::Block;
use anyhow::{anyhow, bail, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Trait the storage backends implement for the chain to persist itself.
/// This lives in `powlog-core` to avoid a circular dependency.
///
/// The chain is always written and read as a whole sequence.
pub trait ChainStore: Send + Sync {
    /// `Ok(None)` when nothing has been persisted yet.
    fn load(&self) -> Result<Option<Vec<Block>>>;
    /// Replace whatever was persisted with `blocks`.
    fn save(&self, blocks: &[Block]) -> Result<()>;
}

/// In-process store, mostly for tests and throwaway chains.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blocks: Mutex<Option<Vec<Block>>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blocks(blocks: Vec<Block>) -> Self {
        Self {
            blocks: Mutex::new(Some(blocks)),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make subsequent `save` calls fail until switched back off.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl ChainStore for MemoryStore {
    fn load(&self) -> Result<Option<Vec<Block>>> {
        let guard = self
            .blocks
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&self, blocks: &[Block]) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("memory store is refusing writes");
        }
        let mut guard = self
            .blocks
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        *guard = Some(blocks.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Candidate;

    #[test]
    fn empty_store_loads_none() {
        assert!(MemoryStore::new().load().unwrap().is_none());
    }

    #[test]
    fn save_replaces_previous_sequence() {
        let store = MemoryStore::new();
        let a = Candidate::new("a", "0", 0.0).seal();
        let b = Candidate::new("b", a.hash(), 1.0).seal();
        store.save(&[a.clone(), b]).unwrap();
        store.save(&[a.clone()]).unwrap();
        assert_eq!(store.load().unwrap(), Some(vec![a]));
    }

    #[test]
    fn failing_writes_leave_contents_alone() {
        let a = Candidate::new("a", "0", 0.0).seal();
        let store = MemoryStore::with_blocks(vec![a.clone()]);
        store.set_fail_writes(true);
        assert!(store.save(&[]).is_err());
        assert_eq!(store.load().unwrap(), Some(vec![a]));
    }
}
