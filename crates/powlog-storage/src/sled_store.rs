use anyhow::{Context, Result};
use powlog_core::{Block, ChainStore};
use sled::Db;
use std::path::Path;
use tracing::{debug, info};

const KEY_CHAIN: &[u8] = b"chain";

/// Whole chain as one bincode value under a fixed key.
#[derive(Clone)]
pub struct SledStore {
  db: Db,
}

impl SledStore {
  pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
    let db = sled::open(path).context("opening sled database")?;
    info!("sled store opened");
    Ok(Self { db })
  }

  /// Drop everything persisted so far.
  pub fn clear(&self) -> Result<()> {
    self.db.clear()?;
    self.db.flush()?;
    Ok(())
  }
}

impl ChainStore for SledStore {
  fn load(&self) -> Result<Option<Vec<Block>>> {
    match self.db.get(KEY_CHAIN)? {
      Some(bytes) => {
        let blocks: Vec<Block> =
          bincode::deserialize(&bytes).context("decoding chain from sled")?;
        debug!("read {} blocks from sled", blocks.len());
        Ok(Some(blocks))
      }
      None => Ok(None),
    }
  }

  fn save(&self, blocks: &[Block]) -> Result<()> {
    let bytes = bincode::serialize(blocks).context("encoding chain")?;
    self.db.insert(KEY_CHAIN, bytes)?;
    self.db.flush()?;
    debug!("wrote {} blocks to sled", blocks.len());
    Ok(())
  }
}
