use anyhow::{Context, Result};
use powlog_core::{Block, ChainStore};
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Whole-chain bincode blob at a single path.
///
/// Saves write a sibling temp file and rename it over the target, so readers
/// see either the old chain or the new one.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = parent_dir(&path) {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating data directory {}", dir.display()))?;
        }
        info!("file store opened at {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parent_dir(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

impl ChainStore for FileStore {
    fn load(&self) -> Result<Option<Vec<Block>>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()))
            }
        };
        let blocks: Vec<Block> = bincode::deserialize(&bytes)
            .with_context(|| format!("decoding chain from {}", self.path.display()))?;
        debug!("read {} blocks from {}", blocks.len(), self.path.display());
        Ok(Some(blocks))
    }

    fn save(&self, blocks: &[Block]) -> Result<()> {
        let dir = parent_dir(&self.path).unwrap_or_else(|| Path::new("."));
        let tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("creating temp file in {}", dir.display()))?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            bincode::serialize_into(&mut writer, blocks).context("encoding chain")?;
            writer.flush().context("flushing chain")?;
        }
        tmp.as_file().sync_all().context("syncing chain")?;
        tmp.persist(&self.path)
            .map_err(|e| e.error)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        debug!("wrote {} blocks to {}", blocks.len(), self.path.display());
        Ok(())
    }
}
