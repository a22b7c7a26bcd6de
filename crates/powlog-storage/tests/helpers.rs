#![allow(dead_code)]

use powlog_core::Chain;
use powlog_storage::{FileStore, SledStore, CHAIN_FILE};
use rand::Rng;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

pub fn create_temp_file_store() -> (TempDir, Arc<FileStore>) {
    // Create a temporary directory holding the chain blob
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join(CHAIN_FILE);
    let store = FileStore::open(path).expect("Failed to open FileStore");
    (temp_dir, Arc::new(store))
}

pub fn create_temp_sled_store() -> (TempDir, Arc<SledStore>) {
    // Create a temporary directory for the sled database
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let store = SledStore::open(temp_dir.path()).expect("Failed to open SledStore");
    (temp_dir, Arc::new(store))
}

pub fn random_payload() -> String {
    let mut rng = rand::thread_rng();
    let len = rng.gen_range(1..64);
    (0..len).map(|_| rng.gen_range(b' '..=b'~') as char).collect()
}

/// Append `count` random blocks at difficulty 1.
pub fn grow<S: powlog_core::ChainStore>(chain: &mut Chain<S>, count: usize) {
    let mut rng = rand::thread_rng();
    for _ in 0..count {
        let fee = rng.gen_range(0.0..100.0);
        chain
            .append(random_payload(), fee)
            .expect("Failed to append block");
    }
}
