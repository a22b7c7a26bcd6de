pub mod file_store;
pub mod sled_store;

pub use file_store::FileStore;
pub use sled_store::SledStore;

/// File name of the chain blob inside a data directory.
pub const CHAIN_FILE: &str = "blockchain.bin";
