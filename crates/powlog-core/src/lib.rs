//! Hash-linked, proof-of-work protected append-only log.
//!
//! A [`Chain`] owns an ordered list of [`Block`]s starting at a fixed genesis
//! block. Each appended block is mined so that its SHA-256 hex digest starts
//! with `difficulty` zeros, and links to its predecessor by hash.

pub mod block;
pub mod chain;
pub mod constants;
pub mod error;
pub mod hasher;
pub mod pow;
pub mod store;

pub use block::{Block, Candidate};
pub use chain::{genesis_block, Chain, ChainFault, FaultKind};
pub use error::ChainError;
pub use store::{ChainStore, MemoryStore};
