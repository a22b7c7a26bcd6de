use crate::block::{Block, Candidate};
use crate::hasher::meets_difficulty;
use tracing::info;

/// Mine the candidate by incrementing the nonce from its current value until
/// the hash starts with `difficulty` `'0'` characters. The first satisfying
/// nonce wins.
pub fn mine(mut candidate: Candidate, difficulty: usize) -> Block {
    while !meets_difficulty(&candidate.hash, difficulty) {
        candidate.nonce = candidate.nonce.wrapping_add(1);
        candidate.hash = candidate.calculate_hash();
    }
    info!(
        "Mined block with nonce {} and hash {}",
        candidate.nonce, candidate.hash
    );
    candidate.seal()
}
