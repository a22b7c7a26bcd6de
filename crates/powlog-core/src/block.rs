use crate::hasher;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A block still being assembled or mined. Only the nonce and hash move.
#[derive(Clone, Debug)]
pub struct Candidate {
    data: String,
    timestamp: String,
    previous_hash: String,
    fee: f64,
    pub(crate) nonce: u64,
    pub(crate) hash: String,
}

impl Candidate {
    /// Stamp a new candidate with the current UTC time and nonce 0.
    pub fn new(data: impl Into<String>, previous_hash: impl Into<String>, fee: f64) -> Self {
        Self::with_timestamp(data, utc_timestamp(), previous_hash, fee)
    }

    pub fn with_timestamp(
        data: impl Into<String>,
        timestamp: impl Into<String>,
        previous_hash: impl Into<String>,
        fee: f64,
    ) -> Self {
        let mut candidate = Self {
            data: data.into(),
            timestamp: timestamp.into(),
            previous_hash: previous_hash.into(),
            fee,
            nonce: 0,
            hash: String::new(),
        };
        candidate.hash = candidate.calculate_hash();
        candidate
    }

    pub fn calculate_hash(&self) -> String {
        hasher::digest(
            &self.data,
            &self.timestamp,
            &self.previous_hash,
            self.nonce,
            self.fee,
        )
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    /// Freeze the candidate as-is, without any proof-of-work. Genesis only.
    pub fn seal(self) -> Block {
        Block {
            data: self.data,
            timestamp: self.timestamp,
            previous_hash: self.previous_hash,
            nonce: self.nonce,
            fee: self.fee,
            hash: self.hash,
        }
    }
}

/// A mined block. Immutable through the public API.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub(crate) data: String,
    pub(crate) timestamp: String,
    pub(crate) previous_hash: String,
    pub(crate) nonce: u64,
    pub(crate) fee: f64,
    pub(crate) hash: String,
}

impl Block {
    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn fee(&self) -> f64 {
        self.fee
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Digest of the current field values. Does not touch the stored hash.
    pub fn calculate_hash(&self) -> String {
        hasher::digest(
            &self.data,
            &self.timestamp,
            &self.previous_hash,
            self.nonce,
            self.fee,
        )
    }

    /// Stored hash agrees with the recomputed one.
    pub fn is_consistent(&self) -> bool {
        self.hash == self.calculate_hash()
    }
}

/// ISO-8601 UTC with microseconds and an explicit `+00:00` offset.
pub fn utc_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: &str = "2024-01-01T00:00:00.000000+00:00";

    #[test]
    fn new_candidate_starts_at_nonce_zero_with_hash() {
        let c = Candidate::new("hello", "0", 1.5);
        assert_eq!(c.nonce(), 0);
        assert_eq!(c.hash(), c.calculate_hash());
        assert_eq!(c.previous_hash(), "0");
    }

    #[test]
    fn timestamp_is_utc_iso8601() {
        let ts = utc_timestamp();
        assert!(ts.ends_with("+00:00"), "{ts}");
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn sealed_block_keeps_every_field() {
        let block = Candidate::with_timestamp("payload", TS, "abc", 0.5).seal();
        assert_eq!(block.data(), "payload");
        assert_eq!(block.timestamp(), TS);
        assert_eq!(block.previous_hash(), "abc");
        assert_eq!(block.nonce(), 0);
        assert_eq!(block.fee(), 0.5);
        assert_eq!(block.hash(), hasher::digest("payload", TS, "abc", 0, 0.5));
        assert!(block.is_consistent());
    }

    #[test]
    fn calculate_hash_does_not_commit() {
        let mut block = Candidate::with_timestamp("payload", TS, "abc", 0.5).seal();
        let stored = block.hash().to_string();
        block.nonce += 1;
        assert_ne!(block.calculate_hash(), stored);
        assert_eq!(block.hash(), stored);
        assert!(!block.is_consistent());
    }

    #[test]
    fn block_json_round_trip() {
        let block = Candidate::with_timestamp("payload", TS, "abc", 0.5).seal();
        let json = serde_json::to_string(&block).unwrap();
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(block, back);
    }
}
