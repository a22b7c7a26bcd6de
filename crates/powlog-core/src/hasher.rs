//! Canonical block digest.
//!
//! The five hashed fields are encoded as compact JSON with their keys in
//! lexicographic order, then run through SHA-256. Field order in
//! `CanonicalFields` is the key order on the wire, so keep it sorted.

use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};

#[derive(Serialize)]
struct CanonicalFields<'a> {
    data: &'a str,
    #[serde(serialize_with = "encode_fee")]
    fee: f64,
    nonce: u64,
    previous_hash: &'a str,
    timestamp: &'a str,
}

/// Finite fees are JSON numbers; the rest become the strings `"Infinity"`,
/// `"-Infinity"` and `"NaN"` so each stays distinct from the others.
fn encode_fee<S: Serializer>(fee: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if fee.is_finite() {
        serializer.serialize_f64(*fee)
    } else if fee.is_nan() {
        serializer.serialize_str("NaN")
    } else if fee.is_sign_positive() {
        serializer.serialize_str("Infinity")
    } else {
        serializer.serialize_str("-Infinity")
    }
}

/// Canonical byte encoding of a block's hashed fields.
///
/// Compact separators and serde_json float rendering (`0.0`, `1.5`), so the
/// bytes differ from a pretty-printing encoder such as Python's
/// `json.dumps(sort_keys=True)`, which writes `", "`/`": "` and an integer
/// genesis fee as `0`. Another implementation reproduces the digest only by
/// emitting exactly this form.
pub fn canonical_bytes(
    data: &str,
    timestamp: &str,
    previous_hash: &str,
    nonce: u64,
    fee: f64,
) -> Vec<u8> {
    let fields = CanonicalFields {
        data,
        fee,
        nonce,
        previous_hash,
        timestamp,
    };
    // Only strings and numbers, nothing here can fail to encode.
    serde_json::to_vec(&fields).expect("canonical block fields always encode")
}

/// Lowercase hex SHA-256 over [`canonical_bytes`].
pub fn digest(data: &str, timestamp: &str, previous_hash: &str, nonce: u64, fee: f64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_bytes(data, timestamp, previous_hash, nonce, fee));
    hex::encode(hasher.finalize())
}

pub fn leading_zero_hex(hash: &str) -> usize {
    hash.bytes().take_while(|b| *b == b'0').count()
}

/// True when the first `difficulty` characters of `hash` are all `'0'`.
pub fn meets_difficulty(hash: &str, difficulty: usize) -> bool {
    leading_zero_hex(hash) >= difficulty
}
