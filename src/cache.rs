//! Content fingerprints for compiled SQL.
//!
//! Compilation is deterministic, so a fingerprint of the insight plus its
//! compile options is a sound cache key for the emitted SQL and for result
//! sets keyed off it.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 fingerprint of a serializable value.
///
/// The value is serialized to JSON before hashing, ensuring deterministic
/// output. Returns a 64-character lowercase hexadecimal string.
///
/// # Errors
/// Returns an error if the value cannot be serialized to JSON.
pub fn fingerprint<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
