// src/cache/key.rs
use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::cache::CacheType;

/// Deterministic content hash of `(cache_type, canonicalized params)`.
///
/// Params arrive as a `BTreeMap` and serde_json's object maps are sorted, so
/// semantically identical queries hash identically regardless of the order
/// arguments were supplied in.
pub fn cache_key(cache_type: CacheType, params: &BTreeMap<String, Value>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(cache_type.as_str().as_bytes());
    hasher.update(b"\n");
    // A string-keyed map with finite numbers always serializes.
    let canonical = serde_json::to_string(params).expect("cache params serialize");
    hasher.update(canonical.as_bytes());

    let digest = hasher.finalize();
    let mut out = String::with_capacity(64);
    for b in digest.iter() {
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
