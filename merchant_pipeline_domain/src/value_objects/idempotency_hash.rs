// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Idempotency hashing for the Event Store's `append` de-duplication.
//!
//! Per §6: "SHA-256 of the UTF-8 bytes of the canonicalized JSON of
//! `(entity_type, data)` where canonicalization sorts map keys ascending and
//! uses compact separators." `serde_json::Value` already serializes maps in
//! `BTreeMap`-sorted order when parsed through `Value::Object` construction
//! from a sorted source, so we re-serialize through a `BTreeMap` to guarantee
//! key order regardless of the caller's insertion order.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyHash([u8; 32]);

impl IdempotencyHash {
    /// Computes the hash of `(entity_type, data)` after canonicalizing `data`
    /// to have ascending, recursively sorted keys.
    pub fn compute(entity_type: &str, data: &Value) -> Self {
        let canonical_data = canonicalize(data);
        let envelope = serde_json::json!({
            "entity_type": entity_type,
            "data": canonical_data,
        });
        // `serde_json::to_vec` on a value built from `BTreeMap`s already
        // yields ascending key order and compact (no-whitespace) separators.
        let bytes = serde_json::to_vec(&envelope).expect("canonical value always serializes");
        let digest = Sha256::digest(&bytes);
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses a hex string produced by [`Self::to_hex`] back into a hash.
    /// Returns `None` if it isn't exactly 32 bytes of valid hex.
    pub fn from_hex(hex_str: &str) -> Option<Self> {
        let decoded = hex::decode(hex_str).ok()?;
        let bytes: [u8; 32] = decoded.try_into().ok()?;
        Some(Self(bytes))
    }
}

impl fmt::Display for IdempotencyHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Recursively rebuilds `value` so every object is a `BTreeMap`, giving
/// deterministic ascending key order on serialization.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.iter().map(|(k, v)| (k.clone(), canonicalize(v))).collect();
            serde_json::to_value(sorted).expect("BTreeMap<String, Value> always serializes")
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_order_does_not_affect_hash() {
        let a = json!({"b": 1, "a": 2});
        let b = json!({"a": 2, "b": 1});
        assert_eq!(
            IdempotencyHash::compute("transaction", &a),
            IdempotencyHash::compute("transaction", &b)
        );
    }

    #[test]
    fn different_data_hashes_differently() {
        let a = json!({"amount": 1});
        let b = json!({"amount": 2});
        assert_ne!(
            IdempotencyHash::compute("transaction", &a),
            IdempotencyHash::compute("transaction", &b)
        );
    }

    #[test]
    fn hex_round_trips() {
        let hash = IdempotencyHash::compute("transaction", &json!({"a": 1}));
        assert_eq!(IdempotencyHash::from_hex(&hash.to_hex()), Some(hash));
    }

    #[test]
    fn entity_type_is_part_of_the_hash() {
        let data = json!({"amount": 1});
        assert_ne!(
            IdempotencyHash::compute("transaction", &data),
            IdempotencyHash::compute("entity", &data)
        );
    }
}
