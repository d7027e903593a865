// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Type-safe, opaque entity identifiers.
//!
//! `entity_id` is specified as "stable, opaque identifier (UUID or
//! deterministic keyword) — immutable across versions". `EntityId` wraps a
//! `Ulid` (sortable, collision-resistant, and cheap to generate) but also
//! accepts a deterministic keyword form so callers can mint a stable id from
//! a known string (e.g. `"uber-one"`) without a registry round trip.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// An entity identifier. Either a generated ULID or a deterministic keyword
/// supplied by a disambiguation rule or fallback kebab-case synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Generates a new random, time-sortable id.
    pub fn new() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Builds an id from a deterministic keyword, e.g. a kebab-case merchant
    /// slug synthesized by Stage 4's fallback path.
    pub fn from_keyword(keyword: impl Into<String>) -> Self {
        Self(keyword.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_ids_round_trip_through_display() {
        let id = EntityId::from_keyword("uber-one");
        assert_eq!(id.to_string(), "uber-one");
        assert_eq!(id.as_str(), "uber-one");
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(EntityId::new(), EntityId::new());
    }
}
