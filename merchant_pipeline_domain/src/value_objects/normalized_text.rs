// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Text normalization shared by variation matching and entity lookups.
//!
//! Per §3.1, `variations[].text` must be "normalized (uppercase, collapsed
//! whitespace) before insertion", and `find_by_variation` starts with a
//! "case-insensitive, whitespace-normalized exact match".

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn new(raw: &str) -> Self {
        Self(normalize(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tokens(&self) -> std::collections::HashSet<&str> {
        self.0.split_whitespace().collect()
    }
}

/// Uppercases and collapses runs of whitespace to a single space, trimming
/// the ends.
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_and_uppercases() {
        assert_eq!(normalize("  uber   one  "), "UBER ONE");
    }

    #[test]
    fn equal_under_normalization() {
        assert_eq!(NormalizedText::new("Uber One"), NormalizedText::new("UBER   ONE"));
    }
}
