// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The identity-stable `Entity` record: merchants, banks, accounts,
//! categories, and other resolvable counterparties.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{normalize, Confidence, EntityId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    Merchant,
    Bank,
    Account,
    Category,
    TaxAuthority,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityState {
    Provisional,
    Canonical,
    Merged { merged_into: EntityId, merge_reason: String, merged_at: DateTime<Utc> },
}

impl EntityState {
    pub fn is_merged(&self) -> bool {
        matches!(self, Self::Merged { .. })
    }
}

/// A raw textual form under which an entity appears in source data, per
/// §3.1's `{text, source, confidence}` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    pub text: String,
    pub source: String,
    pub confidence: Confidence,
}

impl Variation {
    /// `text` is normalized before storage; callers pass raw text.
    pub fn new(raw_text: &str, source: impl Into<String>, confidence: Confidence) -> Self {
        Self { text: normalize(raw_text), source: source.into(), confidence }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provenance {
    pub source: String,
    pub classified_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The identity-stable record for merchants, banks, accounts, categories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub entity_id: EntityId,
    pub entity_type: EntityType,
    pub canonical_name: String,
    pub state: EntityState,
    pub variations: Vec<Variation>,
    pub parent_org: Option<EntityId>,
    pub subsidiaries: Vec<EntityId>,
    pub version: u64,
    pub provenance: Provenance,
    pub transaction_count: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub confidence_history: Vec<Confidence>,
    /// MCC-derived category code, if this entity has been linked to one.
    pub mcc_code: Option<u32>,
    pub declared_category: Option<String>,
    pub declared_budget_category: Option<String>,
    pub business_deductible: bool,
    pub personal_deductible: bool,
}

impl Entity {
    pub fn new_provisional(
        entity_type: EntityType,
        canonical_name: impl Into<String>,
        source: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let source = source.into();
        Self {
            entity_id: EntityId::new(),
            entity_type,
            canonical_name: canonical_name.into(),
            state: EntityState::Provisional,
            variations: Vec::new(),
            parent_org: None,
            subsidiaries: Vec::new(),
            version: 1,
            provenance: Provenance {
                source: source.clone(),
                classified_by: source,
                created_at: now,
                updated_at: now,
            },
            transaction_count: 0,
            first_seen: now,
            last_seen: now,
            confidence_history: Vec::new(),
            mcc_code: None,
            declared_category: None,
            declared_budget_category: None,
            business_deductible: false,
            personal_deductible: false,
        }
    }

    pub fn mean_confidence(&self) -> Confidence {
        if self.confidence_history.is_empty() {
            return Confidence::ZERO;
        }
        let sum: f64 = self.confidence_history.iter().map(|c| c.value()).sum();
        Confidence::new(sum / self.confidence_history.len() as f64)
    }

    /// Auto-promotion rule: `transaction_count >= 10` and mean confidence
    /// `>= 0.85` flips `provisional -> canonical`.
    pub fn should_auto_promote(&self, min_transactions: u64, min_mean_confidence: f64) -> bool {
        matches!(self.state, EntityState::Provisional)
            && self.transaction_count >= min_transactions
            && self.mean_confidence().value() >= min_mean_confidence
    }

    /// Idempotent on normalized text: a variation whose normalized text
    /// already exists is not duplicated.
    pub fn add_variation(&mut self, variation: Variation) {
        if !self.variations.iter().any(|v| v.text == variation.text) {
            self.variations.push(variation);
        }
    }

    pub fn has_variation(&self, normalized_text: &str) -> bool {
        self.variations.iter().any(|v| v.text == normalized_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(0, 0).unwrap()
    }

    #[test]
    fn auto_promotion_requires_both_thresholds() {
        let mut e = Entity::new_provisional(EntityType::Merchant, "Uber One", "pipeline-auto", now());
        e.transaction_count = 10;
        e.confidence_history = vec![Confidence::new(0.9); 10];
        assert!(e.should_auto_promote(10, 0.85));

        e.confidence_history = vec![Confidence::new(0.5); 10];
        assert!(!e.should_auto_promote(10, 0.85));
    }

    #[test]
    fn add_variation_is_idempotent_on_normalized_text() {
        let mut e = Entity::new_provisional(EntityType::Merchant, "Uber One", "pipeline-auto", now());
        e.add_variation(Variation::new("uber one", "pipeline", Confidence::ONE));
        e.add_variation(Variation::new("UBER   ONE", "pipeline", Confidence::ONE));
        assert_eq!(e.variations.len(), 1);
    }
}
