// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Rules as pure data (§3.1, §4.3). Parsing a specific serialization format
//! into these shapes is an infrastructure concern; the domain only fixes the
//! shape and the validation contract.

use serde::{Deserialize, Serialize};

/// Fields common to every stage's rules, per §3.1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleCommon {
    pub id: String,
    pub pattern: String,
    pub priority: i32,
    pub confidence: f64,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageDirection {
    Income,
    Expense,
    Transfer,
}

/// Stage 1 — Transaction Type Detector rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDetectorRule {
    pub common: RuleCommon,
    pub required_field: Option<RequiredField>,
    pub transaction_type: String,
    pub direction: StageDirection,
    pub merchant: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequiredField {
    Debit,
    Credit,
}

/// Stage 2 — Counterparty Detector rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterpartyRule {
    pub common: RuleCommon,
    pub counterparty_id: String,
    pub counterparty_type: String,
    pub extract_after: Option<String>,
    pub extract_from_group: Option<usize>,
}

/// Stage 4 — Disambiguator rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisambiguationRule {
    pub common: RuleCommon,
    pub merchant_id: String,
    pub merchant_name: String,
    pub category: String,
    pub keywords: Vec<String>,
}

/// An ISO 18245 Merchant Category Code entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MccEntry {
    pub code: u32,
    pub name: String,
    pub budget_category: String,
    pub budget_subcategory: String,
    pub typical_flow: String,
    pub tax_deductible: bool,
}

/// The full set of rule tables plus the MCC table, as loaded by the Rules
/// Loader. Rules within each table are kept in file order; priority sort is
/// stable so file order survives as the tie-break (Open Question #3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSet {
    pub type_detector: Vec<TypeDetectorRule>,
    pub counterparty: Vec<CounterpartyRule>,
    pub disambiguation: Vec<DisambiguationRule>,
    pub mcc_table: Vec<MccEntry>,
}

impl RuleSet {
    /// Sorts each table by `priority` ascending, stably, so ties keep their
    /// original (file) order.
    pub fn sort_by_priority(&mut self) {
        self.type_detector.sort_by_key(|r| r.common.priority);
        self.counterparty.sort_by_key(|r| r.common.priority);
        self.disambiguation.sort_by_key(|r| r.common.priority);
    }

    /// Validates: priority is non-negative is not required, but no two rules
    /// in any one table may share an `id`, and every `pattern` must compile
    /// as a regex. Returns the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        validate_unique_ids(self.type_detector.iter().map(|r| r.common.id.as_str()))?;
        validate_unique_ids(self.counterparty.iter().map(|r| r.common.id.as_str()))?;
        validate_unique_ids(self.disambiguation.iter().map(|r| r.common.id.as_str()))?;
        for pattern in self
            .type_detector
            .iter()
            .map(|r| &r.common.pattern)
            .chain(self.counterparty.iter().map(|r| &r.common.pattern))
            .chain(self.disambiguation.iter().map(|r| &r.common.pattern))
        {
            regex::Regex::new(pattern).map_err(|e| format!("invalid pattern '{pattern}': {e}"))?;
        }
        Ok(())
    }
}

fn validate_unique_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Result<(), String> {
    let mut seen = std::collections::HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(format!("duplicate rule id: {id}"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn common(id: &str, priority: i32) -> RuleCommon {
        RuleCommon { id: id.to_string(), pattern: "FOO".to_string(), priority, confidence: 0.9, enabled: true }
    }

    #[test]
    fn rejects_duplicate_ids() {
        let set = RuleSet {
            type_detector: vec![
                TypeDetectorRule {
                    common: common("r1", 1),
                    required_field: None,
                    transaction_type: "card-purchase".to_string(),
                    direction: StageDirection::Expense,
                    merchant: true,
                },
                TypeDetectorRule {
                    common: common("r1", 2),
                    required_field: None,
                    transaction_type: "bank-fee".to_string(),
                    direction: StageDirection::Expense,
                    merchant: false,
                },
            ],
            ..Default::default()
        };
        assert!(set.validate().is_err());
    }

    #[test]
    fn sort_is_stable_on_ties() {
        let mut set = RuleSet {
            type_detector: vec![
                TypeDetectorRule {
                    common: common("first", 1),
                    required_field: None,
                    transaction_type: "a".to_string(),
                    direction: StageDirection::Expense,
                    merchant: true,
                },
                TypeDetectorRule {
                    common: common("second", 1),
                    required_field: None,
                    transaction_type: "b".to_string(),
                    direction: StageDirection::Expense,
                    merchant: true,
                },
            ],
            ..Default::default()
        };
        set.sort_by_priority();
        assert_eq!(set.type_detector[0].common.id, "first");
        assert_eq!(set.type_detector[1].common.id, "second");
    }
}
