// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Stage 1 — Transaction Type Detector (§4.4).

use merchant_pipeline_domain::aggregates::{Direction, PipelineRecord, Stage1Info};
use merchant_pipeline_domain::entities::RawTransaction;
use merchant_pipeline_domain::services::rules::{RequiredField, RuleSet, StageDirection};
use merchant_pipeline_domain::services::stages::TypeDetector as TypeDetectorTrait;
use merchant_pipeline_domain::value_objects::Confidence;
use regex::RegexBuilder;

pub struct RuleBasedTypeDetector;

impl TypeDetectorTrait for RuleBasedTypeDetector {
    fn detect(&self, transaction: RawTransaction, rules: &RuleSet) -> PipelineRecord {
        for rule in &rules.type_detector {
            if !rule.common.enabled {
                continue;
            }
            let Ok(pattern) = RegexBuilder::new(&rule.common.pattern).case_insensitive(true).build() else {
                continue;
            };
            if !pattern.is_match(&transaction.description) {
                continue;
            }
            let field_ok = match rule.required_field {
                Some(RequiredField::Debit) => transaction.has_debit(),
                Some(RequiredField::Credit) => transaction.has_credit(),
                None => true,
            };
            if !field_ok {
                continue;
            }
            let stage_1 = Stage1Info {
                transaction_type: rule.transaction_type.clone(),
                direction: direction_from_rule(rule.direction),
                merchant: rule.merchant,
                confidence: Confidence::new(rule.common.confidence),
                matched_rule_id: Some(rule.common.id.clone()),
            };
            return PipelineRecord::new(transaction).with_stage_1(stage_1);
        }
        // No rule matched: type = unknown, direction = unknown, merchant = false.
        let stage_1 = Stage1Info {
            transaction_type: "unknown".to_string(),
            direction: Direction::Unknown,
            merchant: false,
            confidence: Confidence::ZERO,
            matched_rule_id: None,
        };
        PipelineRecord::new(transaction).with_stage_1(stage_1)
    }
}

fn direction_from_rule(direction: StageDirection) -> Direction {
    match direction {
        StageDirection::Income => Direction::Income,
        StageDirection::Expense => Direction::Expense,
        StageDirection::Transfer => Direction::Transfer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use merchant_pipeline_domain::services::rules::RuleCommon;
    use merchant_pipeline_domain::services::rules::TypeDetectorRule;
    use merchant_pipeline_domain::value_objects::Money;

    fn transaction(description: &str, credit: Option<f64>, debit: Option<f64>) -> RawTransaction {
        RawTransaction {
            date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            description: description.to_string(),
            debit: debit.map(Money::from_decimal),
            credit: credit.map(Money::from_decimal),
            balance: Money::from_decimal(0.0),
            source_file: "test.csv".to_string(),
            source_line: 1,
            currency: None,
        }
    }

    fn rule_set() -> RuleSet {
        RuleSet {
            type_detector: vec![TypeDetectorRule {
                common: RuleCommon {
                    id: "spei-in".to_string(),
                    pattern: "SPEI".to_string(),
                    priority: 1,
                    confidence: 0.98,
                    enabled: true,
                },
                required_field: Some(RequiredField::Credit),
                transaction_type: "spei-transfer-in".to_string(),
                direction: StageDirection::Income,
                merchant: false,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn spei_incoming_transfer_scenario() {
        let detector = RuleBasedTypeDetector;
        let tx = transaction("TRANSF INTERBANCARIA SPEI 0000000000000373", Some(3140.00), None);
        let record = detector.detect(tx, &rule_set());
        let stage_1 = record.stage_1.unwrap();
        assert_eq!(stage_1.transaction_type, "spei-transfer-in");
        assert!(!stage_1.merchant);
        assert!(stage_1.confidence.at_least(0.98));
    }

    #[test]
    fn no_match_falls_back_to_unknown() {
        let detector = RuleBasedTypeDetector;
        let tx = transaction("", None, None);
        let record = detector.detect(tx, &rule_set());
        let stage_1 = record.stage_1.unwrap();
        assert_eq!(stage_1.transaction_type, "unknown");
        assert!(!stage_1.merchant);
        assert_eq!(stage_1.confidence.value(), 0.0);
    }

    #[test]
    fn required_field_gates_the_match() {
        let detector = RuleBasedTypeDetector;
        // SPEI pattern matches but credit is absent, so the rule must not fire.
        let tx = transaction("SPEI TRANSFER", None, Some(100.0));
        let record = detector.detect(tx, &rule_set());
        assert_eq!(record.stage_1.unwrap().transaction_type, "unknown");
    }
}
