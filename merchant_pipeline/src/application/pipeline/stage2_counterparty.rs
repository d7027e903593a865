// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Stage 2 — Counterparty Detector (§4.5).

use merchant_pipeline_domain::aggregates::{CounterpartyInfo, CounterpartyType, PipelineRecord, Stage2Info};
use merchant_pipeline_domain::services::rules::RuleSet;
use merchant_pipeline_domain::services::stages::CounterpartyDetector as CounterpartyDetectorTrait;
use merchant_pipeline_domain::value_objects::Confidence;
use regex::RegexBuilder;

pub struct RuleBasedCounterpartyDetector;

impl CounterpartyDetectorTrait for RuleBasedCounterpartyDetector {
    fn detect(&self, record: PipelineRecord, rules: &RuleSet) -> PipelineRecord {
        let stage_1_confidence = record.stage_1.as_ref().expect("stage 2 requires stage 1").confidence;
        let description = record.transaction.description.clone();

        for rule in &rules.counterparty {
            if !rule.common.enabled {
                continue;
            }
            let Ok(pattern) = RegexBuilder::new(&rule.common.pattern).case_insensitive(true).build() else {
                continue;
            };
            let Some(captures) = pattern.captures(&description) else { continue };

            let actual_merchant_hint = if let Some(after) = &rule.extract_after {
                description.find(after.as_str()).map(|idx| {
                    description[idx + after.len()..].trim().to_string()
                })
            } else if let Some(group) = rule.extract_from_group {
                captures.get(group).map(|m| m.as_str().trim().to_string())
            } else {
                None
            };

            let confidence = stage_1_confidence.min(Confidence::new(rule.common.confidence));
            let stage_2 = Stage2Info {
                counterparty_info: CounterpartyInfo {
                    detected: true,
                    counterparty_id: Some(rule.counterparty_id.clone()),
                    counterparty_type: parse_counterparty_type(&rule.counterparty_type),
                    actual_merchant_hint,
                    extract_after: rule.extract_after.clone(),
                    confidence,
                },
            };
            return record.with_stage_2(stage_2);
        }

        let stage_2 = Stage2Info {
            counterparty_info: CounterpartyInfo {
                detected: false,
                counterparty_id: None,
                counterparty_type: None,
                actual_merchant_hint: None,
                extract_after: None,
                confidence: stage_1_confidence,
            },
        };
        record.with_stage_2(stage_2)
    }
}

fn parse_counterparty_type(s: &str) -> Option<CounterpartyType> {
    match s {
        "payment-aggregator" => Some(CounterpartyType::PaymentAggregator),
        "marketplace" => Some(CounterpartyType::Marketplace),
        "payment-processor" => Some(CounterpartyType::PaymentProcessor),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use merchant_pipeline_domain::aggregates::{Direction, Stage1Info};
    use merchant_pipeline_domain::entities::RawTransaction;
    use merchant_pipeline_domain::services::rules::{CounterpartyRule, RuleCommon};
    use merchant_pipeline_domain::value_objects::Money;

    fn base_record(description: &str) -> PipelineRecord {
        let tx = RawTransaction {
            date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            description: description.to_string(),
            debit: Some(Money::from_decimal(2236.0)),
            credit: None,
            balance: Money::from_decimal(0.0),
            source_file: "test.csv".to_string(),
            source_line: 1,
            currency: None,
        };
        PipelineRecord::new(tx).with_stage_1(Stage1Info {
            transaction_type: "card-purchase".to_string(),
            direction: Direction::Expense,
            merchant: true,
            confidence: Confidence::new(0.95),
            matched_rule_id: Some("card".to_string()),
        })
    }

    #[test]
    fn clip_aggregator_extracts_merchant_hint() {
        let rules = RuleSet {
            counterparty: vec![CounterpartyRule {
                common: RuleCommon { id: "clip".to_string(), pattern: "CLIPMX AGREGADOR".to_string(), priority: 1, confidence: 0.9, enabled: true },
                counterparty_id: "clip".to_string(),
                counterparty_type: "payment-aggregator".to_string(),
                extract_after: Some("CLIP MX".to_string()),
                extract_from_group: None,
            }],
            ..Default::default()
        };
        let record = base_record("CLIPMX AGREGADOR 00000000101008685717 CLIP MX REST HANAICHI REF. 0013732041");
        let detector = RuleBasedCounterpartyDetector;
        let out = detector.detect(record, &rules);
        let info = out.stage_2.unwrap().counterparty_info;
        assert!(info.detected);
        assert_eq!(info.counterparty_id.as_deref(), Some("clip"));
        assert_eq!(info.actual_merchant_hint.as_deref(), Some("REST HANAICHI REF. 0013732041"));
    }

    #[test]
    fn no_match_leaves_confidence_unchanged() {
        let record = base_record("BANK OF AMERICA CREDIT CARD Bill Payment");
        let detector = RuleBasedCounterpartyDetector;
        let out = detector.detect(record, &RuleSet::default());
        let info = out.stage_2.unwrap().counterparty_info;
        assert!(!info.detected);
        assert_eq!(info.confidence.value(), 0.95);
    }
}
