// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Stage 4 — Disambiguator (§4.7).
//!
//! Distinct merchant variants of the same brand must map to distinct
//! `merchant_id`s; the rule table's priority order is what makes specific
//! patterns (`uber-one`) win over generic ones (`uber-eats`, `uber-rides`).

use merchant_pipeline_domain::aggregates::{DisambiguationMethod, PipelineRecord, Stage4Info};
use merchant_pipeline_domain::services::rules::RuleSet;
use merchant_pipeline_domain::services::stages::Disambiguator as DisambiguatorTrait;
use merchant_pipeline_domain::value_objects::Confidence;
use regex::RegexBuilder;

pub struct RuleBasedDisambiguator;

impl DisambiguatorTrait for RuleBasedDisambiguator {
    fn disambiguate(&self, record: PipelineRecord, rules: &RuleSet) -> PipelineRecord {
        let stage_3 = record.stage_3.clone().expect("stage 4 requires stage 3");
        let prior_confidence = stage_3.confidence;

        let Some(clean_merchant) = stage_3.clean_merchant.clone() else {
            let stage_4 = Stage4Info {
                merchant_id: None,
                merchant_name: None,
                merchant_category: None,
                disambiguation_method: DisambiguationMethod::Skipped,
                fallback: false,
                confidence: prior_confidence,
            };
            return record.with_stage_4(stage_4);
        };

        for rule in &rules.disambiguation {
            if !rule.common.enabled {
                continue;
            }
            let Ok(pattern) = RegexBuilder::new(&rule.common.pattern).case_insensitive(true).build() else {
                continue;
            };
            if !pattern.is_match(&clean_merchant) {
                continue;
            }
            let keywords_ok = rule
                .keywords
                .iter()
                .all(|kw| clean_merchant.to_uppercase().contains(&kw.to_uppercase()));
            if !keywords_ok {
                continue;
            }
            let stage_4 = Stage4Info {
                merchant_id: Some(rule.merchant_id.clone()),
                merchant_name: Some(rule.merchant_name.clone()),
                merchant_category: Some(rule.category.clone()),
                disambiguation_method: DisambiguationMethod::RuleMatch,
                fallback: false,
                confidence: prior_confidence.product(Confidence::new(rule.common.confidence)),
            };
            return record.with_stage_4(stage_4);
        }

        // Fallback: synthesize a kebab-case merchant_id from the clean merchant.
        let merchant_id = kebab_case(&clean_merchant);
        let stage_4 = Stage4Info {
            merchant_id: Some(merchant_id),
            merchant_name: Some(clean_merchant),
            merchant_category: Some("uncategorized".to_string()),
            disambiguation_method: DisambiguationMethod::Fallback,
            fallback: true,
            confidence: prior_confidence.product(Confidence::new(0.5)),
        };
        record.with_stage_4(stage_4)
    }
}

fn kebab_case(input: &str) -> String {
    input
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use merchant_pipeline_domain::aggregates::{
        CounterpartyInfo, Direction, ExtractionMethod, Stage1Info, Stage2Info, Stage3Info,
    };
    use merchant_pipeline_domain::entities::RawTransaction;
    use merchant_pipeline_domain::services::rules::{DisambiguationRule, RuleCommon};
    use merchant_pipeline_domain::value_objects::Money;

    fn record_with_clean_merchant(clean: &str) -> PipelineRecord {
        let tx = RawTransaction {
            date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            description: "ignored".to_string(),
            debit: Some(Money::from_decimal(3.57)),
            credit: None,
            balance: Money::from_decimal(0.0),
            source_file: "test.csv".to_string(),
            source_line: 1,
            currency: None,
        };
        PipelineRecord::new(tx)
            .with_stage_1(Stage1Info {
                transaction_type: "card-purchase".to_string(),
                direction: Direction::Expense,
                merchant: true,
                confidence: Confidence::new(0.9),
                matched_rule_id: None,
            })
            .with_stage_2(Stage2Info {
                counterparty_info: CounterpartyInfo {
                    detected: false,
                    counterparty_id: None,
                    counterparty_type: None,
                    actual_merchant_hint: None,
                    extract_after: None,
                    confidence: Confidence::new(0.9),
                },
            })
            .with_stage_3(Stage3Info {
                clean_merchant: Some(clean.to_string()),
                removed_noise: vec![],
                kept_context: vec![],
                extraction_method: ExtractionMethod::Succeeded,
                confidence: Confidence::new(0.9),
            })
    }

    fn rule(id: &str, priority: i32, pattern: &str, merchant_id: &str) -> DisambiguationRule {
        DisambiguationRule {
            common: RuleCommon { id: id.to_string(), pattern: pattern.to_string(), priority, confidence: 0.95, enabled: true },
            merchant_id: merchant_id.to_string(),
            merchant_name: merchant_id.to_string(),
            category: "subscriptions".to_string(),
            keywords: vec![],
        }
    }

    #[test]
    fn uber_one_is_distinguished_from_uber_eats() {
        let rules = RuleSet {
            disambiguation: vec![
                rule("uber-one", 1, "UBER.*ONE", "uber-one"),
                rule("uber-eats", 2, "UBER.*EATS", "uber-eats"),
            ],
            ..Default::default()
        };
        let record = record_with_clean_merchant("UBER ONE");
        let out = RuleBasedDisambiguator.disambiguate(record, &rules);
        assert_eq!(out.stage_4.unwrap().merchant_id.as_deref(), Some("uber-one"));
    }

    #[test]
    fn fallback_synthesizes_kebab_case_id() {
        let record = record_with_clean_merchant("REST HANAICHI");
        let out = RuleBasedDisambiguator.disambiguate(record, &RuleSet::default());
        let stage_4 = out.stage_4.unwrap();
        assert_eq!(stage_4.merchant_id.as_deref(), Some("rest-hanaichi"));
        assert!(stage_4.fallback);
    }
}
