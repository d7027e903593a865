// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Stage 3 — NER Extractor (§4.6).
//!
//! Noise removal and context preservation run as fixed, ordered regex
//! passes. `removed_noise`, `kept_context`, and the surviving
//! `clean_merchant` are a partition of the processed substrings of the
//! starting string, per the stage's invariant.

use merchant_pipeline_domain::aggregates::{ExtractionMethod, PipelineRecord, Stage3Info};
use merchant_pipeline_domain::services::rules::RuleSet;
use merchant_pipeline_domain::services::stages::NerExtractor as NerExtractorTrait;
use merchant_pipeline_domain::value_objects::Confidence;
use regex::Regex;
use std::sync::OnceLock;

fn noise_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            Regex::new(r"\b\d{20,}\b").unwrap(),                     // 20+-digit ids
            Regex::new(r"(?i)\bREF\.?\s*\d+\b").unwrap(),            // REF. blocks
            Regex::new(r"(?i)\bAUT\.?\s*\d+\b").unwrap(),            // AUT. blocks
            Regex::new(r"(?i)\bRFC\s+[A-Z0-9]+\b").unwrap(),         // RFC blocks
            Regex::new(r"(?i)\bhttps?://\S+\b").unwrap(),            // URLs
            Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").unwrap(),           // date strings
            Regex::new(r"(?i)\b[A-Z]{2}/[A-Z]{2}\b").unwrap(),       // city/country codes
        ]
    })
}

fn context_patterns() -> &'static [(Regex, &'static str)] {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            (Regex::new(r"(?i)\bRECURRING\b").unwrap(), "RECURRING"),
            (Regex::new(r"(?i)\bCARG\s*RE\b").unwrap(), "CARG RE"),
            (Regex::new(r"(?i)\bPAID\s*FEATURES\b").unwrap(), "PAID FEATURES"),
            (Regex::new(r"(?i)\bSUBSCRIPTION\b").unwrap(), "SUBSCRIPTION"),
        ]
    })
}

pub struct RegexNerExtractor;

impl NerExtractorTrait for RegexNerExtractor {
    fn extract(&self, record: PipelineRecord, _rules: &RuleSet) -> PipelineRecord {
        let stage_2 = record.stage_2.as_ref().expect("stage 3 requires stage 2").clone();
        let prior_confidence = stage_2.counterparty_info.confidence;

        let starting = if stage_2.counterparty_info.detected {
            stage_2
                .counterparty_info
                .actual_merchant_hint
                .clone()
                .unwrap_or_else(|| record.transaction.description.clone())
        } else {
            record.transaction.description.clone()
        };

        let mut working = starting;
        let mut removed_noise = Vec::new();
        for pattern in noise_patterns() {
            if let Some(m) = pattern.find(&working) {
                removed_noise.push(m.as_str().to_string());
                working = pattern.replace_all(&working, " ").into_owned();
            }
        }

        let mut kept_context = Vec::new();
        for (pattern, label) in context_patterns() {
            if pattern.is_match(&working) {
                kept_context.push((*label).to_string());
                working = pattern.replace_all(&working, " ").into_owned();
            }
        }

        let collapsed = working.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();

        let stage_3 = if collapsed.chars().count() < 3 || collapsed.chars().all(|c| c.is_ascii_digit() || c.is_whitespace()) {
            Stage3Info {
                clean_merchant: None,
                removed_noise,
                kept_context,
                extraction_method: ExtractionMethod::Failed,
                confidence: prior_confidence.min(Confidence::new(0.2)),
            }
        } else {
            Stage3Info {
                clean_merchant: Some(collapsed),
                removed_noise,
                kept_context,
                extraction_method: ExtractionMethod::Succeeded,
                confidence: prior_confidence,
            }
        };

        record.with_stage_3(stage_3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use merchant_pipeline_domain::aggregates::{CounterpartyInfo, Direction, Stage1Info, Stage2Info};
    use merchant_pipeline_domain::entities::RawTransaction;
    use merchant_pipeline_domain::value_objects::Money;

    fn record_with_hint(hint: &str) -> PipelineRecord {
        let tx = RawTransaction {
            date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            description: "ignored".to_string(),
            debit: Some(Money::from_decimal(10.0)),
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
                    detected: true,
                    counterparty_id: Some("clip".to_string()),
                    counterparty_type: None,
                    actual_merchant_hint: Some(hint.to_string()),
                    extract_after: None,
                    confidence: Confidence::new(0.9),
                },
            })
    }

    #[test]
    fn strips_ref_and_aut_blocks_and_keeps_merchant() {
        let extractor = RegexNerExtractor;
        let record = record_with_hint("REST HANAICHI REF. 0013732041 AUT. 742785 RFC BLI 120726UF6");
        let out = extractor.extract(record, &RuleSet::default());
        let stage_3 = out.stage_3.unwrap();
        assert_eq!(stage_3.clean_merchant.as_deref(), Some("REST HANAICHI"));
        assert_eq!(stage_3.extraction_method, ExtractionMethod::Succeeded);
    }

    #[test]
    fn short_result_fails_with_lowered_confidence() {
        let extractor = RegexNerExtractor;
        let record = record_with_hint("12");
        let out = extractor.extract(record, &RuleSet::default());
        let stage_3 = out.stage_3.unwrap();
        assert!(stage_3.clean_merchant.is_none());
        assert_eq!(stage_3.extraction_method, ExtractionMethod::Failed);
        assert!(stage_3.confidence.at_least(0.0));
        assert!(stage_3.confidence.value() <= 0.2);
    }
}
