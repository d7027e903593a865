// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `PipelineRecord`: the immutable accumulator passed through stages 1-5.
//!
//! Per Design Notes §9, the source's open accumulating map becomes a product
//! type with one optional sub-struct per stage. Field monotonicity — "each
//! stage takes the record by value and returns a new record with its own
//! sub-struct set to `Some(..)`; earlier fields are carried forward
//! unchanged" — is enforced by construction: every `with_stage_N` method
//! consumes `self`, asserts the expected prior stage is present, and returns
//! a new record that is a strict superset.

use serde::{Deserialize, Serialize};

use crate::entities::RawTransaction;
use crate::value_objects::{Confidence, EntityId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Income,
    Expense,
    Transfer,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage1Info {
    pub transaction_type: String,
    pub direction: Direction,
    pub merchant: bool,
    pub confidence: Confidence,
    pub matched_rule_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CounterpartyType {
    PaymentAggregator,
    Marketplace,
    PaymentProcessor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterpartyInfo {
    pub detected: bool,
    pub counterparty_id: Option<String>,
    pub counterparty_type: Option<CounterpartyType>,
    pub actual_merchant_hint: Option<String>,
    pub extract_after: Option<String>,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage2Info {
    pub counterparty_info: CounterpartyInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionMethod {
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage3Info {
    pub clean_merchant: Option<String>,
    pub removed_noise: Vec<String>,
    pub kept_context: Vec<String>,
    pub extraction_method: ExtractionMethod,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisambiguationMethod {
    RuleMatch,
    Fallback,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage4Info {
    pub merchant_id: Option<String>,
    pub merchant_name: Option<String>,
    pub merchant_category: Option<String>,
    pub disambiguation_method: DisambiguationMethod,
    pub fallback: bool,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowType {
    Gasto,
    Ingreso,
    Traspaso,
    PagoTarjeta,
    Retiro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionMethod {
    Resolved,
    Created,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage5Info {
    pub entity_id: Option<EntityId>,
    pub entity_state: Option<String>,
    pub needs_verification: bool,
    pub flow_type: Option<FlowType>,
    pub account_category: Option<String>,
    pub merchant_category: Option<String>,
    pub merchant_category_confidence: Confidence,
    pub budget_category: Option<String>,
    pub tax_category: Option<String>,
    pub payment_method: Option<String>,
    pub resolution_method: ResolutionMethod,
    pub confidence: Confidence,
    /// `"complete"` when every derivable dimension cleared the 0.50 gate,
    /// `"incomplete"` otherwise.
    pub stage5_status: &'static str,
}

/// A structural-check or cancellation annotation attached to a stage without
/// aborting the pipeline. Per §4.9/§7, validation failures and stage errors
/// degrade the record rather than propagate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StageAnnotations {
    pub validation_failed: Vec<String>,
    pub stage_errors: Vec<(u8, String)>,
    pub cancelled_at_stage: Option<u8>,
}

/// The immutable, monotonically growing per-transaction record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRecord {
    pub transaction: RawTransaction,
    pub stage_1: Option<Stage1Info>,
    pub stage_2: Option<Stage2Info>,
    pub stage_3: Option<Stage3Info>,
    pub stage_4: Option<Stage4Info>,
    pub stage_5: Option<Stage5Info>,
    pub annotations: StageAnnotations,
}

impl PipelineRecord {
    pub fn new(transaction: RawTransaction) -> Self {
        Self {
            transaction,
            stage_1: None,
            stage_2: None,
            stage_3: None,
            stage_4: None,
            stage_5: None,
            annotations: StageAnnotations::default(),
        }
    }

    pub fn with_stage_1(mut self, info: Stage1Info) -> Self {
        self.stage_1 = Some(info);
        self
    }

    /// Panics if stage 1 has not run; the orchestrator is responsible for
    /// respecting the early-termination gate before calling this.
    pub fn with_stage_2(mut self, info: Stage2Info) -> Self {
        debug_assert!(self.stage_1.is_some(), "stage 2 requires stage 1 output");
        self.stage_2 = Some(info);
        self
    }

    pub fn with_stage_3(mut self, info: Stage3Info) -> Self {
        debug_assert!(self.stage_2.is_some(), "stage 3 requires stage 2 output");
        self.stage_3 = Some(info);
        self
    }

    pub fn with_stage_4(mut self, info: Stage4Info) -> Self {
        debug_assert!(self.stage_3.is_some(), "stage 4 requires stage 3 output");
        self.stage_4 = Some(info);
        self
    }

    pub fn with_stage_5(mut self, info: Stage5Info) -> Self {
        debug_assert!(self.stage_4.is_some(), "stage 5 requires stage 4 output");
        self.stage_5 = Some(info);
        self
    }

    pub fn annotate_validation_failure(&mut self, message: impl Into<String>) {
        self.annotations.validation_failed.push(message.into());
    }

    pub fn annotate_stage_error(&mut self, stage: u8, message: impl Into<String>) {
        self.annotations.stage_errors.push((stage, message.into()));
    }

    /// Early-termination gate: stages 2-5 run only if stage 1 set
    /// `merchant = true`.
    pub fn should_continue_past_stage_1(&self) -> bool {
        self.stage_1.as_ref().is_some_and(|s| s.merchant)
    }

    pub fn overall_confidence(&self) -> Confidence {
        self.stage_5
            .as_ref()
            .map(|s| s.confidence)
            .or_else(|| self.stage_4.as_ref().map(|s| s.confidence))
            .or_else(|| self.stage_3.as_ref().map(|s| s.confidence))
            .or_else(|| self.stage_2.as_ref().map(|s| s.counterparty_info.confidence))
            .or_else(|| self.stage_1.as_ref().map(|s| s.confidence))
            .unwrap_or(Confidence::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::value_objects::Money;

    fn sample_transaction() -> RawTransaction {
        RawTransaction {
            date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            description: "TEST".to_string(),
            debit: Some(Money::from_decimal(10.0)),
            credit: None,
            balance: Money::from_decimal(100.0),
            source_file: "test.csv".to_string(),
            source_line: 1,
            currency: None,
        }
    }

    #[test]
    fn field_monotonicity_carries_prior_stages() {
        let record = PipelineRecord::new(sample_transaction()).with_stage_1(Stage1Info {
            transaction_type: "card-purchase".to_string(),
            direction: Direction::Expense,
            merchant: true,
            confidence: Confidence::new(0.9),
            matched_rule_id: Some("r1".to_string()),
        });
        assert!(record.stage_1.is_some());
        assert!(record.stage_2.is_none());
        assert_eq!(record.transaction.description, "TEST");
    }

    #[test]
    fn early_termination_gate_respects_merchant_flag() {
        let record = PipelineRecord::new(sample_transaction()).with_stage_1(Stage1Info {
            transaction_type: "spei-transfer-in".to_string(),
            direction: Direction::Income,
            merchant: false,
            confidence: Confidence::new(0.98),
            matched_rule_id: Some("r2".to_string()),
        });
        assert!(!record.should_continue_past_stage_1());
    }
}
