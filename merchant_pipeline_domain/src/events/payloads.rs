// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Typed payloads for each member of the `EventKind` taxonomy. The Process
//! API constructs one of these, validates it via [`EventPayload::validate`],
//! and hands it to the Event Store, which serializes the payload into the
//! untyped `data` field of the persisted `Event`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain_event::{EventCategory, EventPayload};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionImportedPayload {
    pub transaction_id: String,
    pub raw: Value,
    pub stage_1_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionClassifiedPayload {
    pub transaction_id: String,
    pub record: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionCorrectedPayload {
    pub transaction_id: String,
    pub correction: Value,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionVerifiedPayload {
    pub transaction_id: String,
    pub verified_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateDetectedPayload {
    pub entity_id_a: String,
    pub entity_id_b: String,
    pub edit_distance: Option<u32>,
    pub jaccard: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateResolvedPayload {
    pub source_id: String,
    pub target_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceReconciledPayload {
    pub account_id: String,
    pub expected_balance_minor_units: i64,
    pub actual_balance_minor_units: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscrepancyDetectedPayload {
    pub account_id: String,
    pub difference_minor_units: i64,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationApprovedPayload {
    pub transaction_id: String,
    pub merchant: String,
    pub category: String,
    pub approved_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRejectedPayload {
    pub transaction_id: String,
    pub rejected_by: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationCorrectedPayload {
    pub transaction_id: String,
    pub correction: Value,
    pub corrected_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityCreatedPayload {
    pub entity_id: String,
    pub entity_type: String,
    pub canonical_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityUpdatedPayload {
    pub entity_id: String,
    pub version: u64,
    pub patch: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMergedPayload {
    pub source_id: String,
    pub target_id: String,
    pub reason: String,
}

macro_rules! impl_event_payload {
    ($ty:ty, $name:literal, $category:expr) => {
        impl EventPayload for $ty {
            fn event_name(&self) -> &'static str {
                $name
            }

            fn event_category(&self) -> EventCategory {
                $category
            }
        }
    };
}

impl_event_payload!(TransactionClassifiedPayload, "transaction-classified", EventCategory::Transaction);
impl_event_payload!(TransactionCorrectedPayload, "transaction-corrected", EventCategory::Transaction);
impl_event_payload!(TransactionVerifiedPayload, "transaction-verified", EventCategory::Transaction);
impl_event_payload!(DuplicateResolvedPayload, "duplicate-resolved", EventCategory::Entity);
impl_event_payload!(BalanceReconciledPayload, "balance-reconciled", EventCategory::Reconciliation);
impl_event_payload!(DiscrepancyDetectedPayload, "discrepancy-detected", EventCategory::Reconciliation);
impl_event_payload!(ClassificationRejectedPayload, "classification-rejected", EventCategory::Review);
impl_event_payload!(ClassificationCorrectedPayload, "classification-corrected", EventCategory::Review);
impl_event_payload!(EntityUpdatedPayload, "entity-updated", EventCategory::Entity);

impl EventPayload for TransactionImportedPayload {
    fn event_name(&self) -> &'static str {
        "transaction-imported"
    }

    fn event_category(&self) -> EventCategory {
        EventCategory::Transaction
    }

    fn validate(&self) -> Result<(), String> {
        if self.transaction_id.trim().is_empty() {
            return Err("transaction_id must not be empty".to_string());
        }
        Ok(())
    }
}

impl EventPayload for DuplicateDetectedPayload {
    fn event_name(&self) -> &'static str {
        "duplicate-detected"
    }

    fn event_category(&self) -> EventCategory {
        EventCategory::Entity
    }

    fn validate(&self) -> Result<(), String> {
        if self.entity_id_a == self.entity_id_b {
            return Err("entity_id_a and entity_id_b must differ".to_string());
        }
        Ok(())
    }
}

impl EventPayload for ClassificationApprovedPayload {
    fn event_name(&self) -> &'static str {
        "classification-approved"
    }

    fn event_category(&self) -> EventCategory {
        EventCategory::Review
    }

    fn validate(&self) -> Result<(), String> {
        if self.approved_by.trim().is_empty() {
            return Err("approved_by must not be empty".to_string());
        }
        Ok(())
    }
}

impl EventPayload for EntityCreatedPayload {
    fn event_name(&self) -> &'static str {
        "entity-created"
    }

    fn event_category(&self) -> EventCategory {
        EventCategory::Entity
    }

    fn validate(&self) -> Result<(), String> {
        if self.canonical_name.trim().is_empty() {
            return Err("canonical_name must not be empty".to_string());
        }
        Ok(())
    }
}

impl EventPayload for EntityMergedPayload {
    fn event_name(&self) -> &'static str {
        "entity-merged"
    }

    fn event_category(&self) -> EventCategory {
        EventCategory::Entity
    }

    fn validate(&self) -> Result<(), String> {
        if self.source_id == self.target_id {
            return Err("source_id and target_id must differ".to_string());
        }
        Ok(())
    }
}
