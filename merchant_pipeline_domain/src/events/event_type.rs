// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The closed `EventKind` taxonomy and the persisted `Event` fact, per §3.1
//! and §6. Rules files and API boundaries reference kinds by keyword; the
//! loader and the API layer reject unknown symbols rather than admitting an
//! open-ended string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::value_objects::IdempotencyHash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    TransactionImported,
    TransactionClassified,
    TransactionCorrected,
    TransactionVerified,
    DuplicateDetected,
    DuplicateResolved,
    BalanceReconciled,
    DiscrepancyDetected,
    ClassificationApproved,
    ClassificationRejected,
    ClassificationCorrected,
    EntityCreated,
    EntityUpdated,
    EntityMerged,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TransactionImported => "transaction-imported",
            Self::TransactionClassified => "transaction-classified",
            Self::TransactionCorrected => "transaction-corrected",
            Self::TransactionVerified => "transaction-verified",
            Self::DuplicateDetected => "duplicate-detected",
            Self::DuplicateResolved => "duplicate-resolved",
            Self::BalanceReconciled => "balance-reconciled",
            Self::DiscrepancyDetected => "discrepancy-detected",
            Self::ClassificationApproved => "classification-approved",
            Self::ClassificationRejected => "classification-rejected",
            Self::ClassificationCorrected => "classification-corrected",
            Self::EntityCreated => "entity-created",
            Self::EntityUpdated => "entity-updated",
            Self::EntityMerged => "entity-merged",
        }
    }

    pub fn from_str_strict(s: &str) -> Option<Self> {
        Some(match s {
            "transaction-imported" => Self::TransactionImported,
            "transaction-classified" => Self::TransactionClassified,
            "transaction-corrected" => Self::TransactionCorrected,
            "transaction-verified" => Self::TransactionVerified,
            "duplicate-detected" => Self::DuplicateDetected,
            "duplicate-resolved" => Self::DuplicateResolved,
            "balance-reconciled" => Self::BalanceReconciled,
            "discrepancy-detected" => Self::DiscrepancyDetected,
            "classification-approved" => Self::ClassificationApproved,
            "classification-rejected" => Self::ClassificationRejected,
            "classification-corrected" => Self::ClassificationCorrected,
            "entity-created" => Self::EntityCreated,
            "entity-updated" => Self::EntityUpdated,
            "entity-merged" => Self::EntityMerged,
            _ => return None,
        })
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Actor, source, and schema-version metadata carried alongside an event's
/// payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    pub actor: String,
    pub source: String,
    pub schema_version: u32,
}

impl EventMetadata {
    pub fn new(actor: impl Into<String>, source: impl Into<String>) -> Self {
        Self { actor: actor.into(), source: source.into(), schema_version: 1 }
    }
}

/// An immutable fact appended to the event log. Events are never retracted;
/// corrections are new facts with a later `tx_time`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub event_id: Uuid,
    pub event_type: EventKind,
    /// The scoping key this event pertains to (a transaction id, an
    /// account id, an entity id, depending on `event_type`). Also the
    /// `entity_type` fed into the idempotency hash per §6, so duplicate
    /// detection is scoped per concrete stream rather than per event kind.
    pub entity_id: String,
    pub business_time: DateTime<Utc>,
    pub tx_time: DateTime<Utc>,
    pub data: Value,
    pub metadata: EventMetadata,
    pub idempotency_hash: IdempotencyHash,
}

impl Event {
    pub fn new(
        event_type: EventKind,
        entity_id: &str,
        business_time: DateTime<Utc>,
        tx_time: DateTime<Utc>,
        data: Value,
        metadata: EventMetadata,
    ) -> Self {
        let idempotency_hash = IdempotencyHash::compute(entity_id, &data);
        Self {
            event_id: Uuid::new_v4(),
            event_type,
            entity_id: entity_id.to_string(),
            business_time,
            tx_time,
            data,
            metadata,
            idempotency_hash,
        }
    }
}
