// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The Process API (§4.10): typed append-only commands mapping one-to-one
//! to event kinds. Nothing here reads derived state — corrections append a
//! new event rather than overwrite a prior one; Perception folds them.

use chrono::{DateTime, Utc};
use merchant_pipeline_domain::error::{CoreError, CoreResult};
use merchant_pipeline_domain::events::payloads::{
    BalanceReconciledPayload, ClassificationApprovedPayload, ClassificationCorrectedPayload,
    ClassificationRejectedPayload, DiscrepancyDetectedPayload, DuplicateDetectedPayload, DuplicateResolvedPayload,
    TransactionClassifiedPayload, TransactionCorrectedPayload, TransactionImportedPayload, TransactionVerifiedPayload,
};
use merchant_pipeline_domain::events::{EventKind, EventMetadata, EventPayload};
use merchant_pipeline_domain::repositories::event_store::AppendResult;
use merchant_pipeline_domain::repositories::EventStore;
use serde_json::Value;

pub struct ProcessApi<S: EventStore> {
    store: S,
}

impl<S: EventStore> ProcessApi<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn to_value(payload: &impl EventPayload) -> CoreResult<Value> {
        payload.validate().map_err(|message| CoreError::ValidationError { field: "payload".to_string(), message })?;
        Ok(serde_json::to_value(payload).unwrap_or(Value::Null))
    }

    pub async fn append_transaction_imported(
        &self,
        payload: TransactionImportedPayload,
        business_time: DateTime<Utc>,
        metadata: EventMetadata,
    ) -> CoreResult<AppendResult> {
        let entity_id = payload.transaction_id.clone();
        let data = Self::to_value(&payload)?;
        self.store
            .append(EventKind::TransactionImported, &entity_id, business_time, data, metadata)
            .await
    }

    pub async fn append_transaction_classified(
        &self,
        payload: TransactionClassifiedPayload,
        business_time: DateTime<Utc>,
        metadata: EventMetadata,
    ) -> CoreResult<AppendResult> {
        let entity_id = payload.transaction_id.clone();
        let data = Self::to_value(&payload)?;
        self.store
            .append(EventKind::TransactionClassified, &entity_id, business_time, data, metadata)
            .await
    }

    pub async fn append_transaction_corrected(
        &self,
        payload: TransactionCorrectedPayload,
        business_time: DateTime<Utc>,
        metadata: EventMetadata,
    ) -> CoreResult<AppendResult> {
        let entity_id = payload.transaction_id.clone();
        let data = Self::to_value(&payload)?;
        self.store
            .append(EventKind::TransactionCorrected, &entity_id, business_time, data, metadata)
            .await
    }

    pub async fn append_transaction_verified(
        &self,
        payload: TransactionVerifiedPayload,
        business_time: DateTime<Utc>,
        metadata: EventMetadata,
    ) -> CoreResult<AppendResult> {
        let entity_id = payload.transaction_id.clone();
        let data = Self::to_value(&payload)?;
        self.store
            .append(EventKind::TransactionVerified, &entity_id, business_time, data, metadata)
            .await
    }

    pub async fn append_duplicate_detected(
        &self,
        payload: DuplicateDetectedPayload,
        business_time: DateTime<Utc>,
        metadata: EventMetadata,
    ) -> CoreResult<AppendResult> {
        let entity_id = payload.entity_id_a.clone();
        let data = Self::to_value(&payload)?;
        self.store
            .append(EventKind::DuplicateDetected, &entity_id, business_time, data, metadata)
            .await
    }

    pub async fn append_duplicate_resolved(
        &self,
        payload: DuplicateResolvedPayload,
        business_time: DateTime<Utc>,
        metadata: EventMetadata,
    ) -> CoreResult<AppendResult> {
        let entity_id = payload.target_id.clone();
        let data = Self::to_value(&payload)?;
        self.store
            .append(EventKind::DuplicateResolved, &entity_id, business_time, data, metadata)
            .await
    }

    pub async fn append_balance_reconciled(
        &self,
        payload: BalanceReconciledPayload,
        business_time: DateTime<Utc>,
        metadata: EventMetadata,
    ) -> CoreResult<AppendResult> {
        let entity_id = payload.account_id.clone();
        let data = Self::to_value(&payload)?;
        self.store
            .append(EventKind::BalanceReconciled, &entity_id, business_time, data, metadata)
            .await
    }

    pub async fn append_discrepancy_detected(
        &self,
        payload: DiscrepancyDetectedPayload,
        business_time: DateTime<Utc>,
        metadata: EventMetadata,
    ) -> CoreResult<AppendResult> {
        let entity_id = payload.account_id.clone();
        let data = Self::to_value(&payload)?;
        self.store
            .append(EventKind::DiscrepancyDetected, &entity_id, business_time, data, metadata)
            .await
    }

    pub async fn approve_classification(
        &self,
        payload: ClassificationApprovedPayload,
        business_time: DateTime<Utc>,
        metadata: EventMetadata,
    ) -> CoreResult<AppendResult> {
        let entity_id = payload.transaction_id.clone();
        let data = Self::to_value(&payload)?;
        self.store
            .append(EventKind::ClassificationApproved, &entity_id, business_time, data, metadata)
            .await
    }

    pub async fn reject_classification(
        &self,
        payload: ClassificationRejectedPayload,
        business_time: DateTime<Utc>,
        metadata: EventMetadata,
    ) -> CoreResult<AppendResult> {
        let entity_id = payload.transaction_id.clone();
        let data = Self::to_value(&payload)?;
        self.store
            .append(EventKind::ClassificationRejected, &entity_id, business_time, data, metadata)
            .await
    }

    pub async fn correct_classification(
        &self,
        payload: ClassificationCorrectedPayload,
        business_time: DateTime<Utc>,
        metadata: EventMetadata,
    ) -> CoreResult<AppendResult> {
        let entity_id = payload.transaction_id.clone();
        let data = Self::to_value(&payload)?;
        self.store
            .append(EventKind::ClassificationCorrected, &entity_id, business_time, data, metadata)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use merchant_pipeline_domain::events::event_type::Event;
    use merchant_pipeline_domain::repositories::event_store::EventFilter;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        events: Mutex<Vec<Event>>,
    }

    #[async_trait]
    impl EventStore for RecordingStore {
        async fn append(
            &self,
            event_type: EventKind,
            entity_id: &str,
            business_time: DateTime<Utc>,
            data: Value,
            metadata: EventMetadata,
        ) -> CoreResult<AppendResult> {
            let event = Event::new(event_type, entity_id, business_time, Utc::now(), data, metadata);
            let hash = event.idempotency_hash.clone();
            self.events.lock().unwrap().push(event);
            Ok(AppendResult { event_id: uuid::Uuid::new_v4(), duplicate: false, hash })
        }

        async fn query(&self, filter: EventFilter, as_of: Option<DateTime<Utc>>) -> CoreResult<Vec<Event>> {
            Ok(self
                .events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| filter.matches(e))
                .filter(|e| as_of.is_none_or(|cutoff| e.business_time <= cutoff))
                .cloned()
                .collect())
        }
    }

    #[tokio::test]
    async fn approve_classification_appends_one_event_with_expected_shape() {
        let api = ProcessApi::new(RecordingStore::default());
        let metadata = EventMetadata::new("reviewer-1", "test");
        let payload = ClassificationApprovedPayload {
            transaction_id: "tx-1".to_string(),
            merchant: "uber-eats".to_string(),
            category: "food".to_string(),
            approved_by: "reviewer-1".to_string(),
        };
        api.approve_classification(payload, Utc::now(), metadata).await.unwrap();
        let events = api.store.query(EventFilter::default(), None).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventKind::ClassificationApproved);
        assert_eq!(events[0].data["approved_by"], "reviewer-1");
        assert_eq!(events[0].entity_id, "tx-1");
    }

    #[tokio::test]
    async fn correction_appends_a_new_event_rather_than_mutating_the_original() {
        let api = ProcessApi::new(RecordingStore::default());
        let metadata = EventMetadata::new("reviewer-1", "test");
        api.append_transaction_imported(
            TransactionImportedPayload {
                transaction_id: "tx-1".to_string(),
                raw: serde_json::json!({"description": "STARBUCKS"}),
                stage_1_type: "card-purchase".to_string(),
            },
            Utc::now(),
            metadata.clone(),
        )
        .await
        .unwrap();
        api.append_transaction_corrected(
            TransactionCorrectedPayload {
                transaction_id: "tx-1".to_string(),
                correction: serde_json::json!({"merchant": "starbucks"}),
                reason: "wrong brand".to_string(),
            },
            Utc::now(),
            metadata,
        )
        .await
        .unwrap();
        let events = api.store.query(EventFilter { entity_id: Some("tx-1".to_string()), ..Default::default() }, None).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EventKind::TransactionImported);
        assert_eq!(events[1].event_type, EventKind::TransactionCorrected);
    }
}
