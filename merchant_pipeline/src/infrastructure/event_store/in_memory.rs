// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! An in-process `EventStore` backed by a `Vec` under a `tokio::sync::RwLock`.
//! Appends are serialized by the write lock; reads take a shared lock and
//! clone matching events, so callers hold no lock across `.await`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use merchant_pipeline_domain::error::CoreResult;
use merchant_pipeline_domain::events::{Event, EventKind, EventMetadata};
use merchant_pipeline_domain::repositories::event_store::{AppendResult, EventFilter};
use merchant_pipeline_domain::repositories::EventStore;
use merchant_pipeline_domain::value_objects::IdempotencyHash;
use serde_json::Value;
use std::collections::HashSet;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryEventStore {
    events: RwLock<Vec<Event>>,
    hashes: RwLock<HashSet<IdempotencyHash>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(
        &self,
        event_type: EventKind,
        entity_id: &str,
        business_time: DateTime<Utc>,
        data: Value,
        metadata: EventMetadata,
    ) -> CoreResult<AppendResult> {
        let hash = IdempotencyHash::compute(entity_id, &data);
        {
            let hashes = self.hashes.read().await;
            if hashes.contains(&hash) {
                return Ok(AppendResult { event_id: uuid::Uuid::new_v4(), duplicate: true, hash });
            }
        }
        let event = Event::new(event_type, entity_id, business_time, Utc::now(), data, metadata);
        let event_id = event.event_id;
        let mut events = self.events.write().await;
        let mut hashes = self.hashes.write().await;
        if !hashes.insert(hash) {
            return Ok(AppendResult { event_id: uuid::Uuid::new_v4(), duplicate: true, hash });
        }
        events.push(event);
        Ok(AppendResult { event_id, duplicate: false, hash })
    }

    async fn query(&self, filter: EventFilter, as_of: Option<DateTime<Utc>>) -> CoreResult<Vec<Event>> {
        let events = self.events.read().await;
        let mut matched: Vec<Event> = events
            .iter()
            .filter(|e| filter.matches(e))
            .filter(|e| as_of.is_none_or(|cutoff| e.tx_time <= cutoff))
            .cloned()
            .collect();
        matched.sort_by_key(|e| e.tx_time);
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_payload_is_reported_not_appended() {
        let store = InMemoryEventStore::new();
        let metadata = EventMetadata::new("tester", "test");
        let data = serde_json::json!({"transaction_id": "tx-1", "raw": {}});
        let first = store
            .append(EventKind::TransactionImported, "tx-1", Utc::now(), data.clone(), metadata.clone())
            .await
            .unwrap();
        assert!(!first.duplicate);
        let second = store.append(EventKind::TransactionImported, "tx-1", Utc::now(), data, metadata).await.unwrap();
        assert!(second.duplicate);
        assert_eq!(store.all_events().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn as_of_excludes_later_events() {
        let store = InMemoryEventStore::new();
        let metadata = EventMetadata::new("tester", "test");
        let t0 = Utc::now();
        store
            .append(EventKind::TransactionImported, "tx-1", t0, serde_json::json!({"a": 1}), metadata.clone())
            .await
            .unwrap();
        let cutoff = Utc::now();
        store
            .append(EventKind::TransactionVerified, "tx-1", Utc::now(), serde_json::json!({"a": 2}), metadata)
            .await
            .unwrap();
        let snapshot = store.query(EventFilter::default(), Some(cutoff)).await.unwrap();
        assert_eq!(snapshot.len(), 1);
    }
}
