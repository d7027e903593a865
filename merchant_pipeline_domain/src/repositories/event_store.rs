// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The `EventStore` port: an append-only fact log with idempotent writes and
//! time-travel reads. An in-memory implementation and a durable SQLite-backed
//! implementation both satisfy this trait (persistence back-end choice is
//! explicitly out of scope for the domain layer).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::CoreResult;
use crate::events::{Event, EventKind, EventMetadata};
use crate::value_objects::IdempotencyHash;

/// The result of an `append` call. `duplicate: true` is informational, not
/// an error — per §7, `DuplicateDetected` is returned from `append`, never
/// raised as a `CoreError`.
#[derive(Debug, Clone)]
pub struct AppendResult {
    pub event_id: uuid::Uuid,
    pub duplicate: bool,
    pub hash: IdempotencyHash,
}

/// Filters accepted by [`EventStore::query`]. All fields are conjunctive;
/// `None` means "no filter on this dimension".
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub event_type: Option<EventKind>,
    pub entity_id: Option<String>,
    pub time_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(kind) = self.event_type {
            if event.event_type != kind {
                return false;
            }
        }
        if let Some(wanted) = &self.entity_id {
            if &event.entity_id != wanted {
                return false;
            }
        }
        if let Some((start, end)) = self.time_range {
            if event.tx_time < start || event.tx_time > end {
                return false;
            }
        }
        true
    }
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Computes `idempotency_hash` from `(entity_id, data)`; if the hash is
    /// already present, returns `{duplicate: true}` without appending.
    /// Storage failures surface as `CoreError::StoreAppendError`; a partial
    /// write must never produce a visible event.
    async fn append(
        &self,
        event_type: EventKind,
        entity_id: &str,
        business_time: DateTime<Utc>,
        data: Value,
        metadata: EventMetadata,
    ) -> CoreResult<AppendResult>;

    /// Returns events matching `filter` in ascending `tx_time` order. When
    /// `as_of` is supplied, only events with `tx_time <= as_of` are
    /// returned — the basis of `project_state_at`.
    async fn query(&self, filter: EventFilter, as_of: Option<DateTime<Utc>>) -> CoreResult<Vec<Event>>;

    /// Every event in the log, in ascending `tx_time` order. Used by
    /// Perception's full-history projections.
    async fn all_events(&self) -> CoreResult<Vec<Event>> {
        self.query(EventFilter::default(), None).await
    }
}

/// Lets a shared store (`Arc<ConcreteStore>`) be passed anywhere an
/// `EventStore` is expected, so a process can hand the same store to both
/// the Process API and Perception's read side.
#[async_trait]
impl<T: EventStore + ?Sized> EventStore for Arc<T> {
    async fn append(
        &self,
        event_type: EventKind,
        entity_id: &str,
        business_time: DateTime<Utc>,
        data: Value,
        metadata: EventMetadata,
    ) -> CoreResult<AppendResult> {
        (**self).append(event_type, entity_id, business_time, data, metadata).await
    }

    async fn query(&self, filter: EventFilter, as_of: Option<DateTime<Utc>>) -> CoreResult<Vec<Event>> {
        (**self).query(filter, as_of).await
    }
}
