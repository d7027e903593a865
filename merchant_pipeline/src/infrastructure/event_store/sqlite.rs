// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A durable `EventStore` backed by SQLite via `sqlx`. The `idempotency_hash`
//! column carries a `UNIQUE` constraint, so a duplicate append is detected by
//! the database itself rather than by an extra round trip.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use merchant_pipeline_domain::error::{CoreError, CoreResult};
use merchant_pipeline_domain::events::{Event, EventKind, EventMetadata};
use merchant_pipeline_domain::repositories::event_store::{AppendResult, EventFilter};
use merchant_pipeline_domain::repositories::EventStore;
use merchant_pipeline_domain::value_objects::IdempotencyHash;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

pub struct SqliteEventStore {
    pool: SqlitePool,
}

impl SqliteEventStore {
    pub async fn connect(uri: &str) -> CoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(uri)
            .await
            .map_err(|e| CoreError::StoreAppendError { message: e.to_string() })?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> CoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS events (
                event_id TEXT PRIMARY KEY,
                event_type TEXT NOT NULL,
                entity_id TEXT NOT NULL,
                business_time TEXT NOT NULL,
                tx_time TEXT NOT NULL,
                data TEXT NOT NULL,
                metadata TEXT NOT NULL,
                idempotency_hash TEXT NOT NULL UNIQUE
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| CoreError::StoreAppendError { message: e.to_string() })?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_events_entity_id ON events(entity_id)")
            .execute(&self.pool)
            .await
            .map_err(|e| CoreError::StoreAppendError { message: e.to_string() })?;
        Ok(())
    }

    fn row_to_event(row: &sqlx::sqlite::SqliteRow) -> CoreResult<Event> {
        let event_type: String = row.try_get("event_type").map_err(store_read_err)?;
        let event_type = EventKind::from_str_strict(&event_type)
            .ok_or_else(|| CoreError::StoreReadError { message: format!("unknown event_type: {event_type}") })?;
        let data: String = row.try_get("data").map_err(store_read_err)?;
        let metadata: String = row.try_get("metadata").map_err(store_read_err)?;
        let hash: String = row.try_get("idempotency_hash").map_err(store_read_err)?;
        Ok(Event {
            event_id: row.try_get("event_id").map_err(store_read_err)?,
            event_type,
            entity_id: row.try_get("entity_id").map_err(store_read_err)?,
            business_time: row.try_get("business_time").map_err(store_read_err)?,
            tx_time: row.try_get("tx_time").map_err(store_read_err)?,
            data: serde_json::from_str(&data).map_err(|e| CoreError::StoreReadError { message: e.to_string() })?,
            metadata: serde_json::from_str(&metadata)
                .map_err(|e| CoreError::StoreReadError { message: e.to_string() })?,
            idempotency_hash: IdempotencyHash::from_hex(&hash)
                .ok_or_else(|| CoreError::StoreReadError { message: "malformed idempotency_hash".to_string() })?,
        })
    }
}

fn store_read_err(e: sqlx::Error) -> CoreError {
    CoreError::StoreReadError { message: e.to_string() }
}

#[async_trait]
impl EventStore for SqliteEventStore {
    async fn append(
        &self,
        event_type: EventKind,
        entity_id: &str,
        business_time: DateTime<Utc>,
        data: Value,
        metadata: EventMetadata,
    ) -> CoreResult<AppendResult> {
        let event = Event::new(event_type, entity_id, business_time, Utc::now(), data, metadata);
        let data_json = serde_json::to_string(&event.data).map_err(CoreError::from)?;
        let metadata_json = serde_json::to_string(&event.metadata).map_err(CoreError::from)?;
        let result = sqlx::query(
            r#"
            INSERT INTO events (event_id, event_type, entity_id, business_time, tx_time, data, metadata, idempotency_hash)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.event_id)
        .bind(event.event_type.as_str())
        .bind(&event.entity_id)
        .bind(event.business_time)
        .bind(event.tx_time)
        .bind(&data_json)
        .bind(&metadata_json)
        .bind(event.idempotency_hash.to_hex())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(AppendResult { event_id: event.event_id, duplicate: false, hash: event.idempotency_hash }),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Ok(AppendResult { event_id: event.event_id, duplicate: true, hash: event.idempotency_hash })
            }
            Err(e) => Err(CoreError::StoreAppendError { message: e.to_string() }),
        }
    }

    async fn query(&self, filter: EventFilter, as_of: Option<DateTime<Utc>>) -> CoreResult<Vec<Event>> {
        let rows = sqlx::query("SELECT * FROM events ORDER BY tx_time ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(store_read_err)?;
        rows.iter()
            .map(Self::row_to_event)
            .filter(|r| match r {
                Ok(event) => filter.matches(event) && as_of.is_none_or(|cutoff| event.tx_time <= cutoff),
                Err(_) => true,
            })
            .collect()
    }
}
