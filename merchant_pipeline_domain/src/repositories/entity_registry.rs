// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The `EntityRegistry` port: identity-stable entities with variations,
//! lifecycle, and provenance (§4.2).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::entities::Entity;
use crate::error::CoreResult;
use crate::value_objects::EntityId;

/// A candidate returned by [`EntityRegistry::find_by_variation`], carrying
/// the match confidence alongside the entity.
#[derive(Debug, Clone)]
pub struct VariationMatch {
    pub entity: Entity,
    pub confidence: f64,
}

#[async_trait]
pub trait EntityRegistry: Send + Sync {
    /// Creates a new entity; fails if `entity_id` collides with a
    /// non-merged entity.
    async fn register(&self, entity: Entity) -> CoreResult<EntityId>;

    async fn lookup(&self, entity_id: &EntityId) -> CoreResult<Option<Entity>>;

    /// Case-insensitive, whitespace-normalized exact match first; then fuzzy
    /// match (Levenshtein or token-set) above the configured threshold.
    async fn find_by_variation(&self, text: &str) -> CoreResult<Option<VariationMatch>>;

    /// Idempotent on normalized text.
    async fn add_variation(&self, entity_id: &EntityId, text: &str, source: &str, confidence: f64) -> CoreResult<()>;

    /// Produces a new version, increments `version`, emits `entity-updated`.
    async fn update(&self, entity_id: &EntityId, patch: Value) -> CoreResult<Entity>;

    /// `source.state = merged`; unions variations into `target`; transaction
    /// retargeting happens at query time, not retroactively in storage.
    async fn merge(&self, source_id: &EntityId, target_id: &EntityId, reason: &str) -> CoreResult<()>;

    /// All versions in `tx_time` order.
    async fn history(&self, entity_id: &EntityId) -> CoreResult<Vec<Entity>>;

    /// The version active at `t`.
    async fn as_of(&self, entity_id: &EntityId, t: DateTime<Utc>) -> CoreResult<Option<Entity>>;
}
