// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! An in-memory `EntityRegistry` (§4.2): identity-stable entities with
//! variation matching, lifecycle, and per-entity version history. The
//! version map is a read-optimized cache; every mutation also appends an
//! `entity-created`/`entity-updated`/`entity-merged` fact to the shared
//! event store, per Design Notes §9's "event log is the source of truth"
//! principle — the map can always be rebuilt from the log.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use merchant_pipeline_domain::entities::{Entity, EntityState, Variation};
use merchant_pipeline_domain::error::{CoreError, CoreResult};
use merchant_pipeline_domain::events::payloads::{EntityCreatedPayload, EntityMergedPayload, EntityUpdatedPayload};
use merchant_pipeline_domain::events::{EventKind, EventMetadata};
use merchant_pipeline_domain::repositories::entity_registry::VariationMatch;
use merchant_pipeline_domain::repositories::{EntityRegistry, EventStore};
use merchant_pipeline_domain::value_objects::{normalize, Confidence, EntityId};
use serde_json::Value;
use tokio::sync::RwLock;

const AUTO_PROMOTE_MIN_TRANSACTIONS: u64 = 10;
const AUTO_PROMOTE_MIN_MEAN_CONFIDENCE: f64 = 0.85;
const MAX_MERGE_CHAIN_DEPTH: u32 = 10;

pub struct InMemoryEntityRegistry {
    // Every version of every entity, keyed by entity_id, oldest first.
    versions: RwLock<HashMap<EntityId, Vec<Entity>>>,
    store: Arc<dyn EventStore>,
}

impl InMemoryEntityRegistry {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { versions: RwLock::new(HashMap::new()), store }
    }

    fn current(versions: &HashMap<EntityId, Vec<Entity>>, entity_id: &EntityId) -> Option<Entity> {
        versions.get(entity_id).and_then(|v| v.last().cloned())
    }

    fn registry_metadata() -> EventMetadata {
        EventMetadata::new("entity-registry", "entity-registry")
    }

    async fn emit(&self, event_type: EventKind, entity_id: &str, data: Value) -> CoreResult<()> {
        self.store.append(event_type, entity_id, Utc::now(), data, Self::registry_metadata()).await?;
        Ok(())
    }
}

#[async_trait]
impl EntityRegistry for InMemoryEntityRegistry {
    async fn register(&self, entity: Entity) -> CoreResult<EntityId> {
        let mut versions = self.versions.write().await;
        if let Some(existing) = Self::current(&versions, &entity.entity_id) {
            if !existing.state.is_merged() {
                return Err(CoreError::ValidationError {
                    field: "entity_id".to_string(),
                    message: format!("entity_id {} already registered", entity.entity_id),
                });
            }
        }
        let entity_id = entity.entity_id.clone();
        let payload = EntityCreatedPayload {
            entity_id: entity_id.to_string(),
            entity_type: format!("{:?}", entity.entity_type),
            canonical_name: entity.canonical_name.clone(),
        };
        versions.entry(entity_id.clone()).or_default().push(entity);
        drop(versions);
        self.emit(EventKind::EntityCreated, &entity_id.to_string(), serde_json::to_value(&payload).unwrap_or(Value::Null)).await?;
        Ok(entity_id)
    }

    async fn lookup(&self, entity_id: &EntityId) -> CoreResult<Option<Entity>> {
        let versions = self.versions.read().await;
        Ok(Self::current(&versions, entity_id))
    }

    async fn find_by_variation(&self, text: &str) -> CoreResult<Option<VariationMatch>> {
        let normalized = normalize(text);
        let versions = self.versions.read().await;
        let mut best: Option<VariationMatch> = None;

        for entity_versions in versions.values() {
            let Some(entity) = entity_versions.last() else { continue };
            if entity.state.is_merged() {
                continue;
            }
            for variation in &entity.variations {
                if variation.text == normalized {
                    return Ok(Some(VariationMatch { entity: entity.clone(), confidence: 1.0 }));
                }
                let distance = levenshtein(&variation.text, &normalized);
                let threshold = normalized.chars().count() / 4;
                let jaccard = token_jaccard(&variation.text, &normalized);
                if distance <= threshold || jaccard >= 0.75 {
                    let max_len = variation.text.chars().count().max(normalized.chars().count()).max(1);
                    let confidence = (1.0 - distance as f64 / max_len as f64).max(0.6);
                    let better = match &best {
                        Some(current) => confidence > current.confidence,
                        None => true,
                    };
                    if better {
                        best = Some(VariationMatch { entity: entity.clone(), confidence });
                    }
                }
            }
        }
        Ok(best)
    }

    async fn add_variation(&self, entity_id: &EntityId, text: &str, source: &str, confidence: f64) -> CoreResult<()> {
        let mut versions = self.versions.write().await;
        let Some(mut entity) = Self::current(&versions, entity_id) else {
            return Err(CoreError::EntityNotFound { entity_id: entity_id.to_string() });
        };
        entity.add_variation(Variation::new(text, source, Confidence::new(confidence)));
        entity.version += 1;
        entity.provenance.updated_at = Utc::now();
        let version = entity.version;
        versions.entry(entity_id.clone()).or_default().push(entity);
        drop(versions);

        let payload = EntityUpdatedPayload {
            entity_id: entity_id.to_string(),
            version,
            patch: serde_json::json!({"variation_added": {"text": text, "source": source, "confidence": confidence}}),
        };
        self.emit(EventKind::EntityUpdated, &entity_id.to_string(), serde_json::to_value(&payload).unwrap_or(Value::Null)).await
    }

    async fn update(&self, entity_id: &EntityId, patch: Value) -> CoreResult<Entity> {
        let mut versions = self.versions.write().await;
        let Some(mut entity) = Self::current(&versions, entity_id) else {
            return Err(CoreError::EntityNotFound { entity_id: entity_id.to_string() });
        };
        apply_patch(&mut entity, &patch);
        detect_cycle(&versions, &entity)?;
        entity.version += 1;
        entity.provenance.updated_at = Utc::now();

        if matches!(entity.state, EntityState::Provisional)
            && entity.should_auto_promote(AUTO_PROMOTE_MIN_TRANSACTIONS, AUTO_PROMOTE_MIN_MEAN_CONFIDENCE)
        {
            entity.state = EntityState::Canonical;
        }

        let version = entity.version;
        versions.entry(entity_id.clone()).or_default().push(entity.clone());
        drop(versions);

        let payload = EntityUpdatedPayload {
            entity_id: entity_id.to_string(),
            version,
            patch,
        };
        self.emit(EventKind::EntityUpdated, &entity_id.to_string(), serde_json::to_value(&payload).unwrap_or(Value::Null)).await?;
        Ok(entity)
    }

    async fn merge(&self, source_id: &EntityId, target_id: &EntityId, reason: &str) -> CoreResult<()> {
        let mut versions = self.versions.write().await;
        let Some(mut source) = Self::current(&versions, source_id) else {
            return Err(CoreError::EntityNotFound { entity_id: source_id.to_string() });
        };

        // Resolve an already-merged target transitively, per §4.2.
        let mut resolved_target = target_id.clone();
        let mut depth = 0u32;
        loop {
            let Some(candidate) = Self::current(&versions, &resolved_target) else {
                return Err(CoreError::EntityNotFound { entity_id: resolved_target.to_string() });
            };
            match candidate.state {
                EntityState::Merged { merged_into, .. } => {
                    resolved_target = merged_into;
                    depth += 1;
                    if depth > MAX_MERGE_CHAIN_DEPTH {
                        return Err(CoreError::MergeChainTooDeep {
                            entity_id: source_id.to_string(),
                            max_depth: MAX_MERGE_CHAIN_DEPTH,
                        });
                    }
                }
                _ => break,
            }
        }

        let Some(mut target) = Self::current(&versions, &resolved_target) else {
            return Err(CoreError::EntityNotFound { entity_id: resolved_target.to_string() });
        };

        for variation in source.variations.drain(..) {
            if !target.has_variation(&variation.text) {
                target.variations.push(variation);
            }
        }
        target.version += 1;
        target.provenance.updated_at = Utc::now();

        source.state = EntityState::Merged {
            merged_into: resolved_target.clone(),
            merge_reason: reason.to_string(),
            merged_at: Utc::now(),
        };
        source.version += 1;

        versions.entry(resolved_target.clone()).or_default().push(target);
        versions.entry(source_id.clone()).or_default().push(source);
        drop(versions);

        let payload = EntityMergedPayload {
            source_id: source_id.to_string(),
            target_id: resolved_target.to_string(),
            reason: reason.to_string(),
        };
        self.emit(EventKind::EntityMerged, &source_id.to_string(), serde_json::to_value(&payload).unwrap_or(Value::Null)).await
    }

    async fn history(&self, entity_id: &EntityId) -> CoreResult<Vec<Entity>> {
        let versions = self.versions.read().await;
        Ok(versions.get(entity_id).cloned().unwrap_or_default())
    }

    async fn as_of(&self, entity_id: &EntityId, t: DateTime<Utc>) -> CoreResult<Option<Entity>> {
        let versions = self.versions.read().await;
        Ok(versions
            .get(entity_id)
            .and_then(|vs| vs.iter().filter(|e| e.provenance.updated_at <= t).next_back())
            .cloned())
    }
}

fn apply_patch(entity: &mut Entity, patch: &Value) {
    if let Some(count) = patch.get("transaction_count").and_then(Value::as_u64) {
        entity.transaction_count = count;
    }
    if let Some(last_seen) = patch.get("last_seen").and_then(Value::as_str) {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(last_seen) {
            entity.last_seen = parsed.with_timezone(&Utc);
        }
    }
    if let Some(category) = patch.get("declared_category").and_then(Value::as_str) {
        entity.declared_category = Some(category.to_string());
    }
}

fn detect_cycle(versions: &HashMap<EntityId, Vec<Entity>>, entity: &Entity) -> CoreResult<()> {
    let Some(parent) = &entity.parent_org else { return Ok(()) };
    let mut seen = std::collections::HashSet::new();
    seen.insert(entity.entity_id.clone());
    let mut current = parent.clone();
    loop {
        if !seen.insert(current.clone()) {
            return Err(CoreError::EntityCycleDetected { entity_id: entity.entity_id.to_string() });
        }
        match versions.get(&current).and_then(|v| v.last()) {
            Some(ancestor) => match &ancestor.parent_org {
                Some(next) => current = next.clone(),
                None => break,
            },
            None => break,
        }
    }
    Ok(())
}

/// Classic dynamic-programming edit distance over Unicode scalar values.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut prev_diag = row[0];
        row[0] = i;
        for j in 1..=b.len() {
            let temp = row[j];
            row[j] = if a[i - 1] == b[j - 1] {
                prev_diag
            } else {
                1 + prev_diag.min(row[j]).min(row[j - 1])
            };
            prev_diag = temp;
        }
    }
    row[b.len()]
}

/// Token-set Jaccard similarity over whitespace-separated tokens.
fn token_jaccard(a: &str, b: &str) -> f64 {
    let a: std::collections::HashSet<&str> = a.split_whitespace().collect();
    let b: std::collections::HashSet<&str> = b.split_whitespace().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(&b).count();
    let union = a.union(&b).count();
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::event_store::InMemoryEventStore;
    use merchant_pipeline_domain::entities::EntityType;

    fn entity(name: &str) -> Entity {
        Entity::new_provisional(EntityType::Merchant, name, "test", Utc::now())
    }

    fn registry() -> InMemoryEntityRegistry {
        InMemoryEntityRegistry::new(Arc::new(InMemoryEventStore::new()))
    }

    #[tokio::test]
    async fn exact_normalized_variation_matches_at_full_confidence() {
        let registry = registry();
        let mut e = entity("Uber Eats");
        e.add_variation(Variation::new("uber eats", "test", Confidence::ONE));
        registry.register(e).await.unwrap();
        let found = registry.find_by_variation("  UBER   EATS ").await.unwrap().unwrap();
        assert_eq!(found.confidence, 1.0);
    }

    #[tokio::test]
    async fn fuzzy_variation_within_threshold_matches() {
        let registry = registry();
        let mut e = entity("Starbucks");
        e.add_variation(Variation::new("STARBUCKS COFFEE", "test", Confidence::ONE));
        registry.register(e).await.unwrap();
        let found = registry.find_by_variation("STARBUCKS COFEE").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn auto_promotes_after_ten_transactions_with_high_confidence() {
        let registry = registry();
        let mut e = entity("Costco");
        e.transaction_count = 9;
        e.confidence_history = vec![Confidence::new(0.9); 9];
        let id = registry.register(e).await.unwrap();
        let patch = serde_json::json!({"transaction_count": 10});
        let updated = registry.update(&id, patch).await.unwrap();
        assert_eq!(updated.state, EntityState::Canonical);
    }

    #[tokio::test]
    async fn merge_resolves_through_chain_and_unions_variations() {
        let registry = registry();
        let mut source = entity("Uber ONE Dup");
        source.add_variation(Variation::new("uber one variant", "test", Confidence::ONE));
        let source_id = registry.register(source).await.unwrap();
        let target = entity("Uber One");
        let target_id = registry.register(target).await.unwrap();

        registry.merge(&source_id, &target_id, "duplicate listing").await.unwrap();

        let merged_source = registry.lookup(&source_id).await.unwrap().unwrap();
        assert!(merged_source.state.is_merged());
        let updated_target = registry.lookup(&target_id).await.unwrap().unwrap();
        assert!(updated_target.has_variation("uber one variant"));
    }
}
