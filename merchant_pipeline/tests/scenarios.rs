// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! End-to-end scenarios exercised against the public Process/Perception
//! boundary and the entity registry, covering the correction flow and the
//! duplicate-entity merge flow.

use std::sync::Arc;

use chrono::{Duration, Utc};
use merchant_pipeline::application::perception;
use merchant_pipeline::{CoreError, Entity, EntityRegistry, EntityType, InMemoryEntityRegistry, InMemoryEventStore, ProcessApi};
use merchant_pipeline_domain::entities::Variation;
use merchant_pipeline_domain::events::payloads::{
    TransactionClassifiedPayload, TransactionCorrectedPayload, TransactionImportedPayload,
};
use merchant_pipeline_domain::events::EventMetadata;
use merchant_pipeline_domain::value_objects::Confidence;

#[tokio::test]
async fn correction_flow_appends_one_event_and_updates_the_current_view() -> Result<(), CoreError> {
    let store = Arc::new(InMemoryEventStore::new());
    let process_api = ProcessApi::new(store.clone());
    let metadata = EventMetadata::new("test-harness", "scenarios");
    let t_imported = Utc::now();
    let t_classified = t_imported + Duration::seconds(1);
    let t_before_correction = t_classified + Duration::seconds(1);
    let t_corrected = t_before_correction + Duration::seconds(1);

    process_api
        .append_transaction_imported(
            TransactionImportedPayload {
                transaction_id: "tx-001".to_string(),
                raw: serde_json::json!({"description": "CHECKCARD SOME MERCHANT", "debit": 45.99}),
                stage_1_type: "card-purchase".to_string(),
            },
            t_imported,
            metadata.clone(),
        )
        .await?;
    process_api
        .append_transaction_classified(
            TransactionClassifiedPayload {
                transaction_id: "tx-001".to_string(),
                record: serde_json::json!({"stage_4": {"merchant_name": "Some Merchant"}}),
            },
            t_classified,
            metadata.clone(),
        )
        .await?;
    process_api
        .append_transaction_corrected(
            TransactionCorrectedPayload {
                transaction_id: "tx-001".to_string(),
                correction: serde_json::json!({"amount": 46.00}),
                reason: "receipt".to_string(),
            },
            t_corrected,
            metadata,
        )
        .await?;

    let events = store.all_events().await?;

    let view = perception::get_transaction(&events, "tx-001").expect("transaction must be present");
    let corrected_amount = view.correction.as_ref().and_then(|c| c.get("amount")).and_then(|v| v.as_f64());
    assert_eq!(corrected_amount, Some(46.00));

    let history = perception::transaction_history(&events, "tx-001");
    assert_eq!(history.len(), 3);

    let before = perception::project_state_at(&events, t_before_correction);
    let view_before = before.get("tx-001").expect("transaction must exist before the correction");
    assert!(view_before.correction.is_none());

    Ok(())
}

#[tokio::test]
async fn duplicate_entities_detected_by_fuzzy_match_merge_into_one() -> Result<(), CoreError> {
    let registry = InMemoryEntityRegistry::new();

    let mut oxoo = Entity::new_provisional(EntityType::Merchant, "OXOO", "ner-extraction", Utc::now());
    oxoo.add_variation(Variation::new("OXOO", "ner-extraction", Confidence::ONE));
    let oxoo_id = registry.register(oxoo).await?;

    let mut oxxo = Entity::new_provisional(EntityType::Merchant, "OXXO", "ner-extraction", Utc::now());
    oxxo.add_variation(Variation::new("OXXO", "ner-extraction", Confidence::ONE));
    let oxxo_id = registry.register(oxxo).await?;

    let candidate = registry.find_by_variation("OXOO").await?.expect("exact variation must match");
    assert_eq!(candidate.entity.entity_id, oxoo_id);

    registry.merge(&oxoo_id, &oxxo_id, "typo").await?;

    let merged = registry.lookup(&oxoo_id).await?.expect("merged entity keeps its history");
    assert!(merged.state.is_merged());

    let target = registry.lookup(&oxxo_id).await?.expect("merge target survives");
    assert!(target.has_variation("OXOO"));

    let resolved = registry.find_by_variation("OXOO").await?.expect("post-merge lookup must resolve");
    assert_eq!(resolved.entity.entity_id, oxxo_id);

    Ok(())
}
