// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Stage 5 — Entity Resolver + Category Enricher (§4.8).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use merchant_pipeline_domain::aggregates::{
    DisambiguationMethod, Direction, FlowType, PipelineRecord, ResolutionMethod, Stage5Info,
};
use merchant_pipeline_domain::entities::{Entity, EntityState, EntityType};
use merchant_pipeline_domain::error::CoreResult;
use merchant_pipeline_domain::repositories::EntityRegistry;
use merchant_pipeline_domain::services::rules::RuleSet;
use merchant_pipeline_domain::services::stages::EntityResolver as EntityResolverTrait;
use merchant_pipeline_domain::value_objects::{Confidence, EntityId};

const GATE_THRESHOLD: f64 = 0.50;

pub struct CategoryEnrichingEntityResolver<R: EntityRegistry> {
    registry: Arc<R>,
}

impl<R: EntityRegistry> CategoryEnrichingEntityResolver<R> {
    pub fn new(registry: Arc<R>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl<R: EntityRegistry> EntityResolverTrait for CategoryEnrichingEntityResolver<R> {
    async fn resolve(&self, record: PipelineRecord, rules: &RuleSet) -> CoreResult<PipelineRecord> {
        let stage_4 = record.stage_4.clone().expect("stage 5 requires stage 4");
        let stage_1 = record.stage_1.clone().expect("stage 5 requires stage 1");

        let Some(merchant_id) = stage_4.merchant_id.clone() else {
            let stage_5 = Stage5Info {
                entity_id: None,
                entity_state: None,
                needs_verification: false,
                flow_type: None,
                account_category: None,
                merchant_category: None,
                merchant_category_confidence: Confidence::ZERO,
                budget_category: None,
                tax_category: None,
                payment_method: None,
                resolution_method: ResolutionMethod::Skipped,
                confidence: stage_4.confidence,
                stage5_status: "incomplete",
            };
            return Ok(record.with_stage_5(stage_5));
        };

        let entity_id = EntityId::from_keyword(merchant_id.clone());
        let now = Utc::now();
        let (entity, resolution_method) = match self.registry.lookup(&entity_id).await? {
            Some(mut existing) => {
                existing.transaction_count += 1;
                existing.confidence_history.push(stage_4.confidence);
                existing.last_seen = now;
                let patch = serde_json::json!({
                    "transaction_count": existing.transaction_count,
                    "last_seen": now,
                });
                self.registry.update(&entity_id, patch).await?;
                (existing, ResolutionMethod::Resolved)
            }
            None => {
                let state = if stage_4.disambiguation_method == DisambiguationMethod::RuleMatch {
                    EntityState::Canonical
                } else {
                    EntityState::Provisional
                };
                let mut new_entity = Entity::new_provisional(
                    EntityType::Merchant,
                    stage_4.merchant_name.clone().unwrap_or_else(|| merchant_id.clone()),
                    "pipeline-auto",
                    now,
                );
                new_entity.entity_id = entity_id.clone();
                new_entity.state = state;
                new_entity.transaction_count = 1;
                new_entity.confidence_history.push(stage_4.confidence);
                new_entity.declared_category = stage_4.merchant_category.clone();
                self.registry.register(new_entity.clone()).await?;
                (new_entity, ResolutionMethod::Created)
            }
        };

        let needs_verification =
            stage_4.confidence.value() < 0.70 || (matches!(entity.state, EntityState::Provisional) && entity.transaction_count == 1);

        let flow_type = flow_type_from_direction(stage_1.direction);
        let account_category = account_category_for(flow_type);

        let (merchant_category, merchant_category_confidence) = merchant_category_for(&entity, rules);
        let budget_category = budget_category_for(&entity, rules);
        let tax_category = tax_category_for(stage_1.direction, &stage_4, &entity);
        let payment_method = payment_method_for(&stage_1.transaction_type);

        let dimension_confidences = [
            Some(merchant_category_confidence),
            Some(Confidence::ONE), // account_category is a deterministic mapping
            Some(Confidence::ONE), // tax_category is a deterministic mapping
            Some(Confidence::ONE), // payment_method is a deterministic mapping
        ];
        let weighted_min = dimension_confidences
            .iter()
            .flatten()
            .cloned()
            .fold(Confidence::ONE, |acc, c| acc.min(c));
        let overall = stage_4.confidence.min(weighted_min);

        let stage5_status = if overall.value() >= GATE_THRESHOLD { "complete" } else { "incomplete" };

        let stage_5 = Stage5Info {
            entity_id: Some(entity.entity_id.clone()),
            entity_state: Some(entity_state_label(&entity.state)),
            needs_verification,
            flow_type: Some(flow_type),
            account_category: Some(account_category),
            merchant_category: Some(merchant_category),
            merchant_category_confidence,
            budget_category: Some(budget_category),
            tax_category: Some(tax_category),
            payment_method: Some(payment_method),
            resolution_method,
            confidence: overall,
            stage5_status,
        };
        Ok(record.with_stage_5(stage_5))
    }
}

fn entity_state_label(state: &EntityState) -> String {
    match state {
        EntityState::Provisional => "provisional".to_string(),
        EntityState::Canonical => "canonical".to_string(),
        EntityState::Merged { .. } => "merged".to_string(),
    }
}

fn flow_type_from_direction(direction: Direction) -> FlowType {
    match direction {
        Direction::Income => FlowType::Ingreso,
        Direction::Expense => FlowType::Gasto,
        Direction::Transfer => FlowType::Traspaso,
        Direction::Unknown => FlowType::Gasto,
    }
}

fn account_category_for(flow_type: FlowType) -> String {
    match flow_type {
        FlowType::Gasto => "Expenses/Debit".to_string(),
        FlowType::Ingreso => "Revenue/Credit".to_string(),
        FlowType::PagoTarjeta => "Liabilities/Debit".to_string(),
        FlowType::Traspaso => "Transfer/Debit-or-Credit".to_string(),
        FlowType::Retiro => "Cash/Debit".to_string(),
    }
}

fn merchant_category_for(entity: &Entity, rules: &RuleSet) -> (String, Confidence) {
    if let Some(mcc_code) = entity.mcc_code {
        if let Some(entry) = rules.mcc_table.iter().find(|e| e.code == mcc_code) {
            return (entry.name.clone(), Confidence::new(0.95));
        }
    }
    if let Some(declared) = &entity.declared_category {
        return (declared.clone(), Confidence::new(0.6));
    }
    ("unknown".to_string(), Confidence::new(0.3))
}

fn budget_category_for(entity: &Entity, rules: &RuleSet) -> String {
    if let Some(mcc_code) = entity.mcc_code {
        if let Some(entry) = rules.mcc_table.iter().find(|e| e.code == mcc_code) {
            return entry.budget_category.clone();
        }
    }
    entity.declared_budget_category.clone().unwrap_or_else(|| "uncategorized".to_string())
}

fn tax_category_for(
    direction: Direction,
    stage_4: &merchant_pipeline_domain::aggregates::Stage4Info,
    entity: &Entity,
) -> String {
    if stage_4.merchant_category.as_deref() == Some("credit-card-payment") {
        return "Non-Deductible".to_string();
    }
    match direction {
        Direction::Income => "Taxable Income".to_string(),
        Direction::Expense if entity.business_deductible => "Business Deductible".to_string(),
        Direction::Expense if entity.personal_deductible => "Personal Deductible".to_string(),
        _ => "Non-Deductible".to_string(),
    }
}

fn payment_method_for(transaction_type: &str) -> String {
    match transaction_type {
        "credit-card-payment" => "Credit Card".to_string(),
        t if t.contains("transfer") => "Bank Transfer".to_string(),
        "atm-withdrawal" => "Cash".to_string(),
        _ => "Debit/Checking".to_string(),
    }
}
