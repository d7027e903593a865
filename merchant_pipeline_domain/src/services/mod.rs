// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Domain services: stateless operations that don't belong to any single
//! entity or value object.

pub mod entity_graph;
pub mod ml_oracle;
pub mod rules;
pub mod stages;

pub use entity_graph::EntityGraph;
pub use ml_oracle::{CircuitBreakerConfig, MlOracle, RetryPolicy};
pub use rules::{
    CounterpartyRule, DisambiguationRule, MccEntry, RequiredField, RuleCommon, RuleSet, StageDirection,
    TypeDetectorRule,
};
pub use stages::{CounterpartyDetector, Disambiguator, EntityResolver, NerExtractor, TypeDetector};
