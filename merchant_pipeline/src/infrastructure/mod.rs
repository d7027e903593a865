// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Infrastructure layer: concrete adapters for the domain's repository and
//! service ports, plus the process's own cross-cutting concerns
//! (configuration, logging, metrics) that sit outside the hexagon.

pub mod config;
pub mod entity_registry;
pub mod event_store;
pub mod logging;
pub mod metrics;
pub mod ml_client;
pub mod rules_source;

pub use config::AppConfig;
pub use entity_registry::InMemoryEntityRegistry;
pub use event_store::{InMemoryEventStore, SqliteEventStore};
pub use metrics::PipelineMetrics;
pub use ml_client::CircuitBreakerMlOracle;
pub use rules_source::FileRulesSource;
