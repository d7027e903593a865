// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

// Production code safety enforced via CI and `make lint-strict`
// (lib/bins checked separately from tests - tests may use unwrap/expect)

//! # Merchant Pipeline
//!
//! Application and infrastructure layers for the merchant extraction and
//! classification system. Wires the pure domain crate
//! (`merchant_pipeline_domain`) to concrete adapters and exposes the three
//! boundaries a caller needs:
//!
//! - [`application::pipeline`] — the five-stage deterministic orchestrator
//!   that turns a `RawTransaction` into a `PipelineRecord`.
//! - [`application::process`] — the Process API: commands that append
//!   events to the event store.
//! - [`application::perception`] — the Perception API: read-only
//!   projections folded from the event log.
//!
//! ## Architecture
//!
//! Clean Architecture, as in the domain crate, with this crate adding the
//! two outer rings:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Application Layer                          │
//! │  (pipeline orchestrator, Process API, Perception API,       │
//! │   rules loader)                                             │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Domain Layer                             │
//! │  (merchant_pipeline_domain: entities, events, services)      │
//! └─────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                Infrastructure Layer                         │
//! │  (event store, entity registry, rules source, ML oracle     │
//! │   circuit breaker, config, logging, metrics)                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A process composing this crate (see `merchant_pipeline_bootstrap`)
//! chooses concrete infrastructure implementations, builds the stage set
//! and `PipelineOrchestrator`, and drives it from `RawTransaction` input.

pub mod application;
pub mod infrastructure;

// Tests are organized as:
// - Unit tests: #[cfg(test)] modules within each source file
// - Integration tests: separate files in tests/ directory

pub use merchant_pipeline_domain::{
    Confidence, CoreError, CoreResult, Entity, EntityId, EntityRegistry, EntityState, EntityType, Event, EventKind,
    EventStore, IdempotencyHash, Money, PipelineRecord, RawTransaction, RulesSource,
};

pub use crate::application::{PipelineOrchestrator, ProcessApi, RuleLoadReport, RulesLoader};
pub use crate::infrastructure::{
    AppConfig, CircuitBreakerMlOracle, FileRulesSource, InMemoryEntityRegistry, InMemoryEventStore, PipelineMetrics,
    SqliteEventStore,
};
