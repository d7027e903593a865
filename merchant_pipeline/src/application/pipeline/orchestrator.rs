// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The Pipeline Orchestrator (§4.9): chains the five stages, enforces the
//! early-termination gate, and computes batch statistics. Stages 1-4 are
//! pure and CPU-bound so a batch runs them in parallel with `rayon`; stage 5
//! is the pipeline's one I/O-bound, async stage and runs per-record inside a
//! bounded worker pool for streaming backpressure, matching the
//! `PipelineService`/`ProcessFileContext` shape this crate is built from.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use merchant_pipeline_domain::aggregates::PipelineRecord;
use merchant_pipeline_domain::entities::RawTransaction;
use merchant_pipeline_domain::error::CoreResult;
use merchant_pipeline_domain::services::rules::RuleSet;
use merchant_pipeline_domain::services::stages::{
    CounterpartyDetector, Disambiguator, EntityResolver, NerExtractor, TypeDetector,
};
use rayon::prelude::*;
use tokio::sync::{mpsc, Mutex};

use crate::infrastructure::metrics::PipelineMetrics;

/// Post-batch summary per §4.9: counts by type, by stage status, by
/// category; unresolved-entity count; fallback count; average confidence;
/// processing time.
#[derive(Debug, Clone, Default)]
pub struct BatchStatistics {
    pub total: usize,
    pub counts_by_type: HashMap<String, usize>,
    pub counts_by_category: HashMap<String, usize>,
    pub early_terminated: usize,
    pub unresolved_entity_count: usize,
    pub fallback_count: usize,
    pub average_confidence: f64,
    pub processing_time_ms: u128,
}

impl fmt::Display for BatchStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "processed {} transactions in {}ms", self.total, self.processing_time_ms)?;
        writeln!(f, "  early terminated: {}", self.early_terminated)?;
        writeln!(f, "  unresolved entities: {}", self.unresolved_entity_count)?;
        writeln!(f, "  fallback classifications: {}", self.fallback_count)?;
        write!(f, "  average confidence: {:.3}", self.average_confidence)
    }
}

impl BatchStatistics {
    fn accumulate(&mut self, record: &PipelineRecord) {
        self.total += 1;
        if let Some(stage_1) = &record.stage_1 {
            *self.counts_by_type.entry(stage_1.transaction_type.clone()).or_insert(0) += 1;
            if !stage_1.merchant {
                self.early_terminated += 1;
            }
        }
        if let Some(stage_4) = &record.stage_4 {
            if stage_4.fallback {
                self.fallback_count += 1;
            }
        }
        if let Some(stage_5) = &record.stage_5 {
            if let Some(category) = &stage_5.merchant_category {
                *self.counts_by_category.entry(category.clone()).or_insert(0) += 1;
            }
            if stage_5.needs_verification {
                self.unresolved_entity_count += 1;
            }
        }
    }

    fn finalize(&mut self, confidence_sum: f64, elapsed_ms: u128) {
        self.average_confidence = if self.total == 0 { 0.0 } else { confidence_sum / self.total as f64 };
        self.processing_time_ms = elapsed_ms;
    }
}

pub struct PipelineOrchestrator<T, C, N, D, E>
where
    T: TypeDetector,
    C: CounterpartyDetector,
    N: NerExtractor,
    D: Disambiguator,
    E: EntityResolver,
{
    type_detector: T,
    counterparty_detector: C,
    ner_extractor: N,
    disambiguator: D,
    entity_resolver: Arc<E>,
    worker_count: usize,
    metrics: Arc<PipelineMetrics>,
}

impl<T, C, N, D, E> PipelineOrchestrator<T, C, N, D, E>
where
    T: TypeDetector + Sync,
    C: CounterpartyDetector + Sync,
    N: NerExtractor + Sync,
    D: Disambiguator + Sync,
    E: EntityResolver + Send + Sync + 'static,
{
    pub fn new(
        type_detector: T,
        counterparty_detector: C,
        ner_extractor: N,
        disambiguator: D,
        entity_resolver: Arc<E>,
        worker_count: usize,
        metrics: Arc<PipelineMetrics>,
    ) -> Self {
        Self {
            type_detector,
            counterparty_detector,
            ner_extractor,
            disambiguator,
            entity_resolver,
            worker_count: worker_count.max(1),
            metrics,
        }
    }

    /// Runs stages 1-4 synchronously, gating 2-4 on stage 1's `merchant`
    /// flag, then resolves stage 5 if applicable.
    pub async fn process(&self, raw_tx: RawTransaction, rules: &RuleSet) -> CoreResult<PipelineRecord> {
        let record = self.run_stages_1_to_4(raw_tx, rules);
        self.run_stage_5_if_applicable(record, rules).await
    }

    fn run_stages_1_to_4(&self, raw_tx: RawTransaction, rules: &RuleSet) -> PipelineRecord {
        let started = Instant::now();
        let record = self.type_detector.detect(raw_tx, rules);
        self.metrics.record_stage_duration(1, started.elapsed());
        if !record.should_continue_past_stage_1() {
            return record;
        }

        let started = Instant::now();
        let record = self.counterparty_detector.detect(record, rules);
        self.metrics.record_stage_duration(2, started.elapsed());

        let started = Instant::now();
        let record = self.ner_extractor.extract(record, rules);
        self.metrics.record_stage_duration(3, started.elapsed());

        let started = Instant::now();
        let record = self.disambiguator.disambiguate(record, rules);
        self.metrics.record_stage_duration(4, started.elapsed());
        record
    }

    async fn run_stage_5_if_applicable(&self, record: PipelineRecord, rules: &RuleSet) -> CoreResult<PipelineRecord> {
        if record.stage_4.is_none() {
            // Stage 1 gated the record off; it never reaches stage 4, so
            // stage 5 does not run either.
            return Ok(record);
        }
        let started = Instant::now();
        let resolved = self.entity_resolver.resolve(record, rules).await;
        self.metrics.record_stage_duration(5, started.elapsed());
        resolved
    }

    /// Stages 1-4 run in parallel across the batch via `rayon` (pure, CPU
    /// bound); stage 5 then runs per-record against the shared registry.
    pub async fn process_batch(&self, raw_txs: Vec<RawTransaction>, rules: &RuleSet) -> CoreResult<(Vec<PipelineRecord>, BatchStatistics)> {
        let started = Instant::now();
        let partial: Vec<PipelineRecord> =
            raw_txs.into_par_iter().map(|tx| self.run_stages_1_to_4(tx, rules)).collect();

        let mut resolved = Vec::with_capacity(partial.len());
        for record in partial {
            resolved.push(self.run_stage_5_if_applicable(record, rules).await?);
        }

        let mut stats = BatchStatistics::default();
        let mut confidence_sum = 0.0;
        for record in &resolved {
            stats.accumulate(record);
            confidence_sum += record.overall_confidence().value();
        }
        stats.finalize(confidence_sum, started.elapsed().as_millis());

        Ok((resolved, stats))
    }

    /// Streams transactions through a bounded worker pool of
    /// `self.worker_count` workers, providing backpressure on the input
    /// channel (§5: "Only two suspension points: waiting for a channel
    /// slot... and awaiting the remote ML oracle"). Order across
    /// transactions is not preserved, matching the parallel-mode guarantee.
    pub async fn process_stream(
        self: Arc<Self>,
        input: mpsc::Receiver<RawTransaction>,
        output: mpsc::Sender<CoreResult<PipelineRecord>>,
        rules: Arc<RuleSet>,
    ) where
        T: 'static,
        C: 'static,
        N: 'static,
        D: 'static,
        E: 'static,
    {
        let input = Arc::new(Mutex::new(input));
        let mut workers = Vec::with_capacity(self.worker_count);
        for _ in 0..self.worker_count {
            let input = Arc::clone(&input);
            let output = output.clone();
            let rules = Arc::clone(&rules);
            let orchestrator = Arc::clone(&self);
            workers.push(tokio::spawn(async move {
                loop {
                    let raw_tx = {
                        let mut guard = input.lock().await;
                        guard.recv().await
                    };
                    let Some(raw_tx) = raw_tx else { break };
                    let result = orchestrator.process(raw_tx, &rules).await;
                    if output.send(result).await.is_err() {
                        break;
                    }
                }
            }));
        }

        for worker in workers {
            let _ = worker.await;
        }
    }
}
