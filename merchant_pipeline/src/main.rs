// /////////////////////////////////////////////////////////////////////////////
// Merchant Pipeline
// Copyright (c) 2026 Merchant Pipeline Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Composition root: wires the validated CLI to concrete infrastructure and
//! drives one of the bootstrap subcommands to completion.

use std::io::BufRead;
use std::sync::Arc;

use chrono::Utc;
use merchant_pipeline::application::perception;
use merchant_pipeline::{CoreError, EventStore, PipelineMetrics, PipelineOrchestrator, ProcessApi, RawTransaction, RulesLoader};
use merchant_pipeline::application::pipeline::{
    CategoryEnrichingEntityResolver, RegexNerExtractor, RuleBasedCounterpartyDetector, RuleBasedDisambiguator,
    RuleBasedTypeDetector,
};
use merchant_pipeline::infrastructure::{AppConfig, FileRulesSource, InMemoryEntityRegistry, InMemoryEventStore, SqliteEventStore};
use merchant_pipeline_bootstrap::cli::ValidatedCommand;
use merchant_pipeline_bootstrap::{exit_code, result_to_exit_code, shutdown::ShutdownCoordinator};
use merchant_pipeline_domain::events::payloads::{
    ClassificationApprovedPayload, ClassificationRejectedPayload, TransactionClassifiedPayload,
    TransactionImportedPayload,
};
use merchant_pipeline_domain::events::EventMetadata;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = match merchant_pipeline_bootstrap::bootstrap_cli() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("argument error: {e}");
            return exit_code::ExitCode::Usage.into();
        }
    };

    result_to_exit_code(run(cli).await)
}

async fn run(cli: merchant_pipeline_bootstrap::ValidatedCli) -> Result<(), CoreError> {
    let config_path = cli.config.as_ref().map(|p| p.to_string_lossy().to_string());
    let mut config = AppConfig::load(config_path.as_deref())?;
    if let Some(workers) = cli.workers {
        config.worker_count = workers;
    }
    if let Some(ref uri) = cli.store_uri {
        config.store_uri = Some(uri.clone());
    }
    if let Some(ref dir) = cli.rules_dir {
        config.rules_dir = dir.to_string_lossy().to_string();
    }

    merchant_pipeline::infrastructure::logging::init(if cli.verbose { "debug" } else { &config.log_level });

    let shutdown = ShutdownCoordinator::default();
    merchant_pipeline_bootstrap::signals::install(shutdown.clone());

    let store: Arc<dyn EventStore> = match &config.store_uri {
        Some(uri) => Arc::new(SqliteEventStore::connect(uri).await?),
        None => Arc::new(InMemoryEventStore::new()),
    };
    let process_api = ProcessApi::new(store.clone());
    let metrics = Arc::new(PipelineMetrics::new()?);

    let registry = Arc::new(InMemoryEntityRegistry::new(store.clone()));
    let resolver = Arc::new(CategoryEnrichingEntityResolver::new(registry));
    let orchestrator = PipelineOrchestrator::new(
        RuleBasedTypeDetector,
        RuleBasedCounterpartyDetector,
        RegexNerExtractor,
        RuleBasedDisambiguator,
        resolver,
        config.worker_count,
        metrics.clone(),
    );

    let rules_loader = RulesLoader::new(FileRulesSource::new(config.rules_dir.clone()));
    let report = rules_loader.load().await?;
    if !report.accepted {
        tracing::warn!(reason = ?report.rejection_reason, "initial rule load was rejected; running with an empty rule set");
    }

    match cli.command {
        ValidatedCommand::Import { input } => {
            import(&input, &orchestrator, &process_api, &rules_loader, &metrics).await?
        }
        ValidatedCommand::ReloadRules => {
            let report = rules_loader.load().await?;
            println!("{report:#?}");
        }
        ValidatedCommand::ShowTransaction { transaction_id } => show_transaction(&*store, &transaction_id).await?,
        ValidatedCommand::ReviewQueue => review_queue(&*store, &metrics).await?,
        ValidatedCommand::Approve { transaction_id, by } => approve(&*store, &process_api, &transaction_id, &by).await?,
        ValidatedCommand::Reject { transaction_id, by, reason } => {
            reject(&process_api, &transaction_id, &by, &reason).await?
        }
        ValidatedCommand::Stats => stats(&*store).await?,
    }

    shutdown.complete_shutdown();
    Ok(())
}

async fn import<S: EventStore>(
    input: &std::path::Path,
    orchestrator: &PipelineOrchestrator<
        RuleBasedTypeDetector,
        RuleBasedCounterpartyDetector,
        RegexNerExtractor,
        RuleBasedDisambiguator,
        CategoryEnrichingEntityResolver<InMemoryEntityRegistry>,
    >,
    process_api: &ProcessApi<S>,
    rules_loader: &RulesLoader<FileRulesSource>,
    metrics: &PipelineMetrics,
) -> Result<(), CoreError> {
    let file = std::fs::File::open(input)?;
    let rules = rules_loader.current();
    let mut imported = 0usize;

    for line in std::io::BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let raw: RawTransaction = serde_json::from_str(&line)?;
        let transaction_id = ulid::Ulid::new().to_string();
        let business_time = raw.date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        let metadata = EventMetadata::new("cli-import", "merchant-pipeline");

        let record = orchestrator.process(raw.clone(), &rules).await?;
        let stage_1_type = record.stage_1.as_ref().map(|s| s.transaction_type.clone()).unwrap_or_else(|| "unknown".to_string());

        process_api
            .append_transaction_imported(
                TransactionImportedPayload {
                    transaction_id: transaction_id.clone(),
                    raw: serde_json::to_value(&raw)?,
                    stage_1_type,
                },
                business_time,
                metadata.clone(),
            )
            .await?;
        metrics.record_imported();

        if record.stage_4.is_some() {
            process_api
                .append_transaction_classified(
                    TransactionClassifiedPayload { transaction_id, record: serde_json::to_value(&record)? },
                    business_time,
                    metadata,
                )
                .await?;
            metrics.record_classified();
        }
        imported += 1;
    }

    println!("imported {imported} transactions");
    Ok(())
}

async fn show_transaction(store: &dyn EventStore, transaction_id: &str) -> Result<(), CoreError> {
    let events = store.all_events().await?;
    match perception::get_transaction(&events, transaction_id) {
        Some(view) => println!("{view:#?}"),
        None => println!("no such transaction: {transaction_id}"),
    }
    Ok(())
}

async fn review_queue(store: &dyn EventStore, metrics: &PipelineMetrics) -> Result<(), CoreError> {
    let events = store.all_events().await?;
    let queue = perception::get_review_queue(&events);
    metrics.set_review_queue_depth(queue.len() as i64);
    for view in queue {
        println!("{}", view.transaction_id);
    }
    Ok(())
}

async fn approve<S: EventStore>(
    store: &dyn EventStore,
    process_api: &ProcessApi<S>,
    transaction_id: &str,
    by: &str,
) -> Result<(), CoreError> {
    let events = store.all_events().await?;
    let view = perception::get_transaction(&events, transaction_id);
    let merchant = view
        .as_ref()
        .and_then(|v| v.classification.as_ref())
        .and_then(|r| r.pointer("/stage_4/merchant_name"))
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();
    let category = view
        .as_ref()
        .and_then(|v| v.classification.as_ref())
        .and_then(|r| r.pointer("/stage_5/merchant_category"))
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();

    process_api
        .approve_classification(
            ClassificationApprovedPayload {
                transaction_id: transaction_id.to_string(),
                merchant,
                category,
                approved_by: by.to_string(),
            },
            Utc::now(),
            EventMetadata::new(by, "merchant-pipeline-cli"),
        )
        .await?;
    println!("approved {transaction_id}");
    Ok(())
}

async fn reject<S: EventStore>(
    process_api: &ProcessApi<S>,
    transaction_id: &str,
    by: &str,
    reason: &str,
) -> Result<(), CoreError> {
    process_api
        .reject_classification(
            ClassificationRejectedPayload {
                transaction_id: transaction_id.to_string(),
                rejected_by: by.to_string(),
                reason: reason.to_string(),
            },
            Utc::now(),
            EventMetadata::new(by, "merchant-pipeline-cli"),
        )
        .await?;
    println!("rejected {transaction_id}");
    Ok(())
}

async fn stats(store: &dyn EventStore) -> Result<(), CoreError> {
    let events = store.all_events().await?;
    let stats = perception::transaction_statistics(&events);
    println!("{stats:#?}");
    Ok(())
}
