//! FarmHub daemon — telemetry ingestion and rule evaluation.
//!
//! Wires the adapters into the application core and runs three tasks
//! until shutdown: the telemetry listener, the command publisher, and
//! the rule evaluation scheduler.

mod config;

use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use farmhub_adapter_cache_redis::RedisReadingCache;
use farmhub_adapter_eval_evalexpr::EvalexprMatcher;
use farmhub_adapter_mqtt::ingest::{ConnectionStatus, run_listener};
use farmhub_adapter_mqtt::publish::{command_queue, run_publisher};
use farmhub_adapter_storage_sqlite_sqlx::{SqliteReadingStore, SqliteRuleRepository, pool};
use farmhub_app::dispatch::ActionDispatcher;
use farmhub_app::engine::RuleEngine;
use farmhub_app::pipeline::ReadingPipeline;
use farmhub_app::ports::notifier::LogNotifier;
use farmhub_app::scheduler;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    tracing::info!(
        broker = %config.broker.broker_host,
        port = config.broker.broker_port,
        database = %config.database.url,
        "starting farmhubd"
    );

    let database = pool::Config {
        database_url: config.database.url.clone(),
    }
    .build()
    .await?;
    let rule_repo = SqliteRuleRepository::new(database.pool().clone());
    let reading_store = SqliteReadingStore::new(database.pool().clone());

    let cache = RedisReadingCache::connect(&config.cache)?;

    let (command_sink, command_rx) = command_queue(config.broker.command_queue_capacity);

    let (stop_tx, stop_rx) = watch::channel(false);

    let broker_health = ConnectionStatus::new();
    let listener = tokio::spawn(run_listener(
        config.broker.clone(),
        ReadingPipeline::new(cache.clone(), reading_store),
        broker_health.clone(),
        stop_rx.clone(),
    ));

    let publisher = tokio::spawn(run_publisher(
        config.broker.clone(),
        command_rx,
        stop_rx.clone(),
    ));

    let engine = RuleEngine::new(
        rule_repo,
        cache,
        EvalexprMatcher,
        ActionDispatcher::new(command_sink, LogNotifier),
    );
    if config.evaluation.interval_secs == 0 {
        tracing::warn!("evaluation interval is zero, using the default");
    }
    let options = config.evaluation.scheduler_options();
    let evaluator = tokio::spawn(async move {
        scheduler::run(options, stop_rx, || engine.evaluate_all()).await;
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!(
        broker_connected = broker_health.is_connected(),
        "shutdown signal received"
    );
    let _ = stop_tx.send(true);

    let _ = listener.await;
    let _ = publisher.await;
    let _ = evaluator.await;

    tracing::info!("farmhubd stopped");
    Ok(())
}
