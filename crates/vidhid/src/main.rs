//! Vidhi Daemon - compliance question answering core.
//!
//! Runs the query engine, background load sampling, and audit logging.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn, Level};

use vidhi_common::Query;
use vidhid::config::Config;
use vidhid::engine::QueryEngine;
use vidhid::events::TracingEventSink;
use vidhid::llm::OllamaGenerator;
use vidhid::monitor::sampler::{spawn_sampler, SysinfoProbe};
use vidhid::monitor::QueryMonitor;
use vidhid::retrieval::MemoryRetriever;

/// Startup wiring check, counted like any other query.
const SELF_CHECK_QUESTION: &str = "What is the GST registration threshold?";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Vidhi Daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::load();

    let monitor = Arc::new(QueryMonitor::new());
    let sampler = spawn_sampler(
        Arc::clone(&monitor),
        Box::new(SysinfoProbe::new()),
        config.monitor.sample_interval(),
        config.monitor.retry_interval(),
    );

    let retriever = match &config.retrieval.documents_dir {
        Some(dir) => match MemoryRetriever::from_dir(dir) {
            Ok(retriever) => retriever,
            Err(e) => {
                warn!("Could not load corpus from {}: {}", dir.display(), e);
                MemoryRetriever::empty()
            }
        },
        None => MemoryRetriever::empty(),
    };
    info!("Corpus loaded: {} documents", retriever.len());

    let generator = OllamaGenerator::new(&config.llm)?;
    let engine = QueryEngine::new(
        Arc::new(retriever),
        Arc::new(generator),
        Arc::clone(&monitor),
        Arc::new(TracingEventSink),
    );

    let outcome = engine
        .handle_query(&Query::new(SELF_CHECK_QUESTION).with_top_k(config.retrieval.top_k))
        .await;
    info!(
        confidence = outcome.confidence,
        elapsed_ms = outcome.elapsed_ms,
        "Self-check query complete"
    );

    info!("Vidhi Daemon ready");

    tokio::signal::ctrl_c().await?;

    let stats = monitor.snapshot();
    info!(
        total = stats.total_queries,
        failed = stats.failed_queries,
        uptime_seconds = stats.uptime_seconds,
        "Shutting down gracefully"
    );
    sampler.shutdown().await;

    Ok(())
}
