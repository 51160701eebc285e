//! Orchestrator daemon: polls the request ledger, dispatches capture
//! commands to the fleet, and periodically harvests completed artifacts
//! into durable storage.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use downlink_core::{
    HttpNodeTransport, Orchestrator, OrchestratorConfig, PostgresArtifactRepository,
    PostgresLedgerRepository, StartupRetry, config::parse_node_specs, connect_with_retry,
};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "downlink-orchestrator")]
#[command(about = "Dispatch and ingestion daemon for the Downlink tasking platform")]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Capture fleet, comma-separated `targetId=baseUrl` pairs
    #[arg(long, env = "DOWNLINK_NODES")]
    nodes: String,

    /// Cycle period T, e.g. `10s` or `500ms`
    #[arg(long, env = "ORBIT_CYCLE", default_value = "10s", value_parser = humantime::parse_duration)]
    cycle: Duration,

    /// Dispatch-only cycles between ingestion passes; 0 ingests every cycle
    #[arg(long, env = "DOWNLINK_SKIP", default_value_t = 2)]
    skip: u32,

    /// Concurrent per-entry fetches within one ingestion pass
    #[arg(long, env = "DOWNLINK_INGEST_CONCURRENCY", default_value_t = 8)]
    ingest_concurrency: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let nodes = parse_node_specs(&cli.nodes).context("invalid --nodes specification")?;
    let config = OrchestratorConfig {
        cycle: cli.cycle,
        skip: cli.skip,
        ingest_concurrency: cli.ingest_concurrency,
        nodes,
    };

    let pool = connect_with_retry(&cli.database_url, &StartupRetry::default())
        .await
        .context("request ledger unreachable, giving up")?;

    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(PostgresLedgerRepository::new(pool.clone())),
        Arc::new(PostgresArtifactRepository::new(pool)),
        Arc::new(HttpNodeTransport::new()?),
        config,
    ));

    let token = orchestrator.shutdown_token();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
        token.cancel();
    });

    orchestrator.run().await?;
    Ok(())
}
