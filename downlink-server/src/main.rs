use std::sync::Arc;

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use downlink_core::{
    MIGRATOR, PostgresArtifactRepository, PostgresLedgerRepository, PostgresNodeRegistry,
    StartupRetry, connect_with_retry,
};
use downlink_server::{AppState, build_app};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "downlink-server")]
#[command(about = "Intake and export API for the Downlink tasking platform")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Bind host
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Bind port
    #[arg(short, long, env = "SERVER_PORT", default_value_t = 3000)]
    port: u16,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Verify database connectivity and exit
    Ping,
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(command) = cli.command {
        match command {
            Command::Db(DbCommand::Ping) => {
                run_db_ping(&cli.serve).await?;
                return Ok(());
            }
            Command::Db(DbCommand::Migrate) => {
                run_db_migrate(&cli.serve).await?;
                return Ok(());
            }
        }
    }

    run_server(cli.serve).await
}

async fn run_db_ping(args: &ServeArgs) -> anyhow::Result<()> {
    let pool = connect_with_retry(&args.database_url, &StartupRetry::default())
        .await
        .context("failed to connect to PostgreSQL for ping")?;
    sqlx::query("SELECT 1").execute(&pool).await?;
    info!("database ping passed");
    Ok(())
}

async fn run_db_migrate(args: &ServeArgs) -> anyhow::Result<()> {
    let pool = connect_with_retry(&args.database_url, &StartupRetry::default())
        .await
        .context("failed to connect to PostgreSQL for migration")?;
    MIGRATOR
        .run(&pool)
        .await
        .context("database migration failed")?;
    info!("database migrations applied successfully");
    Ok(())
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    // Bounded startup retry: the composed deployment brings the store up in
    // parallel with us, so a few refused connections are expected.
    let pool = connect_with_retry(&args.database_url, &StartupRetry::default())
        .await
        .context("request ledger unreachable, giving up")?;

    let state = AppState {
        ledger: Arc::new(PostgresLedgerRepository::new(pool.clone())),
        artifacts: Arc::new(PostgresArtifactRepository::new(pool.clone())),
        nodes: Arc::new(PostgresNodeRegistry::new(pool)),
    };

    let app = build_app(state);
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(addr = %addr, "intake/export api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
