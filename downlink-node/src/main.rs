use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use downlink_model::NodeId;
use downlink_node::{
    create_router,
    manifest::Manifest,
    source::RemoteImageSource,
    state::AppState,
};

/// Public imagery used when no source pool is configured.
const DEFAULT_SOURCE_URLS: &[&str] = &[
    "https://www.nasa.gov/wp-content/uploads/static/history/alsj/a11/a11det38937.jpg",
    "https://www.nasa.gov/wp-content/uploads/static/history/alsj/a12/ap12-KSC-69PC-672.jpg",
    "https://www.nasa.gov/wp-content/uploads/static/history/alsj/a12/ap12-S69-59475.jpg",
    "https://www.nasa.gov/wp-content/uploads/static/history/alsj/a12/ap12-S69-58564.jpg",
    "https://www.nasa.gov/wp-content/uploads/static/history/alsj/a12/ap12-S69-58884.jpg",
];

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "downlink-node")]
#[command(about = "Capture node simulator for the Downlink tasking platform")]
struct Cli {
    /// Node identity announced in manifest entries
    #[arg(long, env = "NODE_TARGET_ID")]
    target_id: String,

    /// Bind host
    #[arg(long, env = "NODE_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Bind port
    #[arg(short, long, env = "NODE_PORT", default_value_t = 3001)]
    port: u16,

    /// Directory produced images are persisted into
    #[arg(long, env = "NODE_IMAGE_DIR", default_value = "images")]
    image_dir: PathBuf,

    /// Comma-separated pool of source image URLs to "photograph"
    #[arg(long, env = "NODE_SOURCE_URLS", value_delimiter = ',')]
    source_urls: Vec<Url>,

    /// Maximum entries pending collection before captures are refused
    #[arg(long, env = "NODE_MANIFEST_CAPACITY", default_value_t = 1024)]
    manifest_capacity: usize,
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

    let target_id =
        NodeId::new(cli.target_id.clone()).context("invalid --target-id")?;

    std::fs::create_dir_all(&cli.image_dir).with_context(|| {
        format!("failed to create image directory {}", cli.image_dir.display())
    })?;

    let sources: Vec<Url> = if cli.source_urls.is_empty() {
        DEFAULT_SOURCE_URLS
            .iter()
            .map(|raw| Url::parse(raw).expect("default source urls are valid"))
            .collect()
    } else {
        cli.source_urls.clone()
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("failed to build http client")?;
    let source = RemoteImageSource::new(client, sources)?;

    let state = AppState {
        target_id: target_id.clone(),
        manifest: Arc::new(Manifest::new(cli.manifest_capacity)),
        source: Arc::new(source),
        image_dir: cli.image_dir.clone(),
    };

    let app = create_router(state);
    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        target = %target_id,
        addr = %addr,
        image_dir = %cli.image_dir.display(),
        "capture node listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
