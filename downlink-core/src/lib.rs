//! # Downlink Core
//!
//! Orchestration runtime for the Downlink tasking platform.
//!
//! ## Overview
//!
//! This crate carries everything the orchestrator process and the HTTP
//! surfaces share:
//!
//! - **Orchestrator runtime**: the claim/dispatch cycle and the
//!   ingestion-gated manifest harvest, driven as two periodic tasks under a
//!   shared cancellation token
//! - **Storage**: Postgres repositories for the request ledger, the artifact
//!   store, and the capture-node registry, plus versioned migrations
//! - **Transport**: the HTTP client contract against capture nodes
//!   (dispatch, atomic manifest drain, static byte fetch)
//! - **Configuration**: endpoint and timing settings shared by the binaries

pub mod config;
pub mod database;
pub mod error;
pub mod node;
pub mod orchestrator;

pub use config::{NodeEndpoints, OrchestratorConfig, StartupRetry};
pub use database::{
    ArtifactRepository, LedgerRepository, NodeRegistry, PostgresArtifactRepository,
    PostgresLedgerRepository, PostgresNodeRegistry, connect_with_retry,
};
pub use error::{CoreError, Result};
pub use node::{HttpNodeTransport, NodeTransport};
pub use orchestrator::{DispatchSummary, IngestionStats, Orchestrator};

/// Versioned schema migrations, applied explicitly via the server's
/// `db migrate` subcommand and by `#[sqlx::test]` suites. Never run
/// implicitly at process startup.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
