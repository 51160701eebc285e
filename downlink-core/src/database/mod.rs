//! Storage contracts and their Postgres implementations.
//!
//! The ledger and artifact store are the only shared mutable resources in
//! the system; the orchestrator is the sole writer of the `seen` flag and of
//! artifact rows, so no locking beyond Postgres' own transaction guarantees
//! is required here.

mod artifacts;
mod ledger;
mod nodes;

pub use artifacts::PostgresArtifactRepository;
pub use ledger::PostgresLedgerRepository;
pub use nodes::PostgresNodeRegistry;

use std::time::Duration;

use async_trait::async_trait;
use downlink_model::{
    Artifact, ArtifactRecord, CaptureNodeRecord, DispatchRequest, ExportFilter, NewArtifact,
    NewDispatchRequest, NodeId, RequestId,
};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::{info, warn};

use crate::config::StartupRetry;
use crate::error::{CoreError, Result};

/// Durable append-mostly store of dispatch requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    async fn insert_request(&self, request: NewDispatchRequest) -> Result<DispatchRequest>;

    /// Atomically claim every unseen request: flip `seen` to true and stamp
    /// `updated_at` in the same statement that reads the batch, so a claimed
    /// row can never be re-observed as unclaimed. Claimed rows come back in
    /// ledger-id order.
    async fn claim_unseen(&self) -> Result<Vec<DispatchRequest>>;

    async fn get_request(&self, id: RequestId) -> Result<Option<DispatchRequest>>;

    async fn count_unseen(&self) -> Result<i64>;
}

/// Durable store of captured images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    async fn insert_artifact(&self, artifact: NewArtifact) -> Result<ArtifactRecord>;

    /// Conjunctive optional filters; both range kinds inclusive on both
    /// ends.
    async fn query(&self, filter: &ExportFilter) -> Result<Vec<Artifact>>;

    async fn count(&self) -> Result<i64>;
}

/// Registry of capture-node identities accepted by request intake.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NodeRegistry: Send + Sync {
    async fn register(&self, id: &NodeId, client: &str) -> Result<CaptureNodeRecord>;

    async fn exists(&self, id: &NodeId) -> Result<bool>;

    async fn list(&self) -> Result<Vec<CaptureNodeRecord>>;
}

/// Connect to Postgres with the startup policy: a bounded number of
/// fixed-backoff attempts, then fail fast so the supervisor restarts us.
///
/// Needed because the composed deployment starts every container at once;
/// the store routinely comes up after its dependents.
pub async fn connect_with_retry(database_url: &str, retry: &StartupRetry) -> Result<PgPool> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match PgPoolOptions::new()
            .max_connections(8)
            .acquire_timeout(Duration::from_secs(30))
            .connect(database_url)
            .await
        {
            Ok(pool) => {
                info!(attempt, "database connection established");
                return Ok(pool);
            }
            Err(err) if attempt < retry.attempts => {
                warn!(
                    attempt,
                    max_attempts = retry.attempts,
                    backoff_secs = retry.backoff.as_secs(),
                    error = %err,
                    "database unreachable, retrying"
                );
                tokio::time::sleep(retry.backoff).await;
            }
            Err(err) => {
                return Err(CoreError::Unavailable(format!(
                    "database unreachable after {attempt} attempts: {err}"
                )));
            }
        }
    }
}

/// Map an insert error, surfacing unique-constraint violations as conflicts
/// for the original caller.
pub(crate) fn map_insert_error(err: sqlx::Error, what: &str) -> CoreError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return CoreError::Conflict(format!("{what} already exists"));
    }
    CoreError::Database(err)
}
