//! The orchestration runtime: a periodic claim/dispatch cycle and a
//! lower-frequency ingestion pass that harvests capture manifests into the
//! artifact store.
//!
//! Both concerns run as independent periodic tasks under one shared
//! cancellation token rather than a single loop multiplexing them through
//! ad-hoc state. The runtime keeps no persisted checkpoint: on restart it
//! simply resumes claiming the ledger's current unseen set.


use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use downlink_model::{ManifestEntry, NewArtifact};

use crate::config::{NodeEndpoints, OrchestratorConfig};
use crate::database::{ArtifactRepository, LedgerRepository};
use crate::error::Result;
use crate::node::NodeTransport;

/// Decides which cycles run an ingestion pass.
///
/// `tick()` returns true on the tick where the counter has reached `skip`
/// (a non-strict `>=` comparison) and resets it, so exactly `skip`
/// dispatch-only cycles separate consecutive passes. `skip = 0` ingests on
/// every tick; the first pass of a fresh runtime happens after `skip`
/// dispatch-only ticks.
#[derive(Debug)]
struct IngestGate {
    skip: u32,
    cycles_since: u32,
}

impl IngestGate {
    fn new(skip: u32) -> Self {
        Self {
            skip,
            cycles_since: 0,
        }
    }

    fn tick(&mut self) -> bool {
        if self.cycles_since >= self.skip {
            self.cycles_since = 0;
            true
        } else {
            self.cycles_since += 1;
            false
        }
    }
}

/// Outcome of one claim/dispatch cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Requests claimed from the ledger this cycle (seen flipped to true).
    pub claimed: usize,
    /// Claimed requests a node accepted. The difference is abandoned.
    pub dispatched: usize,
}

/// Outcome of one ingestion pass across the whole fleet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestionStats {
    /// Nodes whose drain call failed outright (their manifests are intact).
    pub failed_nodes: usize,
    /// Entries returned by successful drains. Each is now gone from its
    /// node and either becomes an artifact or is lost.
    pub drained: usize,
    pub stored: usize,
    pub lost: usize,
}

/// Single control process coordinating the capture fleet.
pub struct Orchestrator {
    ledger: Arc<dyn LedgerRepository>,
    artifacts: Arc<dyn ArtifactRepository>,
    transport: Arc<dyn NodeTransport>,
    config: OrchestratorConfig,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("shutdown_cancelled", &self.shutdown.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    pub fn new(
        ledger: Arc<dyn LedgerRepository>,
        artifacts: Arc<dyn ArtifactRepository>,
        transport: Arc<dyn NodeTransport>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            ledger,
            artifacts,
            transport,
            config,
            shutdown: CancellationToken::new(),
        }
    }

    /// Token that stops both periodic tasks; cancellation is observed at
    /// the top of every cycle, so no claim is ever left half-applied.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Drive both periodic tasks until the shutdown token fires.
    pub async fn run(self: Arc<Self>) -> Result<()> {
        info!(
            cycle_ms = self.config.cycle.as_millis() as u64,
            skip = self.config.skip,
            fleet = self.config.nodes.len(),
            "orchestrator starting"
        );

        let runtime = Arc::clone(&self);
        let dispatch_task = tokio::spawn(async move { runtime.run_dispatch_cycles().await });

        let runtime = Arc::clone(&self);
        let ingestion_task = tokio::spawn(async move { runtime.run_ingestion_cycles().await });

        let (dispatch, ingestion) = tokio::join!(dispatch_task, ingestion_task);
        if let Err(err) = dispatch {
            error!(error = %err, "dispatch task aborted");
        }
        if let Err(err) = ingestion {
            error!(error = %err, "ingestion task aborted");
        }

        info!("orchestrator stopped");
        Ok(())
    }

    async fn run_dispatch_cycles(&self) {
        let mut ticker = interval(self.config.cycle);
        // Dispatch I/O can outlast the cycle; delay rather than burst.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("dispatch task stopping");
                    break;
                }
                _ = ticker.tick() => {
                    match self.dispatch_cycle().await {
                        Ok(summary) if summary.claimed > 0 => {
                            info!(
                                claimed = summary.claimed,
                                dispatched = summary.dispatched,
                                "dispatch cycle complete"
                            );
                        }
                        Ok(_) => debug!("dispatch cycle found no unseen requests"),
                        Err(err) => error!(error = %err, "dispatch cycle failed"),
                    }
                }
            }
        }
    }

    /// One claim/dispatch cycle.
    ///
    /// The claim flips `seen` before any dispatch I/O is attempted, so
    /// delivery is at-most-once: a request whose dispatch fails stays
    /// claimed and is abandoned, never retried.
    pub async fn dispatch_cycle(&self) -> Result<DispatchSummary> {
        let claimed = self.ledger.claim_unseen().await?;
        if claimed.is_empty() {
            return Ok(DispatchSummary::default());
        }

        let mut summary = DispatchSummary {
            claimed: claimed.len(),
            dispatched: 0,
        };

        for request in &claimed {
            let Some(node) = self.config.node(&request.target_id) else {
                warn!(
                    request = %request.id,
                    target = %request.target_id,
                    "no endpoints configured for target, request abandoned"
                );
                continue;
            };

            match self.transport.dispatch(node, request).await {
                Ok(()) => summary.dispatched += 1,
                Err(err) => {
                    warn!(
                        request = %request.id,
                        target = %request.target_id,
                        error = %err,
                        "dispatch failed, request abandoned"
                    );
                }
            }
        }

        Ok(summary)
    }

    async fn run_ingestion_cycles(&self) {
        let mut ticker = interval(self.config.cycle);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut gate = IngestGate::new(self.config.skip);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("ingestion task stopping");
                    break;
                }
                _ = ticker.tick() => {
                    if !gate.tick() {
                        continue;
                    }
                    let stats = self.ingestion_pass().await;
                    if stats.drained > 0 || stats.failed_nodes > 0 {
                        info!(
                            drained = stats.drained,
                            stored = stats.stored,
                            lost = stats.lost,
                            failed_nodes = stats.failed_nodes,
                            "ingestion pass complete"
                        );
                    } else {
                        debug!("ingestion pass found nothing to collect");
                    }
                }
            }
        }
    }

    /// Drain every node's manifest and materialize the entries as
    /// artifacts.
    ///
    /// The per-entry fan-out is bounded and fully awaited: the pass returns
    /// only after every tracked entry has resolved, so consecutive passes
    /// never overlap and no progress depends on untracked background work.
    pub async fn ingestion_pass(&self) -> IngestionStats {
        let mut stats = IngestionStats::default();
        let concurrency = self.config.ingest_concurrency.max(1);

        for node in &self.config.nodes {
            let entries = match self.transport.drain_manifest(node).await {
                Ok(entries) => entries,
                Err(err) => {
                    error!(
                        target = %node.target_id,
                        error = %err,
                        "manifest drain failed, node skipped this pass"
                    );
                    stats.failed_nodes += 1;
                    continue;
                }
            };

            // The node no longer holds these entries; any failure from here
            // on is a permanent loss, logged but not retried.
            stats.drained += entries.len();
            let outcomes = stream::iter(entries)
                .map(|entry| self.ingest_entry(node, entry))
                .buffer_unordered(concurrency)
                .collect::<Vec<bool>>()
                .await;

            for stored in outcomes {
                if stored {
                    stats.stored += 1;
                } else {
                    stats.lost += 1;
                }
            }
        }

        stats
    }

    async fn ingest_entry(&self, node: &NodeEndpoints, entry: ManifestEntry) -> bool {
        let data = match self.transport.fetch_artifact(node, &entry.filename).await {
            Ok(data) => data,
            Err(err) => {
                error!(
                    target = %node.target_id,
                    filename = %entry.filename,
                    error = %err,
                    "artifact fetch failed, entry permanently lost"
                );
                return false;
            }
        };

        let artifact = NewArtifact {
            request_id: entry.request_id,
            target_id: entry.target_id,
            request_timestamp: entry.updated_at,
            filename: entry.filename.clone(),
            data,
        };

        match self.artifacts.insert_artifact(artifact).await {
            Ok(record) => {
                info!(
                    artifact = %record.id,
                    request = %record.request_id,
                    filename = %record.filename,
                    "artifact stored"
                );
                true
            }
            Err(err) => {
                error!(
                    filename = %entry.filename,
                    error = %err,
                    "artifact insert failed, entry permanently lost"
                );
                false
            }
        }
    }
}
