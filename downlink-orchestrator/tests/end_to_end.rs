//! Full tasking round trip over real HTTP: ledger claim, dispatch to a
//! live capture node, manifest drain, byte fetch, artifact insert.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tempfile::TempDir;
use url::Url;

use downlink_core::{
    ArtifactRepository, HttpNodeTransport, LedgerRepository, NodeEndpoints, Orchestrator,
    OrchestratorConfig, Result,
};
use downlink_model::{
    Artifact, ArtifactId, ArtifactRecord, DispatchRequest, ExportFilter, NewArtifact,
    NewDispatchRequest, NodeId, RequestId,
};
use downlink_node::{create_router, manifest::Manifest, source::ImageSource, state::AppState};

const JPEG_STUB: &[u8] = &[0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10];

struct CannedSource;

#[async_trait]
impl ImageSource for CannedSource {
    async fn acquire(&self) -> anyhow::Result<Vec<u8>> {
        Ok(JPEG_STUB.to_vec())
    }
}

struct FakeLedger {
    rows: Mutex<Vec<DispatchRequest>>,
    next_id: AtomicI64,
}

impl FakeLedger {
    fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl LedgerRepository for FakeLedger {
    async fn insert_request(&self, request: NewDispatchRequest) -> Result<DispatchRequest> {
        let now = Utc::now();
        let row = DispatchRequest {
            id: RequestId(self.next_id.fetch_add(1, Ordering::SeqCst)),
            target_id: request.target_id,
            interval: request.interval,
            scheduled_time: request.scheduled_time,
            cycles: request.cycles,
            seen: false,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().push(row.clone());
        Ok(row)
    }

    async fn claim_unseen(&self) -> Result<Vec<DispatchRequest>> {
        let mut rows = self.rows.lock();
        let mut claimed = Vec::new();
        for row in rows.iter_mut().filter(|row| !row.seen) {
            row.seen = true;
            row.updated_at = Utc::now();
            claimed.push(row.clone());
        }
        Ok(claimed)
    }

    async fn get_request(&self, id: RequestId) -> Result<Option<DispatchRequest>> {
        Ok(self.rows.lock().iter().find(|row| row.id == id).cloned())
    }

    async fn count_unseen(&self) -> Result<i64> {
        Ok(self.rows.lock().iter().filter(|row| !row.seen).count() as i64)
    }
}

#[derive(Default)]
struct RecordingArtifacts {
    rows: Mutex<Vec<Artifact>>,
    next_id: AtomicI64,
}

#[async_trait]
impl ArtifactRepository for RecordingArtifacts {
    async fn insert_artifact(&self, artifact: NewArtifact) -> Result<ArtifactRecord> {
        let id = ArtifactId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let row = Artifact {
            id,
            request_id: artifact.request_id,
            target_id: artifact.target_id,
            request_timestamp: artifact.request_timestamp,
            filename: artifact.filename,
            data: artifact.data,
            seen: false,
        };
        let record = ArtifactRecord {
            id: row.id,
            request_id: row.request_id,
            target_id: row.target_id.clone(),
            request_timestamp: row.request_timestamp,
            filename: row.filename.clone(),
            seen: row.seen,
            created_at: Utc::now(),
        };
        self.rows.lock().push(row);
        Ok(record)
    }

    async fn query(&self, _filter: &ExportFilter) -> Result<Vec<Artifact>> {
        Ok(self.rows.lock().clone())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.rows.lock().len() as i64)
    }
}

/// Serve a capture node on an ephemeral port; the listener is bound before
/// returning, so requests never race the accept loop.
async fn spawn_node(image_dir: &TempDir) -> (SocketAddr, Arc<Manifest>) {
    let manifest = Arc::new(Manifest::new(16));
    let state = AppState {
        target_id: NodeId::new("sat1").unwrap(),
        manifest: Arc::clone(&manifest),
        source: Arc::new(CannedSource),
        image_dir: image_dir.path().to_path_buf(),
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (addr, manifest)
}

fn orchestrator_for(
    addr: SocketAddr,
    ledger: Arc<FakeLedger>,
    artifacts: Arc<RecordingArtifacts>,
) -> Orchestrator {
    let base = Url::parse(&format!("http://{addr}")).unwrap();
    let node = NodeEndpoints::from_base(NodeId::new("sat1").unwrap(), &base).unwrap();
    Orchestrator::new(
        ledger,
        artifacts,
        Arc::new(HttpNodeTransport::new().unwrap()),
        OrchestratorConfig {
            cycle: std::time::Duration::from_millis(50),
            skip: 0,
            ingest_concurrency: 4,
            nodes: vec![node],
        },
    )
}

fn tasking(target: &str) -> NewDispatchRequest {
    NewDispatchRequest {
        target_id: NodeId::new(target).unwrap(),
        interval: 0,
        scheduled_time: None,
        cycles: 0,
    }
}

#[tokio::test]
async fn tasking_round_trip_produces_one_artifact() {
    let image_dir = TempDir::new().unwrap();
    let (addr, manifest) = spawn_node(&image_dir).await;

    let ledger = Arc::new(FakeLedger::new());
    let artifacts = Arc::new(RecordingArtifacts::default());
    let orchestrator = orchestrator_for(addr, Arc::clone(&ledger), Arc::clone(&artifacts));

    let inserted = ledger.insert_request(tasking("sat1")).await.unwrap();

    // Cycle one: claim and dispatch. The node captures synchronously, so
    // its manifest holds the entry by the time the call returns.
    let summary = orchestrator.dispatch_cycle().await.unwrap();
    assert_eq!(summary.claimed, 1);
    assert_eq!(summary.dispatched, 1);
    assert_eq!(manifest.len(), 1);
    assert!(ledger.get_request(inserted.id).await.unwrap().unwrap().seen);

    // Ingestion-gated cycle: drain, fetch, store.
    let stats = orchestrator.ingestion_pass().await;
    assert_eq!(stats.drained, 1);
    assert_eq!(stats.stored, 1);
    assert_eq!(stats.lost, 0);
    assert!(manifest.is_empty());

    let stored = artifacts.rows.lock();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].request_id, inserted.id);
    assert_eq!(stored[0].data, JPEG_STUB);
    assert!(stored[0].filename.starts_with("image_1_sat1_"));

    // Nothing left to claim or collect.
    drop(stored);
    assert_eq!(orchestrator.dispatch_cycle().await.unwrap().claimed, 0);
    let quiet = orchestrator.ingestion_pass().await;
    assert_eq!(quiet.drained, 0);
}

#[tokio::test]
async fn same_target_batch_is_collected_by_a_single_drain() {
    let image_dir = TempDir::new().unwrap();
    let (addr, manifest) = spawn_node(&image_dir).await;

    let ledger = Arc::new(FakeLedger::new());
    let artifacts = Arc::new(RecordingArtifacts::default());
    let orchestrator = orchestrator_for(addr, Arc::clone(&ledger), Arc::clone(&artifacts));

    ledger.insert_request(tasking("sat1")).await.unwrap();
    ledger.insert_request(tasking("sat1")).await.unwrap();

    let summary = orchestrator.dispatch_cycle().await.unwrap();
    assert_eq!(summary.claimed, 2);
    assert_eq!(summary.dispatched, 2);
    assert_eq!(manifest.len(), 2);

    let stats = orchestrator.ingestion_pass().await;
    assert_eq!(stats.drained, 2);
    assert_eq!(stats.stored, 2);
    assert!(manifest.is_empty());
    assert_eq!(artifacts.count().await.unwrap(), 2);
}
