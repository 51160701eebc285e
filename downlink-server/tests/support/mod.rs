#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Utc;
use parking_lot::Mutex;

use downlink_core::{ArtifactRepository, CoreError, LedgerRepository, NodeRegistry, Result};
use downlink_model::{
    Artifact, ArtifactId, ArtifactRecord, CaptureNodeRecord, DispatchRequest, ExportFilter,
    NewArtifact, NewDispatchRequest, NodeId, RequestId,
};
use downlink_server::{AppState, build_app};

/// Ledger double with the same claim semantics as the Postgres
/// implementation: flip-before-return, id order, no reverse path.
pub struct InMemoryLedger {
    rows: Mutex<Vec<DispatchRequest>>,
    next_id: AtomicI64,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl LedgerRepository for InMemoryLedger {
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

pub struct InMemoryArtifacts {
    rows: Mutex<Vec<Artifact>>,
    next_id: AtomicI64,
}

impl InMemoryArtifacts {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn stored(&self) -> usize {
        self.rows.lock().len()
    }
}

#[async_trait]
impl ArtifactRepository for InMemoryArtifacts {
    async fn insert_artifact(&self, artifact: NewArtifact) -> Result<ArtifactRecord> {
        let row = Artifact {
            id: ArtifactId(self.next_id.fetch_add(1, Ordering::SeqCst)),
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

    async fn query(&self, filter: &ExportFilter) -> Result<Vec<Artifact>> {
        let rows = self.rows.lock();
        Ok(rows
            .iter()
            .filter(|row| {
                filter
                    .request_timestamp_start
                    .is_none_or(|start| row.request_timestamp >= start)
                    && filter
                        .request_timestamp_end
                        .is_none_or(|end| row.request_timestamp <= end)
                    && filter.request_id_start.is_none_or(|start| row.request_id >= start)
                    && filter.request_id_end.is_none_or(|end| row.request_id <= end)
                    && filter
                        .target_id
                        .as_ref()
                        .is_none_or(|target| &row.target_id == target)
            })
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.rows.lock().len() as i64)
    }
}

#[derive(Default)]
pub struct InMemoryRegistry {
    rows: Mutex<Vec<CaptureNodeRecord>>,
}

#[async_trait]
impl NodeRegistry for InMemoryRegistry {
    async fn register(&self, id: &NodeId, client: &str) -> Result<CaptureNodeRecord> {
        let mut rows = self.rows.lock();
        if rows.iter().any(|row| &row.id == id) {
            return Err(CoreError::Conflict(format!(
                "capture node '{id}' already exists"
            )));
        }
        let record = CaptureNodeRecord {
            id: id.clone(),
            client: client.to_string(),
            registered_at: Utc::now(),
        };
        rows.push(record.clone());
        Ok(record)
    }

    async fn exists(&self, id: &NodeId) -> Result<bool> {
        Ok(self.rows.lock().iter().any(|row| &row.id == id))
    }

    async fn list(&self) -> Result<Vec<CaptureNodeRecord>> {
        Ok(self.rows.lock().clone())
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub ledger: Arc<InMemoryLedger>,
    pub artifacts: Arc<InMemoryArtifacts>,
    pub registry: Arc<InMemoryRegistry>,
}

pub fn build_test_app() -> TestApp {
    let ledger = Arc::new(InMemoryLedger::new());
    let artifacts = Arc::new(InMemoryArtifacts::new());
    let registry = Arc::new(InMemoryRegistry::default());

    let state = AppState {
        ledger: Arc::clone(&ledger) as Arc<dyn LedgerRepository>,
        artifacts: Arc::clone(&artifacts) as Arc<dyn ArtifactRepository>,
        nodes: Arc::clone(&registry) as Arc<dyn NodeRegistry>,
    };

    TestApp {
        server: TestServer::new(build_app(state)).unwrap(),
        ledger,
        artifacts,
        registry,
    }
}
