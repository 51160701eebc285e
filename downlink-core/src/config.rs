use std::time::Duration;

use downlink_model::NodeId;
use url::Url;

use crate::error::{CoreError, Result};

/// Resolved endpoint set for one capture node.
///
/// All three endpoints derive from a single base URL; the split mirrors the
/// wire contract (dispatch, manifest drain, static images) so the transport
/// never has to re-derive paths.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeEndpoints {
    pub target_id: NodeId,
    pub dispatch_url: Url,
    pub manifest_url: Url,
    pub images_url: Url,
}

impl NodeEndpoints {
    pub fn from_base(target_id: NodeId, base: &Url) -> Result<Self> {
        let mut base = base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            target_id,
            dispatch_url: base.join("capture")?,
            manifest_url: base.join("manifest")?,
            images_url: base.join("images/")?,
        })
    }

    /// Static-content URL for one produced file.
    pub fn image_url(&self, filename: &str) -> Result<Url> {
        Ok(self.images_url.join(filename)?)
    }
}

/// Timing and fleet settings for the orchestrator runtime.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Cycle period `T`; both periodic tasks tick at this rate.
    pub cycle: Duration,
    /// Dispatch-only cycles between ingestion passes. Zero ingests every
    /// cycle.
    pub skip: u32,
    /// Upper bound on concurrent per-entry fetch/insert work within one
    /// ingestion pass.
    pub ingest_concurrency: usize,
    pub nodes: Vec<NodeEndpoints>,
}

impl OrchestratorConfig {
    pub fn node(&self, target_id: &NodeId) -> Option<&NodeEndpoints> {
        self.nodes.iter().find(|node| &node.target_id == target_id)
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            cycle: Duration::from_secs(10),
            skip: 2,
            ingest_concurrency: 8,
            nodes: Vec::new(),
        }
    }
}

/// Startup connection policy: bounded fixed-backoff retry, then fatal.
#[derive(Debug, Clone)]
pub struct StartupRetry {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for StartupRetry {
    fn default() -> Self {
        Self {
            attempts: 5,
            backoff: Duration::from_secs(7),
        }
    }
}

/// Parse a fleet specification of the form
/// `sat1=http://localhost:3001,sat2=http://localhost:3002`.
pub fn parse_node_specs(raw: &str) -> Result<Vec<NodeEndpoints>> {
    let mut nodes = Vec::new();
    for spec in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (id, base) = spec.split_once('=').ok_or_else(|| {
            CoreError::InvalidInput(format!("node spec '{spec}' is not of the form id=baseUrl"))
        })?;
        let target_id = NodeId::new(id.trim())?;
        let base = Url::parse(base.trim())?;
        nodes.push(NodeEndpoints::from_base(target_id, &base)?);
    }
    if nodes.is_empty() {
        return Err(CoreError::InvalidInput(
            "node specification resolved to an empty fleet".into(),
        ));
    }
    Ok(nodes)
}
