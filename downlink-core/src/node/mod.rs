//! Client-side contract against capture nodes.

mod http;

pub use http::HttpNodeTransport;

use async_trait::async_trait;
use downlink_model::{DispatchRequest, ManifestEntry};

use crate::config::NodeEndpoints;
use crate::error::Result;

/// Remote operations the orchestrator performs against one capture node.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NodeTransport: Send + Sync {
    /// Forward a claimed request to its node. The node acquires one image,
    /// persists it, and appends a manifest entry before responding.
    async fn dispatch(&self, node: &NodeEndpoints, request: &DispatchRequest) -> Result<()>;

    /// Read and clear the node's manifest in one remote call. From this
    /// side the operation is atomic: an entry is returned by exactly one
    /// drain, and once this call succeeds the node holds no copy of the
    /// returned entries.
    async fn drain_manifest(&self, node: &NodeEndpoints) -> Result<Vec<ManifestEntry>>;

    /// Fetch the raw bytes of one produced file from the node's static
    /// content endpoint.
    async fn fetch_artifact(&self, node: &NodeEndpoints, filename: &str) -> Result<Vec<u8>>;
}
