use std::time::Duration;

use async_trait::async_trait;
use downlink_model::{DispatchRequest, ManifestEntry};
use tracing::debug;

use super::NodeTransport;
use crate::config::NodeEndpoints;
use crate::error::{CoreError, Result};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `NodeTransport` over HTTP/JSON with a shared connection pool.
#[derive(Clone, Debug)]
pub struct HttpNodeTransport {
    client: reqwest::Client,
}

impl HttpNodeTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn ensure_success(response: &reqwest::Response, what: &str) -> Result<()> {
    let status = response.status();
    if !status.is_success() {
        return Err(CoreError::Transport(format!(
            "{what} returned {status} from {}",
            response.url()
        )));
    }
    Ok(())
}

#[async_trait]
impl NodeTransport for HttpNodeTransport {
    async fn dispatch(&self, node: &NodeEndpoints, request: &DispatchRequest) -> Result<()> {
        let response = self
            .client
            .post(node.dispatch_url.clone())
            .json(&request.to_command())
            .send()
            .await?;
        ensure_success(&response, "dispatch")?;
        debug!(target = %node.target_id, request = %request.id, "dispatch accepted");
        Ok(())
    }

    async fn drain_manifest(&self, node: &NodeEndpoints) -> Result<Vec<ManifestEntry>> {
        let response = self.client.get(node.manifest_url.clone()).send().await?;
        ensure_success(&response, "manifest drain")?;
        let entries = response.json::<Vec<ManifestEntry>>().await?;
        debug!(target = %node.target_id, entries = entries.len(), "manifest drained");
        Ok(entries)
    }

    async fn fetch_artifact(&self, node: &NodeEndpoints, filename: &str) -> Result<Vec<u8>> {
        let url = node.image_url(filename)?;
        let response = self.client.get(url).send().await?;
        ensure_success(&response, "artifact fetch")?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}
