use async_trait::async_trait;
use rand::Rng;
use tracing::debug;
use url::Url;

/// How this node "takes a photo".
///
/// The production implementation pulls from a pool of public imagery URLs;
/// tests substitute a canned source. Acquisition is opaque to the
/// orchestrator either way.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn acquire(&self) -> anyhow::Result<Vec<u8>>;
}

/// Fetches a randomly chosen source URL over HTTP.
#[derive(Clone, Debug)]
pub struct RemoteImageSource {
    client: reqwest::Client,
    sources: Vec<Url>,
}

impl RemoteImageSource {
    pub fn new(client: reqwest::Client, sources: Vec<Url>) -> anyhow::Result<Self> {
        anyhow::ensure!(!sources.is_empty(), "image source pool must not be empty");
        Ok(Self { client, sources })
    }
}

#[async_trait]
impl ImageSource for RemoteImageSource {
    async fn acquire(&self) -> anyhow::Result<Vec<u8>> {
        let url = &self.sources[rand::rng().random_range(0..self.sources.len())];
        debug!(%url, "acquiring image");

        let response = self.client.get(url.clone()).send().await?;
        anyhow::ensure!(
            response.status().is_success(),
            "image source {url} returned {}",
            response.status()
        );

        Ok(response.bytes().await?.to_vec())
    }
}
