use chrono::{DateTime, Utc};

use crate::ids::{ArtifactId, NodeId, RequestId};

/// A durably stored captured image with its metadata and raw bytes.
///
/// Exactly one artifact is created per successfully ingested manifest entry
/// and it is immutable thereafter; the core never deletes the row.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub id: ArtifactId,
    pub request_id: RequestId,
    pub target_id: NodeId,
    pub request_timestamp: DateTime<Utc>,
    pub filename: String,
    pub data: Vec<u8>,
    /// Reserved; ingestion never reads or writes it.
    pub seen: bool,
}

/// Artifact metadata without the image bytes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ArtifactRecord {
    pub id: ArtifactId,
    pub request_id: RequestId,
    pub target_id: NodeId,
    pub request_timestamp: DateTime<Utc>,
    pub filename: String,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a freshly ingested artifact.
#[derive(Debug, Clone)]
pub struct NewArtifact {
    pub request_id: RequestId,
    pub target_id: NodeId,
    pub request_timestamp: DateTime<Utc>,
    pub filename: String,
    pub data: Vec<u8>,
}
