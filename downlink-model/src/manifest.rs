use chrono::{DateTime, Utc};

use crate::ids::{NodeId, RequestId};

/// One produced-but-not-yet-collected capture, as held in a node's manifest.
///
/// Entries exist only in the capture node's memory between capture completion
/// and the next drain. A node crash before the drain loses every pending
/// entry; that loss is accepted, not masked.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ManifestEntry {
    pub request_id: RequestId,
    pub target_id: NodeId,
    pub filename: String,
    pub updated_at: DateTime<Utc>,
}
