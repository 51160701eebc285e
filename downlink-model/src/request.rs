use chrono::{DateTime, Utc};

use crate::ids::{NodeId, RequestId};

/// A tasking request as stored in the ledger.
///
/// Requests are append-mostly: the only mutation a row ever sees is the
/// orchestrator's claim flipping `seen` from false to true, exactly once.
/// Rows are never deleted so the ledger doubles as an audit trail.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DispatchRequest {
    pub id: RequestId,
    pub target_id: NodeId,
    /// Repeat interval between captures. Reserved, currently inert.
    pub interval: i32,
    /// Epoch seconds of a future scheduled capture. Reserved, currently inert.
    pub scheduled_time: Option<i64>,
    /// Number of captures to take. Reserved, currently inert.
    pub cycles: i32,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
    /// Stamped by the claim; flows into the dispatch command and, via the
    /// capture node, into the artifact's `request_timestamp`.
    pub updated_at: DateTime<Utc>,
}

impl DispatchRequest {
    /// Wire form sent to the capture node when this request is dispatched.
    pub fn to_command(&self) -> DispatchCommand {
        DispatchCommand {
            request_id: self.id,
            target_id: self.target_id.clone(),
            updated_at: self.updated_at,
        }
    }
}

/// Intake payload for inserting a new ledger row.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct NewDispatchRequest {
    pub target_id: NodeId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub interval: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub scheduled_time: Option<i64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub cycles: i32,
}

/// The dispatch body POSTed to a capture node's capture endpoint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DispatchCommand {
    pub request_id: RequestId,
    pub target_id: NodeId,
    pub updated_at: DateTime<Utc>,
}

impl DispatchCommand {
    /// Deterministic filename a capture node persists this command's image
    /// under: `image_{requestId}_{targetId}_{updatedAtMillis}.jpg`.
    ///
    /// The timestamp is embedded as epoch milliseconds so the name stays
    /// filesystem- and URL-safe while remaining a pure function of the
    /// command's three fields.
    pub fn filename(&self) -> String {
        format!(
            "image_{}_{}_{}.jpg",
            self.request_id,
            self.target_id,
            self.updated_at.timestamp_millis()
        )
    }
}

/// A registered capture node identity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CaptureNodeRecord {
    pub id: NodeId,
    /// Operator that owns the node.
    pub client: String,
    pub registered_at: DateTime<Utc>,
}
