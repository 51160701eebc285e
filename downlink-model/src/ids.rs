use crate::error::ModelError;

/// Ledger-assigned identifier for a dispatch request.
///
/// Assigned by the ledger's sequence, so later requests always carry larger
/// ids. Doubles as the handle a client uses to track its request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
pub struct RequestId(pub i64);

impl RequestId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for RequestId {
    fn from(id: i64) -> Self {
        RequestId(id)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned identifier for a persisted artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
pub struct ArtifactId(pub i64);

impl ArtifactId {
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ArtifactId {
    fn from(id: i64) -> Self {
        ArtifactId(id)
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registered identity of a capture node, chosen by the operator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
pub struct NodeId(pub String);

impl NodeId {
    /// Validating constructor: node ids travel inside filenames and URL
    /// paths, so they must be non-empty and free of path separators.
    pub fn new(id: impl Into<String>) -> Result<Self, ModelError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ModelError::InvalidNodeId("must not be empty".into()));
        }
        if id.contains(['/', '\\', '_']) {
            return Err(ModelError::InvalidNodeId(format!(
                "'{id}' contains a reserved character"
            )));
        }
        Ok(NodeId(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
