use std::fmt;
use std::sync::Arc;

use downlink_core::{ArtifactRepository, LedgerRepository, NodeRegistry};

/// Shared handles behind every intake/export handler.
///
/// Repositories are held as trait objects so the HTTP surface can be
/// exercised against in-memory implementations in tests.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn LedgerRepository>,
    pub artifacts: Arc<dyn ArtifactRepository>,
    pub nodes: Arc<dyn NodeRegistry>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
