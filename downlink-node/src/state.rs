use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use downlink_model::NodeId;

use crate::manifest::Manifest;
use crate::source::ImageSource;

#[derive(Clone)]
pub struct AppState {
    pub target_id: NodeId,
    pub manifest: Arc<Manifest>,
    pub source: Arc<dyn ImageSource>,
    pub image_dir: PathBuf,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("target_id", &self.target_id)
            .field("image_dir", &self.image_dir)
            .field("pending_entries", &self.manifest.len())
            .finish_non_exhaustive()
    }
}
