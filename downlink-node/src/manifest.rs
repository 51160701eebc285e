use parking_lot::Mutex;
use thiserror::Error;

use downlink_model::ManifestEntry;

/// The node's transient record of produced-but-not-yet-collected captures.
///
/// A bounded queue with an atomic take-all: `drain` swaps the backing
/// buffer out under the mutex, so an append racing a drain lands in exactly
/// one of this drain or the next — never both, never neither. Entries live
/// only here until collected; a process crash loses them.
#[derive(Debug)]
pub struct Manifest {
    entries: Mutex<Vec<ManifestEntry>>,
    capacity: usize,
}

/// Appends are rejected once the collector has fallen this far behind.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("manifest at capacity ({0} entries pending collection)")]
pub struct ManifestFull(pub usize);

impl Manifest {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            capacity,
        }
    }

    pub fn append(&self, entry: ManifestEntry) -> Result<(), ManifestFull> {
        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity {
            return Err(ManifestFull(self.capacity));
        }
        entries.push(entry);
        Ok(())
    }

    /// Read and clear in one step. Insertion order is preserved.
    pub fn drain(&self) -> Vec<ManifestEntry> {
        std::mem::take(&mut *self.entries.lock())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
