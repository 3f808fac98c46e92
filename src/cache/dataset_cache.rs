use crate::error::{AqError, Result};
use crate::processors::{DatasetPreparer, PreparedDataset};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;
use tracing::{debug, info};

/// Identity of a source file's contents as seen by the filesystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSignature {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl SourceSignature {
    pub fn read(path: &Path) -> Result<Self> {
        let metadata = fs::metadata(path)
            .map_err(|e| AqError::data_unavailable(path, e.to_string()))?;

        Ok(Self {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

struct CacheEntry {
    signature: SourceSignature,
    dataset: Arc<PreparedDataset>,
}

/// Prepared datasets keyed by canonical source path.
///
/// An entry is reused while the file's signature is unchanged. A failed load
/// never leaves an entry behind, including a stale one for the same path.
pub struct DatasetCache {
    preparer: DatasetPreparer,
    entries: Mutex<HashMap<PathBuf, CacheEntry>>,
}

impl DatasetCache {
    pub fn new(preparer: DatasetPreparer) -> Self {
        Self {
            preparer,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<PathBuf, CacheEntry>>> {
        self.entries.lock().map_err(|_| AqError::CachePoisoned)
    }

    fn key(path: &Path) -> Result<PathBuf> {
        fs::canonicalize(path).map_err(|e| AqError::data_unavailable(path, e.to_string()))
    }

    /// Cached dataset for `path`, loading it on first use or after the file changed
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<PreparedDataset>> {
        let key = Self::key(path)?;
        let signature = SourceSignature::read(&key)?;

        {
            let entries = self.lock()?;
            if let Some(entry) = entries.get(&key) {
                if entry.signature == signature {
                    debug!(path = %key.display(), "dataset cache hit");
                    return Ok(Arc::clone(&entry.dataset));
                }
                info!(path = %key.display(), "source changed, reloading");
            }
        }

        // Load outside the lock
        match self.preparer.load(&key) {
            Ok(dataset) => {
                let dataset = Arc::new(dataset);
                self.lock()?.insert(
                    key,
                    CacheEntry {
                        signature,
                        dataset: Arc::clone(&dataset),
                    },
                );
                Ok(dataset)
            }
            Err(e) => {
                self.lock()?.remove(&key);
                Err(e)
            }
        }
    }

    /// Cached dataset without loading. `None` when absent or when the file
    /// changed since it was loaded.
    pub fn get(&self, path: &Path) -> Option<Arc<PreparedDataset>> {
        let key = Self::key(path).ok()?;
        let signature = SourceSignature::read(&key).ok()?;
        let entries = self.lock().ok()?;
        entries
            .get(&key)
            .filter(|e| e.signature == signature)
            .map(|e| Arc::clone(&e.dataset))
    }

    pub fn invalidate(&self, path: &Path) -> Result<bool> {
        let key = Self::key(path)?;
        let removed = self.lock()?.remove(&key).is_some();
        if removed {
            debug!(path = %key.display(), "dataset cache entry invalidated");
        }
        Ok(removed)
    }

    pub fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::new(DatasetPreparer::new())
    }
}
