//! Load-once cache for normalized datasets.
//!
//! Entries are keyed by the source's identity (canonical path, modification
//! time and length), so an edited file is reloaded on the next lookup while an
//! unchanged one is served from memory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

use tracing::{debug, info};

use crate::dataset::CrowdingDataset;
use crate::encoding::TextEncoding;
use crate::error::LoadError;
use crate::normalize::load_dataset;

/// Identity of a source file at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceIdentity {
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl SourceIdentity {
    /// Reads the identity of `path` from the filesystem.
    ///
    /// # Errors
    ///
    /// [`LoadError::NotFound`] if the file is absent.
    pub fn of(path: &Path) -> Result<Self, LoadError> {
        let canonical = std::fs::canonicalize(path).map_err(|e| not_found_or_io(path, e))?;
        let metadata = std::fs::metadata(&canonical).map_err(|e| not_found_or_io(path, e))?;
        Ok(Self {
            path: canonical,
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

fn not_found_or_io(path: &Path, e: std::io::Error) -> LoadError {
    match e.kind() {
        std::io::ErrorKind::NotFound => LoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::Io(e),
    }
}

/// Compute-if-absent store of datasets by [`SourceIdentity`].
///
/// Loads happen under the lock, so each identity is loaded at most once even
/// when the cache is shared between threads. Failed loads are not cached.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: Mutex<HashMap<PathBuf, (SourceIdentity, Arc<CrowdingDataset>)>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached dataset for `path`, loading it if the file is new or
    /// has changed since it was cached.
    pub fn get_or_load(
        &self,
        path: &Path,
        encodings: &[TextEncoding],
    ) -> Result<Arc<CrowdingDataset>, LoadError> {
        let identity = SourceIdentity::of(path)?;
        let mut entries = self.lock();

        if let Some((cached, dataset)) = entries.get(&identity.path) {
            if *cached == identity {
                debug!(path = %identity.path.display(), "Dataset cache hit");
                return Ok(Arc::clone(dataset));
            }
            info!(path = %identity.path.display(), "Source changed, reloading dataset");
        }

        let dataset = Arc::new(load_dataset(&identity.path, encodings)?);
        entries.insert(identity.path.clone(), (identity, Arc::clone(&dataset)));
        Ok(dataset)
    }

    /// Drops the entry for `path`. Returns whether one existed.
    pub fn invalidate(&self, path: &Path) -> bool {
        let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        self.lock().remove(&key).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, (SourceIdentity, Arc<CrowdingDataset>)>> {
        // A panic while loading leaves the map itself consistent.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
