// src/store/lock.rs

//! Advisory lock serializing updates to one target's state files
//!
//! The enabled and masked lists are replaced one after the other. Holding
//! this lock across both replacements keeps two concurrent invocations from
//! interleaving their read-modify-write cycles. Readers do not lock.

use crate::error::{Error, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exclusive lock held for the duration of a state mutation
pub struct StateLock {
    /// Kept open to hold the lock; released on drop
    file: File,
    path: PathBuf,
}

impl StateLock {
    /// Block until the lock for `target_name` in `state_dir` is acquired
    pub fn acquire(state_dir: &Path, target_name: &str) -> Result<Self> {
        let path = state_dir.join(format!(".{}.lock", target_name));

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| Error::persistence(&path, e))?;

        file.lock_exclusive()
            .map_err(|e| Error::persistence(&path, format!("failed to lock: {}", e)))?;

        debug!("Acquired state lock {}", path.display());
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        debug!("Released state lock {}", self.path.display());
    }
}
