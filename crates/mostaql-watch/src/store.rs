use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::types::{Baseline, Item};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to access baseline file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Baseline file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to encode baseline: {0}")]
    Encode(#[from] serde_json::Error),
}

/// JSON file holding the last observed project list.
#[derive(Debug, Clone)]
pub struct BaselineStore {
    path: PathBuf,
}

impl BaselineStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no baseline has been written yet. A file that exists
    /// but cannot be read or decoded is an error.
    pub fn load(&self) -> Result<Option<Baseline>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })
    }

    /// Replaces the baseline with `items`, stamped with the current time.
    pub fn save(&self, items: &[Item]) -> Result<Baseline, StoreError> {
        let baseline = Baseline::new(items.to_vec());
        let json = serde_json::to_string_pretty(&baseline)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        log::debug!(
            "Saved {} project(s) to {}",
            baseline.items.len(),
            self.path.display()
        );
        Ok(baseline)
    }
}
