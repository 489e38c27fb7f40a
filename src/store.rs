// SPDX-License-Identifier: Apache-2.0
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::prospect::Prospect;

/// Errors raised while reading or writing prospect records
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt prospect file {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("prospect store lock poisoned")]
    Poisoned,
}

/// Load/save capability over the full list of prospects.
///
/// Implementations do no locking of their own. Callers that read, modify and
/// write back must serialise those steps themselves (see `ProspectRegistry`).
pub trait ProspectStore: Send + Sync {
    fn load(&self) -> Result<Vec<Prospect>, StoreError>;
    fn save(&self, prospects: &[Prospect]) -> Result<(), StoreError>;
}

/// Prospects kept as a pretty-printed JSON array in a single file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Opens the store, creating the parent directory and an empty `[]` file if needed
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        if !path.exists() {
            info!("Creating empty prospect file at {}", path.display());
            fs::write(&path, b"[]").map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
        }

        Ok(Self { path })
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + use<> {
    let path = path.to_path_buf();
    move |source| StoreError::Io { path, source }
}

/// Writes `tmp`, flushes it and renames it over `target`.
///
/// Rename is atomic on the same filesystem, so readers never see a half-written array.
fn write_and_swap(tmp: &Path, target: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut file = fs::File::create(tmp).map_err(io_err(tmp))?;
    file.write_all(bytes).map_err(io_err(tmp))?;
    file.sync_all().map_err(io_err(tmp))?;
    drop(file);

    fs::rename(tmp, target).map_err(io_err(target))
}

impl ProspectStore for JsonFileStore {
    fn load(&self) -> Result<Vec<Prospect>, StoreError> {
        let text = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        // A truncated bootstrap is treated like a fresh file
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let prospects: Vec<Prospect> =
            serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        debug!(count = prospects.len(), "Loaded prospects");
        Ok(prospects)
    }

    fn save(&self, prospects: &[Prospect]) -> Result<(), StoreError> {
        let tmp = self.temp_path();
        let json = serde_json::to_vec_pretty(prospects).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        if let Err(e) = write_and_swap(&tmp, &self.path, &json) {
            // Never leave a stale temp file next to the real one
            match fs::remove_file(&tmp) {
                Err(cleanup) if cleanup.kind() != std::io::ErrorKind::NotFound => {
                    warn!(path = %tmp.display(), error = %cleanup, "Failed to remove temp file");
                }
                _ => {}
            }
            return Err(e);
        }
        debug!(count = prospects.len(), "Saved prospects");
        Ok(())
    }
}
