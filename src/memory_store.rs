// SPDX-License-Identifier: Apache-2.0
use std::sync::{Arc, RwLock};
use tracing::{debug, error};

use crate::prospect::Prospect;
use crate::store::{ProspectStore, StoreError};

/// Prospect store that lives for the process lifetime; used by tests and local demos
#[derive(Debug, Clone, Default)]
pub struct MemoryProspectStore {
    prospects: Arc<RwLock<Vec<Prospect>>>,
}

impl MemoryProspectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with existing records
    pub fn with_prospects(prospects: Vec<Prospect>) -> Self {
        Self {
            prospects: Arc::new(RwLock::new(prospects)),
        }
    }

    /// Copy of the current records, for assertions
    pub fn snapshot(&self) -> Vec<Prospect> {
        self.load().unwrap_or_default()
    }
}

impl ProspectStore for MemoryProspectStore {
    fn load(&self) -> Result<Vec<Prospect>, StoreError> {
        match self.prospects.read() {
            Ok(prospects) => {
                debug!("[MEMORY_STORE - LOAD] {} prospects", prospects.len());
                Ok(prospects.clone())
            }
            Err(e) => {
                error!("Failed to acquire read lock: {}", e);
                Err(StoreError::Poisoned)
            }
        }
    }

    fn save(&self, prospects: &[Prospect]) -> Result<(), StoreError> {
        match self.prospects.write() {
            Ok(mut stored) => {
                *stored = prospects.to_vec();
                debug!("[MEMORY_STORE - SAVE] {} prospects", stored.len());
                Ok(())
            }
            Err(e) => {
                error!("Failed to acquire write lock: {}", e);
                Err(StoreError::Poisoned)
            }
        }
    }
}
