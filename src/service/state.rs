//! Service state.
//!
//! Holds the read-only catalog and engine configuration shared by every
//! request. Nothing here is mutated after startup, so handlers read it
//! without locking.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::{DataPaths, EngineConfig};
use crate::store::DataLoadError;

/// Shared service state.
#[derive(Debug, Clone)]
pub struct ServiceState {
    /// The loaded dataset.
    pub catalog: Arc<Catalog>,
    /// Engine configuration.
    pub config: Arc<EngineConfig>,
}

impl ServiceState {
    /// Create service state from a loaded catalog.
    pub fn new(catalog: Catalog, config: EngineConfig) -> Self {
        Self {
            catalog: Arc::new(catalog),
            config: Arc::new(config),
        }
    }

    /// Load the catalog from `paths`.
    pub fn load(paths: &DataPaths, config: EngineConfig) -> Result<Self, DataLoadError> {
        Ok(Self::new(Catalog::load(paths)?, config))
    }

    /// Fingerprint of the engine configuration.
    pub fn config_hash(&self) -> String {
        self.config.params_hash()
    }
}
