//! Application state shared across handlers.

use std::sync::Arc;

use punchcard_core::{CustomerStore, MemoryStore, StoreError};

use crate::config::ServerConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The store is held behind the
/// [`CustomerStore`] trait so tests can substitute a fake.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    store: Arc<dyn CustomerStore>,
}

impl AppState {
    /// Create application state over an arbitrary store.
    #[must_use]
    pub fn new(config: ServerConfig, store: Arc<dyn CustomerStore>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// Create application state with the store the config describes: the
    /// seed file when `seed_path` is set, the built-in sample otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Seed`] if the seed file cannot be loaded.
    pub fn from_config(config: ServerConfig) -> Result<Self, StoreError> {
        let store = match &config.seed_path {
            Some(path) => MemoryStore::from_seed_file(path)?,
            None => MemoryStore::with_sample_data(),
        };
        Ok(Self::new(config, Arc::new(store)))
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the customer store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn CustomerStore> {
        &self.inner.store
    }
}
