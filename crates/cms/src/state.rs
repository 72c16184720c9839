//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::CmsConfig;
use crate::store::CatalogStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: CmsConfig,
    store: CatalogStore,
}

impl AppState {
    #[must_use]
    pub fn new(config: CmsConfig) -> Self {
        let store = CatalogStore::new(config.data_file.clone(), config.image_dir.clone());
        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &CmsConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &CatalogStore {
        &self.inner.store
    }
}
