//! Application state shared across handlers.

use std::sync::Arc;

use crate::ai::AiGateway;
use crate::config::AppConfig;
use crate::db::DocumentStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. The store and gateway are injected trait
/// objects: production wires `PostgreSQL` and (when configured) the Azure
/// OpenAI client, tests wire the in-memory store and a scripted gateway.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    store: Arc<dyn DocumentStore>,
    gateway: Arc<dyn AiGateway>,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: AppConfig,
        store: Arc<dyn DocumentStore>,
        gateway: Arc<dyn AiGateway>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                gateway,
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a handle to the document store.
    #[must_use]
    pub fn store(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.inner.store)
    }

    /// Get a handle to the AI gateway.
    #[must_use]
    pub fn gateway(&self) -> Arc<dyn AiGateway> {
        Arc::clone(&self.inner.gateway)
    }
}
