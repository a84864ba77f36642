//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::domain::ConnectionRegistry;
use crate::error::RelayError;
use crate::service::EnrichmentClient;
use crate::ws::MessageRouter;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Live device and viewer connections.
    pub registry: Arc<ConnectionRegistry>,
    /// Classifies and dispatches inbound frames.
    pub router: Arc<MessageRouter>,
    /// Per-connection outbound queue capacity.
    pub outbound_capacity: usize,
}

impl AppState {
    /// Builds the registry, enrichment client and router from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Enrichment`] if the HTTP client cannot be built.
    pub fn new(config: &RelayConfig) -> Result<Self, RelayError> {
        let registry = Arc::new(ConnectionRegistry::new());
        let enrichment =
            EnrichmentClient::new(config.enrichment_url.clone(), config.enrichment_timeout)?;
        let router = Arc::new(MessageRouter::new(Arc::clone(&registry), enrichment));

        Ok(Self {
            registry,
            router,
            outbound_capacity: config.outbound_queue_capacity,
        })
    }
}
