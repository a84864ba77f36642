//! Relay error types.
//!
//! [`RelayError`] covers startup and per-message failures. Only startup
//! failures (configuration, binding the listener) ever reach `main`; the
//! per-message variants are logged and the message is dropped.
//! [`EnrichmentError`] is local to the enrichment client and is always
//! folded into the fallback verdict.

/// Crate-level error enum.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// A configuration value is missing or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A device frame was not a JSON object.
    #[error("invalid telemetry: {0}")]
    InvalidTelemetry(String),

    /// The enrichment HTTP client could not be constructed.
    #[error("enrichment client error: {0}")]
    Enrichment(#[from] EnrichmentError),

    /// Listener or socket failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a single enrichment request.
#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    /// Connection, timeout or client-construction failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-2xx status.
    #[error("service returned HTTP {0}")]
    Status(u16),

    /// The response body was not a verdict.
    #[error("malformed verdict: {0}")]
    Decode(#[from] serde_json::Error),
}

impl EnrichmentError {
    /// Returns `true` if the request hit the configured timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(err) if err.is_timeout())
    }
}
