//! HTTP client for the anomaly-detection service.
//!
//! Every telemetry message gets exactly one bounded request and no retry.
//! Any failure is replaced by [`Verdict::unknown`] and the message still
//! goes out.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::domain::{Telemetry, Verdict};
use crate::error::EnrichmentError;

/// Client for `POST <endpoint>` verdict lookups.
#[derive(Debug, Clone)]
pub struct EnrichmentClient {
    http: Client,
    endpoint: Url,
}

impl EnrichmentClient {
    /// Creates a client posting to `endpoint`, bounding each request by
    /// `timeout` (connect, send and body read included).
    ///
    /// # Errors
    ///
    /// Returns [`EnrichmentError::Transport`] if the HTTP client cannot be
    /// built (e.g. the TLS backend fails to initialize).
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, EnrichmentError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, endpoint })
    }

    /// Returns the verdict for `telemetry`, or the fallback verdict if the
    /// service could not provide one. Never fails.
    pub async fn classify(&self, telemetry: &Telemetry) -> Verdict {
        match self.try_classify(telemetry).await {
            Ok(verdict) => verdict,
            Err(err) => {
                tracing::warn!(
                    endpoint = %self.endpoint,
                    timeout = err.is_timeout(),
                    error = %err,
                    "enrichment failed, using fallback verdict"
                );
                Verdict::unknown()
            }
        }
    }

    /// Performs one verdict request.
    ///
    /// # Errors
    ///
    /// - [`EnrichmentError::Transport`] on connection failure or timeout.
    /// - [`EnrichmentError::Status`] on a non-2xx response.
    /// - [`EnrichmentError::Decode`] if the body is not a verdict object.
    pub async fn try_classify(&self, telemetry: &Telemetry) -> Result<Verdict, EnrichmentError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(telemetry)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EnrichmentError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
