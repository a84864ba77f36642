//! Service layer: calls out to collaborators.
//!
//! [`EnrichmentClient`] asks the external anomaly-detection service for a
//! verdict on each telemetry message.

pub mod enrichment;

pub use enrichment::EnrichmentClient;
