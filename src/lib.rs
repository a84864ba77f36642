//! # telemetry-relay
//!
//! Real-time WebSocket relay between hardware telemetry devices and browser
//! dashboards. Every telemetry frame is enriched with a verdict from an
//! external anomaly-detection service before it is fanned out to viewers;
//! viewer commands are forwarded verbatim to every device.
//!
//! ## Architecture
//!
//! ```text
//! Devices ──┐                    ┌── Viewers
//!           │                    │
//!     WS Connection (ws/) ── MessageRouter (ws/)
//!                                 │
//!           ├── ConnectionRegistry (domain/)
//!           ├── EnrichmentClient (service/) ──► POST /predict/anomaly
//!           │
//!     REST: /health, /api/v1/connections (api/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod server;
pub mod service;
pub mod ws;
