//! Domain layer: connection identity, the connection registry, telemetry
//! payloads and anomaly verdicts.

pub mod connection;
pub mod connection_id;
pub mod connection_registry;
pub mod telemetry;
pub mod verdict;

pub use connection::{ConnectionHandle, DeliveryError};
pub use connection_id::ConnectionId;
pub use connection_registry::{ConnectionRegistry, Removed};
pub use telemetry::{SyntheticReadings, Telemetry};
pub use verdict::Verdict;
