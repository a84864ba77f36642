//! Per-connection classification and message dispatch.
//!
//! Every connection starts [`Role::Unclassified`] and moves to
//! [`Role::Device`] or [`Role::Viewer`] on its first announcement; the role
//! never changes afterwards. Device frames are enriched and fanned out to
//! viewers. Viewer frames are forwarded verbatim to devices.

use std::sync::Arc;

use axum::extract::ws::Message;
use serde_json::Value;

use super::protocol::Announcement;
use crate::domain::telemetry::{enrich, parse_telemetry};
use crate::domain::{ConnectionHandle, ConnectionId, ConnectionRegistry, SyntheticReadings};
use crate::service::EnrichmentClient;

/// Role of a connection, as seen from outside the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// No announcement received yet.
    Unclassified,
    /// Telemetry device with its identifier.
    Device(String),
    /// Dashboard viewer.
    Viewer,
}

/// Why a frame was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Sent before the connection announced a role.
    Unclassified,
    /// Device frame that was not a JSON object.
    MalformedTelemetry,
    /// Control frame, or a frame with no usable payload.
    Unroutable,
}

/// Outcome of routing one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The frame classified the connection.
    Classified(Role),
    /// The frame was fanned out to this many connections.
    Delivered(usize),
    /// The frame was discarded.
    Dropped(DropReason),
}

/// Routing state of one connection.
///
/// While unclassified the session owns the connection's handle. On
/// classification the handle moves into the registry, which from then on
/// decides how long the connection's writer lives.
#[derive(Debug)]
pub struct Session {
    id: ConnectionId,
    state: SessionState,
}

#[derive(Debug)]
enum SessionState {
    Unclassified(ConnectionHandle),
    Device(String),
    Viewer,
}

impl Session {
    /// Starts an unclassified session for `handle`.
    #[must_use]
    pub fn new(handle: ConnectionHandle) -> Self {
        Self {
            id: handle.id(),
            state: SessionState::Unclassified(handle),
        }
    }

    /// Returns the connection identity.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the current role.
    #[must_use]
    pub fn role(&self) -> Role {
        match &self.state {
            SessionState::Unclassified(_) => Role::Unclassified,
            SessionState::Device(id) => Role::Device(id.clone()),
            SessionState::Viewer => Role::Viewer,
        }
    }
}

/// Classifies inbound frames and dispatches them.
#[derive(Debug)]
pub struct MessageRouter {
    registry: Arc<ConnectionRegistry>,
    enrichment: EnrichmentClient,
}

impl MessageRouter {
    /// Creates a router over `registry`, enriching telemetry via `enrichment`.
    #[must_use]
    pub const fn new(registry: Arc<ConnectionRegistry>, enrichment: EnrichmentClient) -> Self {
        Self {
            registry,
            enrichment,
        }
    }

    /// Returns the registry this router dispatches through.
    #[must_use]
    pub const fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Routes one inbound frame from the connection behind `session`.
    ///
    /// Never fails: every error is logged and turned into a
    /// [`Dispatch::Dropped`]. A device's enrichment call is awaited here,
    /// without holding any registry lock, so it only delays that device.
    pub async fn route(&self, session: &mut Session, message: Message) -> Dispatch {
        match session.role() {
            Role::Unclassified => {
                let Some(text) = frame_text(&message) else {
                    return Dispatch::Dropped(DropReason::Unroutable);
                };
                match Announcement::parse(text) {
                    Some(announcement) => self.classify(session, announcement).await,
                    None => {
                        tracing::debug!(
                            connection_id = %session.id,
                            "dropping frame from unclassified connection"
                        );
                        Dispatch::Dropped(DropReason::Unclassified)
                    }
                }
            }
            Role::Device(device_id) => {
                let Some(text) = frame_text(&message) else {
                    return Dispatch::Dropped(DropReason::Unroutable);
                };
                self.relay_telemetry(&device_id, text).await
            }
            Role::Viewer => self.relay_command(message).await,
        }
    }

    /// Deregisters the connection behind `session`.
    pub async fn disconnect(&self, session: &Session) {
        let removed = self.registry.remove_connection(session.id).await;
        for device_id in &removed.device_ids {
            tracing::info!(connection_id = %session.id, device_id = %device_id, "device disconnected");
        }
        if removed.viewer {
            tracing::info!(connection_id = %session.id, "viewer disconnected");
        }
        if removed.is_empty() {
            tracing::debug!(connection_id = %session.id, role = ?session.role(), "connection closed");
        }
    }

    async fn classify(&self, session: &mut Session, announcement: Announcement) -> Dispatch {
        let next = match &announcement {
            Announcement::Device(id) => SessionState::Device(id.clone()),
            Announcement::Viewer => SessionState::Viewer,
        };
        let SessionState::Unclassified(handle) = std::mem::replace(&mut session.state, next)
        else {
            return Dispatch::Dropped(DropReason::Unroutable);
        };

        match announcement {
            Announcement::Device(device_id) => {
                if let Some(displaced) = self.registry.register_device(&device_id, handle).await {
                    tracing::info!(
                        connection_id = %session.id,
                        displaced = %displaced.id(),
                        device_id = %device_id,
                        "device reconnected, closing previous connection"
                    );
                    displaced.close();
                }
                tracing::info!(connection_id = %session.id, device_id = %device_id, "device connected");
            }
            Announcement::Viewer => {
                self.registry.register_viewer(handle).await;
                tracing::info!(connection_id = %session.id, "viewer connected");
            }
        }
        Dispatch::Classified(session.role())
    }

    async fn relay_telemetry(&self, device_id: &str, text: &str) -> Dispatch {
        let telemetry = match parse_telemetry(text) {
            Ok(telemetry) => telemetry,
            Err(err) => {
                tracing::debug!(device_id = %device_id, error = %err, "dropping device frame");
                return Dispatch::Dropped(DropReason::MalformedTelemetry);
            }
        };

        let verdict = self.enrichment.classify(&telemetry).await;
        tracing::debug!(device_id = %device_id, status = %verdict.status, "telemetry enriched");

        let enriched = enrich(telemetry, verdict, SyntheticReadings::sample());
        let frame = Message::text(Value::Object(enriched).to_string());
        let viewers = self.registry.all_viewers().await;
        Dispatch::Delivered(self.fan_out(viewers, &frame).await)
    }

    async fn relay_command(&self, message: Message) -> Dispatch {
        if !matches!(message, Message::Text(_) | Message::Binary(_)) {
            return Dispatch::Dropped(DropReason::Unroutable);
        }
        let devices = self.registry.all_devices().await;
        if devices.is_empty() {
            tracing::debug!("no devices registered, command discarded");
        }
        Dispatch::Delivered(self.fan_out(devices, &message).await)
    }

    /// Queues `frame` on every target. Targets whose queue is full or closed
    /// are deregistered and told to close on the spot.
    async fn fan_out(&self, targets: Vec<ConnectionHandle>, frame: &Message) -> usize {
        let mut delivered = 0;
        for target in targets {
            match target.try_deliver(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(err) => {
                    tracing::warn!(
                        connection_id = %target.id(),
                        error = %err,
                        "dropping unresponsive connection"
                    );
                    self.registry.remove_connection(target.id()).await;
                    target.close();
                }
            }
        }
        delivered
    }
}

fn frame_text(message: &Message) -> Option<&str> {
    match message {
        Message::Text(text) => Some(text.as_str()),
        Message::Binary(bytes) => std::str::from_utf8(bytes).ok(),
        _ => None,
    }
}
