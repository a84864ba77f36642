//! Concurrent registry of classified connections.
//!
//! [`ConnectionRegistry`] keeps the device map (device identifier →
//! connection) and the viewer set behind a single [`tokio::sync::RwLock`].
//! Fan-out never iterates under the lock: callers take a snapshot with
//! [`ConnectionRegistry::all_devices`] or [`ConnectionRegistry::all_viewers`]
//! and deliver after the guard is released.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{ConnectionHandle, ConnectionId};

#[derive(Debug, Default)]
struct Connections {
    devices: HashMap<String, ConnectionHandle>,
    viewers: HashMap<ConnectionId, ConnectionHandle>,
}

/// What [`ConnectionRegistry::remove_connection`] actually removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Removed {
    /// Device identifiers that pointed at the removed connection.
    pub device_ids: Vec<String>,
    /// Whether the connection was in the viewer set.
    pub viewer: bool,
}

impl Removed {
    /// Returns `true` if nothing was removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.device_ids.is_empty() && !self.viewer
    }
}

/// Shared store of live device and viewer connections.
///
/// # Concurrency
///
/// - Registration and removal take the write lock.
/// - Snapshots take the read lock and clone the handles out.
/// - No method awaits anything other than the lock itself.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    inner: RwLock<Connections>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `device_id` to `conn`, replacing any previous entry.
    ///
    /// Last writer wins. Returns the displaced handle when it belonged to a
    /// different connection; dropping it releases that connection's writer.
    pub async fn register_device(
        &self,
        device_id: impl Into<String>,
        conn: ConnectionHandle,
    ) -> Option<ConnectionHandle> {
        let conn_id = conn.id();
        let mut guard = self.inner.write().await;
        guard
            .devices
            .insert(device_id.into(), conn)
            .filter(|previous| previous.id() != conn_id)
    }

    /// Adds `conn` to the viewer set. Registering twice is a no-op.
    pub async fn register_viewer(&self, conn: ConnectionHandle) {
        let mut guard = self.inner.write().await;
        guard.viewers.entry(conn.id()).or_insert(conn);
    }

    /// Removes the connection from the device map and the viewer set.
    ///
    /// Device entries are matched by connection identity, so an entry that
    /// has since been taken over by a newer connection with the same device
    /// identifier is left alone. Safe to call repeatedly and for connections
    /// that never announced a role.
    pub async fn remove_connection(&self, conn_id: ConnectionId) -> Removed {
        let mut guard = self.inner.write().await;
        let mut removed = Removed::default();
        guard.devices.retain(|device_id, handle| {
            if handle.id() == conn_id {
                removed.device_ids.push(device_id.clone());
                false
            } else {
                true
            }
        });
        removed.viewer = guard.viewers.remove(&conn_id).is_some();
        removed
    }

    /// Returns a snapshot of every registered device connection.
    pub async fn all_devices(&self) -> Vec<ConnectionHandle> {
        self.inner.read().await.devices.values().cloned().collect()
    }

    /// Returns a snapshot of every registered viewer connection.
    pub async fn all_viewers(&self) -> Vec<ConnectionHandle> {
        self.inner.read().await.viewers.values().cloned().collect()
    }

    /// Returns the registered device identifiers, sorted.
    pub async fn device_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.inner.read().await.devices.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Returns the number of registered devices.
    pub async fn device_count(&self) -> usize {
        self.inner.read().await.devices.len()
    }

    /// Returns the number of registered viewers.
    pub async fn viewer_count(&self) -> usize {
        self.inner.read().await.viewers.len()
    }
}
