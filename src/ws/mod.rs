//! WebSocket layer: connection lifecycle, role announcements, routing.
//!
//! Devices and viewers share one message-stream endpoint. The first frame
//! a client sends decides its role; see [`protocol`].

pub mod connection;
pub mod handler;
pub mod protocol;
pub mod router;

pub use router::{Dispatch, DropReason, MessageRouter, Role, Session};
