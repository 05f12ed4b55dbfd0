//! Transport layer for the baduk server.
//!
//! Provides the [`Transport`] and [`Connection`] traits the dispatch layer
//! is written against, plus a WebSocket implementation. Every event on the
//! wire is one UTF-8 text frame; the transport does not look inside it.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{
    DEFAULT_HANDSHAKE_TIMEOUT, PendingWebSocket, WebSocketConnection, WebSocketTransport,
};

use std::fmt;
use std::net::SocketAddr;

/// Identity of one client connection.
///
/// Unique for the lifetime of the process and stable for the lifetime of
/// the connection. Rooms key their rosters on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
///
/// Accepting only takes a connection off the listener. The protocol
/// handshake happens in [`Handshake::upgrade`], which callers run off the
/// accept loop so a slow or silent peer cannot hold up everyone else.
pub trait Transport: Send + Sync + 'static {
    /// An accepted connection that has not completed its handshake yet.
    type Pending: Handshake;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Pending, TransportError>;

    /// The address the transport is listening on.
    fn local_addr(&self) -> Result<SocketAddr, TransportError>;
}

/// The second half of accepting a connection.
pub trait Handshake: Send + 'static {
    /// The connection type produced once the handshake succeeds.
    type Connection: Connection;

    /// Remote address of the peer.
    fn peer_addr(&self) -> SocketAddr;

    /// Completes the handshake. Implementations bound how long this waits.
    async fn upgrade(self) -> Result<Self::Connection, TransportError>;
}

/// A single bidirectional text connection.
///
/// `send` and `recv` may be called concurrently from the same task
/// (e.g. from two `tokio::select!` branches); implementations must not
/// make one wait on the other.
pub trait Connection: Send + Sync + 'static {
    /// Sends one text frame to the remote peer.
    async fn send(&self, text: &str) -> Result<(), TransportError>;

    /// Receives the next text frame from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    /// [`TransportError::InvalidFrame`] only concerns the frame at hand; the
    /// connection stays usable after it.
    async fn recv(&self) -> Result<Option<String>, TransportError>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), TransportError>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
