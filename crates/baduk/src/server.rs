//! `BadukServer` builder and accept loop.
//!
//! This is the entry point for running a baduk server. It ties together all
//! the layers: transport → protocol → room → session.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use baduk_protocol::{Codec, JsonCodec};
use baduk_room::{RoomConfig, RoomManager};
use baduk_rules::Rules;
use baduk_transport::{DEFAULT_HANDSHAKE_TIMEOUT, Handshake, Transport, WebSocketTransport};

use crate::BadukError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<R: Rules, C: Codec> {
    pub(crate) rooms: Arc<RoomManager<R>>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a baduk server.
///
/// # Example
///
/// ```rust,no_run
/// use baduk::prelude::*;
///
/// # async fn run() -> Result<(), BadukError> {
/// let server = BadukServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build::<GoRules>()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct BadukServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    handshake_timeout: Duration,
}

impl BadukServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            room_config: RoomConfig::default(),
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the configuration every room is created with.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Sets how long a new connection gets to finish its WebSocket upgrade.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Binds the listener and builds the server for rule set `R`.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build<R: Rules>(self) -> Result<BadukServer<R, JsonCodec>, BadukError> {
        let transport = WebSocketTransport::bind(&self.bind_addr)
            .await?
            .with_handshake_timeout(self.handshake_timeout);

        let state = Arc::new(ServerState {
            rooms: Arc::new(RoomManager::new(self.room_config)),
            codec: JsonCodec,
        });

        Ok(BadukServer { transport, state })
    }
}

impl Default for BadukServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound baduk server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct BadukServer<R: Rules, C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<R, C>>,
}

impl<R: Rules, C: Codec> BadukServer<R, C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, BadukError> {
        Ok(self.transport.local_addr()?)
    }

    /// The room manager shared by every connection of this server.
    pub fn rooms(&self) -> Arc<RoomManager<R>> {
        Arc::clone(&self.state.rooms)
    }

    /// Runs the accept loop.
    ///
    /// Each accepted connection gets its own task, which completes the
    /// WebSocket upgrade and then runs the handler. A peer that never
    /// finishes its handshake only stalls its own task. A failed accept is
    /// logged and does not stop the loop. Runs until the process is
    /// terminated.
    pub async fn run(mut self) -> Result<(), BadukError> {
        tracing::info!("baduk server running");

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let peer = pending.peer_addr();
                        let conn = match pending.upgrade().await {
                            Ok(conn) => conn,
                            Err(e) => {
                                tracing::debug!(%peer, error = %e, "handshake failed");
                                return;
                            }
                        };
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
