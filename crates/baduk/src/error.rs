//! Unified error type for the baduk server.

use baduk_protocol::ProtocolError;
use baduk_room::RoomError;
use baduk_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `baduk` crate you deal with this single error type
/// instead of importing errors from each layer. The `#[from]` attribute on
/// each variant generates the `From` impls, so `?` converts automatically.
#[derive(Debug, thiserror::Error)]
pub enum BadukError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, conflict, invalid state).
    #[error(transparent)]
    Room(#[from] RoomError),
}
