//! Error types for the room layer.

use std::fmt;

use baduk_session::SessionError;
use baduk_transport::ConnectionId;

/// Coarse classification of a [`RoomError`], used to pick the code sent
/// back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The room or client does not exist.
    NotFound,
    /// A name, connection or room is already taken.
    Conflict,
    /// The request is not allowed in the room's current state or for the
    /// client's role.
    InvalidState,
    /// The move was refused by turn order or the rules.
    IllegalMove,
    /// The request itself is malformed.
    ProtocolMisuse,
}

impl ErrorKind {
    /// HTTP-like status code carried in `error` events.
    pub fn code(self) -> u16 {
        match self {
            Self::ProtocolMisuse => 400,
            Self::InvalidState => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::IllegalMove => 422,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::Conflict => write!(f, "conflict"),
            Self::InvalidState => write!(f, "invalid state"),
            Self::IllegalMove => write!(f, "illegal move"),
            Self::ProtocolMisuse => write!(f, "protocol misuse"),
        }
    }
}

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room with this name exists.
    #[error("room {0} not found")]
    RoomNotFound(String),

    /// The connection is not a member of the room (or of any room).
    #[error("client {0} not found")]
    ClientNotFound(ConnectionId),

    /// The connection is already a member of a room.
    #[error("connection {0} already joined a room")]
    DuplicateConnection(ConnectionId),

    /// Another client in the room already uses this display name.
    #[error("name {0} is already taken in this room")]
    DuplicateName(String),

    /// A room with this name already exists.
    #[error("room {0} already exists")]
    AlreadyExists(String),

    /// The room is in a state that doesn't allow this operation.
    #[error("invalid room state for this operation: {0}")]
    InvalidState(String),

    /// The operation is reserved for players.
    #[error("client {0} is not a player")]
    NotAPlayer(ConnectionId),

    /// The session refused the move.
    #[error(transparent)]
    Move(#[from] SessionError),

    /// The request could not be understood.
    #[error("bad request: {0}")]
    ProtocolMisuse(String),

    /// The room's command channel is full or closed.
    #[error("room {0} is unavailable")]
    Unavailable(String),
}

impl RoomError {
    /// Which [`ErrorKind`] this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RoomNotFound(_) | Self::ClientNotFound(_) | Self::Unavailable(_) => {
                ErrorKind::NotFound
            }
            Self::DuplicateConnection(_) | Self::DuplicateName(_) | Self::AlreadyExists(_) => {
                ErrorKind::Conflict
            }
            Self::InvalidState(_) | Self::NotAPlayer(_) => ErrorKind::InvalidState,
            Self::Move(SessionError::IndexOutOfRange { .. }) | Self::ProtocolMisuse(_) => {
                ErrorKind::ProtocolMisuse
            }
            Self::Move(_) => ErrorKind::IllegalMove,
        }
    }

    /// Shorthand for `self.kind().code()`.
    pub fn code(&self) -> u16 {
        self.kind().code()
    }
}
