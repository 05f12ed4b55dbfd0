//! Client records: one per connection that has joined a room.

use baduk_protocol::{Role, Stone};
use baduk_transport::ConnectionId;

/// A member of a room.
///
/// Created on join and owned by the room actor. Callers outside the room
/// only ever see copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    /// The connection this client arrived on.
    pub id: ConnectionId,
    /// Display name, unique within the room.
    pub name: String,
    /// Assigned on join and never changed.
    pub role: Role,
    /// During negotiation: the stated preference. While playing: the
    /// assigned color. Always `None` for spectators.
    pub color: Option<Stone>,
}

impl Client {
    pub fn new(id: ConnectionId, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            color: None,
        }
    }

    pub fn is_player(&self) -> bool {
        self.role == Role::Player
    }
}
