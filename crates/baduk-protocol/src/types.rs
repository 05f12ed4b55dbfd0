//! Protocol types: everything that travels between a browser client and the
//! server.
//!
//! Each event is a JSON object with two fields, a name and a payload:
//!
//! ```text
//! { "event": "stoneRequest", "data": 40 }
//! { "event": "board", "data": { "board": "---\n-b-\n---", "size": 3, "turn": 1, "turnColor": "white" } }
//! ```
//!
//! This mirrors an `emit(name, payload)` style API, which is what the web
//! client speaks.

use std::fmt;

use baduk_transport::ConnectionId;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Stone colors
// ---------------------------------------------------------------------------

/// The color of a stone, and of the player who places it.
///
/// There is no "empty" variant on purpose: a player either has a color or
/// holds an `Option<Stone>` that is `None`. Serialized as `"black"` /
/// `"white"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stone {
    Black,
    White,
}

impl Stone {
    /// The other color.
    pub fn opposite(self) -> Self {
        match self {
            Self::Black => Self::White,
            Self::White => Self::Black,
        }
    }

    /// Single-character glyph used in board snapshots.
    pub fn glyph(self) -> char {
        match self {
            Self::Black => 'b',
            Self::White => 'w',
        }
    }
}

impl fmt::Display for Stone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Black => write!(f, "black"),
            Self::White => write!(f, "white"),
        }
    }
}

/// A player's color preference during negotiation.
///
/// Unlike [`Stone`], a preference may be `none` ("I don't mind"). Any other
/// string fails to decode, so an invalid preference can never reach a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    None,
    Black,
    White,
}

impl ColorChoice {
    /// The preferred stone, if any.
    pub fn stone(self) -> Option<Stone> {
        match self {
            Self::None => None,
            Self::Black => Some(Stone::Black),
            Self::White => Some(Stone::White),
        }
    }
}

impl From<Option<Stone>> for ColorChoice {
    fn from(stone: Option<Stone>) -> Self {
        match stone {
            None => Self::None,
            Some(Stone::Black) => Self::Black,
            Some(Stone::White) => Self::White,
        }
    }
}

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// What a client may do in a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Holds a color and places stones. At most two per room.
    Player,
    /// Watches the board.
    Spectator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => write!(f, "player"),
            Self::Spectator => write!(f, "spectator"),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// A serialized view of a game: the board, the turn number and who moves.
///
/// `board` is row-major, one glyph per cell (`b`, `w` or `-`), with rows
/// joined by `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub board: String,
    pub size: usize,
    pub turn: u64,
    pub turn_color: Stone,
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who inside a room should receive an outbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every client in the room, players and spectators.
    All,
    /// One client only.
    One(ConnectionId),
    /// Everyone except the given client.
    AllExcept(ConnectionId),
}

impl Recipient {
    /// Returns `true` if `conn` is addressed by this recipient.
    pub fn includes(self, conn: ConnectionId) -> bool {
        match self {
            Self::All => true,
            Self::One(target) => target == conn,
            Self::AllExcept(excluded) => excluded != conn,
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A payload the server does not read.
///
/// Decodes from any JSON value, or from a missing `data` field, and encodes
/// as `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ignored;

impl Serialize for Ignored {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_unit()
    }
}

impl<'de> Deserialize<'de> for Ignored {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // `Option` is what lets a missing `data` field through.
        Option::<IgnoredAny>::deserialize(deserializer).map(|_| Ignored)
    }
}

/// Client → server events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Enter the named room under a display name.
    Join { name: String, room: String },
    /// State a color preference during negotiation.
    ColorChoice(ColorChoice),
    /// Place a stone at a linear cell index (`x * size + y`).
    StoneRequest(usize),
    /// Ask the room to re-broadcast the current board. The payload is
    /// ignored.
    BoardRequest(Ignored),
}

impl ClientEvent {
    /// The event name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::ColorChoice(_) => "colorChoice",
            Self::StoneRequest(_) => "stoneRequest",
            Self::BoardRequest(_) => "boardRequest",
        }
    }
}

/// Server → client events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// The role assigned on join (unicast).
    Type(Role),
    /// The other player's color preference (everyone but the chooser).
    EnemyColor(ColorChoice),
    /// The final color of the receiving player (unicast).
    Color(Stone),
    /// Seconds left in color negotiation; `0` means the game started.
    ColorCountDown(u32),
    /// The current board.
    Board(Snapshot),
    /// A request from this connection failed. Never broadcast.
    Error { code: u16, message: String },
}
